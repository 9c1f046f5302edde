//! 统计与汇总

mod metrics;
mod report;

pub use metrics::{MetricsAggregation, SetMetrics, Welford};
pub use report::{
    AggregatedNodeReport, NodeReport, SimulationReport, TimeWindow, merge_reports,
};
