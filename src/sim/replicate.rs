//! 并行重复运行
//!
//! 每次重复各自持有一个 `Simulation`，种子为 `0..iterations`；场景只读共享。

use rayon::prelude::*;
use tracing::info;

use super::cancel::CancellationToken;
use super::engine::{Simulation, SimulationSettings};
use crate::error::SimError;
use crate::model::Scenario;
use crate::stats::{SimulationReport, TimeWindow};

/// 并行运行 `iterations` 次仿真，按种子顺序返回每次的报告。
#[tracing::instrument(skip(scenario, cancel))]
pub fn run_replications(
    scenario: &Scenario,
    iterations: u64,
    settings: SimulationSettings,
    window: TimeWindow,
    cancel: &CancellationToken,
) -> Result<Vec<SimulationReport>, SimError> {
    info!("开始并行重复运行");
    let reports = (0..iterations)
        .into_par_iter()
        .map(|seed| {
            let mut sim = Simulation::new(scenario, settings, seed);
            let records = sim.start(cancel)?;
            Ok(SimulationReport::from_records(&records, window))
        })
        .collect::<Result<Vec<_>, SimError>>()?;
    info!(runs = reports.len(), "重复运行完成");
    Ok(reports)
}
