//! 时长分布模块
//!
//! 区间、时长分布，以及按时间选择分布的选择器。

mod distribution;
mod interval;
mod selector;

pub use distribution::{DurationDistribution, EmpiricalDuration};
pub use interval::Interval;
pub use selector::DistributionSelector;
