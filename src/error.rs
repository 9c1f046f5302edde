//! 错误类型
//!
//! 仿真内核只在两类情况下返回错误：配置错误（构造或首次使用时暴露），
//! 以及内部状态不合理（说明引擎本身有 bug）。队列满、无可用服务台、
//! 分布区间耗尽等容量结果不是错误，而是以访问记录的形式出现在结果里。

use crate::dist::Interval;
use crate::sim::SimTime;

/// 仿真内核错误
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid interval: start {start} is greater than end {end}")]
    InvalidInterval { start: u64, end: u64 },

    #[error("duration distributions overlap: {first} and {second}")]
    OverlappingIntervals { first: Interval, second: Interval },

    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("initial arrival fraction {0} is outside [0, 1]")]
    InvalidFraction(f64),

    #[error("arc {origin} -> {destination} has invalid weight {weight}")]
    InvalidWeight {
        origin: String,
        destination: String,
        weight: f64,
    },

    #[error("unknown node `{0}`")]
    UnknownNode(String),

    #[error("node `{0}` is defined more than once")]
    DuplicateNode(String),

    #[error("cohort `{cohort}` has no properties for node `{node}`")]
    MissingNodeProperties { cohort: String, node: String },

    /// 服务台选择结果越界或已被占用：这是引擎自身的 bug，而不是输入问题。
    #[error("cannot select server {server} at node `{node}`")]
    ImplausibleServer { node: String, server: usize },

    #[error("simulation time {0} exceeds the supported range")]
    TimeLimitExceeded(SimTime),

    #[error("read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse scenario: {0}")]
    Json(#[from] serde_json::Error),
}
