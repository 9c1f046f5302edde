//! 有向边

use super::id::NodeId;

/// 带权有向边 `origin -> destination`，权重用于随机路由
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedArc {
    pub origin: NodeId,
    pub destination: NodeId,
    pub weight: f64,
}

impl WeightedArc {
    /// 权重默认为 1
    pub fn new(origin: NodeId, destination: NodeId) -> Self {
        Self {
            origin,
            destination,
            weight: 1.0,
        }
    }

    pub fn weighted(origin: NodeId, destination: NodeId, weight: f64) -> Self {
        Self {
            origin,
            destination,
            weight,
        }
    }
}
