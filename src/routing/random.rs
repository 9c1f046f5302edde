//! 按权重随机选择目标节点

use std::collections::HashMap;

use rand::{Rng, RngCore};

use super::{QueueFullBehavior, Routing, RoutingDecision};
use crate::error::SimError;
use crate::model::{NodeId, WeightedArc};

#[derive(Debug, Clone, Default)]
pub struct RandomRouting {
    /// origin -> 出边（保持添加顺序）
    arcs_by_origin: HashMap<NodeId, Vec<WeightedArc>>,
    total_weight: HashMap<NodeId, f64>,
    /// 按目标节点配置的队列满行为
    queue_full: HashMap<NodeId, QueueFullBehavior>,
    default_behavior: QueueFullBehavior,
}

impl RandomRouting {
    /// 权重必须是非负有限数
    pub fn new(arcs: impl IntoIterator<Item = WeightedArc>) -> Result<Self, SimError> {
        let mut arcs_by_origin: HashMap<NodeId, Vec<WeightedArc>> = HashMap::new();
        let mut total_weight: HashMap<NodeId, f64> = HashMap::new();
        for arc in arcs {
            if !arc.weight.is_finite() || arc.weight < 0.0 {
                return Err(SimError::InvalidWeight {
                    origin: arc.origin.to_string(),
                    destination: arc.destination.to_string(),
                    weight: arc.weight,
                });
            }
            *total_weight.entry(arc.origin).or_default() += arc.weight;
            arcs_by_origin.entry(arc.origin).or_default().push(arc);
        }
        Ok(Self {
            arcs_by_origin,
            total_weight,
            queue_full: HashMap::new(),
            default_behavior: QueueFullBehavior::default(),
        })
    }

    /// 没有出边的路由：所有个体服务后离开系统
    pub fn exit_only() -> Self {
        Self::default()
    }

    /// 前往 `destination` 且其队列已满时的行为
    pub fn with_queue_full(mut self, destination: NodeId, behavior: QueueFullBehavior) -> Self {
        self.queue_full.insert(destination, behavior);
        self
    }

    /// 未单独配置的目标节点使用的行为
    pub fn with_default_queue_full(mut self, behavior: QueueFullBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    fn seek(&self, destination: NodeId) -> RoutingDecision {
        RoutingDecision::SeekDestination {
            destination,
            behavior: self
                .queue_full
                .get(&destination)
                .copied()
                .unwrap_or(self.default_behavior),
        }
    }
}

impl Routing for RandomRouting {
    fn route_after_service(&self, origin: NodeId, rng: &mut dyn RngCore) -> RoutingDecision {
        let arcs = match self.arcs_by_origin.get(&origin) {
            Some(arcs) if !arcs.is_empty() => arcs,
            _ => return RoutingDecision::ExitSystem,
        };

        // 只有一条出边时不消耗随机数
        if arcs.len() == 1 {
            return self.seek(arcs[0].destination);
        }

        let total = self.total_weight.get(&origin).copied().unwrap_or_default();
        let draw = rng.r#gen::<f64>() * total;
        let mut cumulative = 0.0;
        for arc in arcs {
            cumulative += arc.weight;
            if draw <= cumulative {
                return self.seek(arc.destination);
            }
        }
        // 浮点累加误差导致没有命中时落到最后一条边
        let last = arcs[arcs.len() - 1];
        self.seek(last.destination)
    }
}
