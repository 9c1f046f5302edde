//! 固定链路路由：每个节点至多一个后继，不消耗随机数

use std::collections::HashMap;

use rand::RngCore;

use super::{QueueFullBehavior, Routing, RoutingDecision};
use crate::model::NodeId;

#[derive(Debug, Clone, Default)]
pub struct ChainRouting {
    next: HashMap<NodeId, NodeId>,
    queue_full: HashMap<NodeId, QueueFullBehavior>,
    default_behavior: QueueFullBehavior,
}

impl ChainRouting {
    /// `path[i] -> path[i + 1]`，最后一个节点之后离开系统
    pub fn new(path: &[NodeId]) -> Self {
        let next = path.windows(2).map(|w| (w[0], w[1])).collect();
        Self {
            next,
            queue_full: HashMap::new(),
            default_behavior: QueueFullBehavior::default(),
        }
    }

    pub fn with_queue_full(mut self, destination: NodeId, behavior: QueueFullBehavior) -> Self {
        self.queue_full.insert(destination, behavior);
        self
    }

    pub fn with_default_queue_full(mut self, behavior: QueueFullBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }
}

impl Routing for ChainRouting {
    fn route_after_service(&self, origin: NodeId, _rng: &mut dyn RngCore) -> RoutingDecision {
        match self.next.get(&origin) {
            Some(&destination) => RoutingDecision::SeekDestination {
                destination,
                behavior: self
                    .queue_full
                    .get(&destination)
                    .copied()
                    .unwrap_or(self.default_behavior),
            },
            None => RoutingDecision::ExitSystem,
        }
    }
}
