//! 路由策略
//!
//! 服务完成后决定个体离开系统，还是前往某个目标节点；以及目标节点队列已满时
//! 如何处理。

use std::fmt::Debug;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::model::NodeId;

mod chain;
mod random;

pub use chain::ChainRouting;
pub use random::RandomRouting;

/// 目标节点队列已满时的行为
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueFullBehavior {
    /// 个体在目标节点被拒绝，原节点的服务台随即释放
    #[default]
    RejectIndividual,
    /// 个体留在原节点并阻塞其服务台，直到目标队列有空位
    WaitAndBlockCurrentServer,
}

/// 路由决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    ExitSystem,
    SeekDestination {
        destination: NodeId,
        behavior: QueueFullBehavior,
    },
}

/// 路由策略接口
pub trait Routing: Debug + Send + Sync {
    /// 个体在 `origin` 完成服务后的去向
    fn route_after_service(&self, origin: NodeId, rng: &mut dyn RngCore) -> RoutingDecision;
}
