//! 仿真事件
//!
//! 事件一旦创建即不可变；时间戳由调度器条目携带。

use super::state::VisitId;
use crate::model::{Individual, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// 个体到达节点
    Arrival { individual: Individual, node: NodeId },
    /// 个体在 `node` 的 `server` 上完成服务
    CompleteService {
        visit: VisitId,
        node: NodeId,
        server: usize,
    },
}
