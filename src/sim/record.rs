//! 访问记录
//!
//! 每个个体每到达一次节点，恰好产生一条访问记录。

use serde::Serialize;

use super::time::SimTime;
use crate::model::{Individual, NodeId};

/// 个体被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// 到达时队列已满
    QueueFull,
    /// 没有可选的服务台且队列已满
    CannotSelectServer,
    /// 服务时长分布在当前时间之后已经耗尽
    CannotCompleteService,
}

/// 完成服务的访问
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServedVisit {
    pub service_start: SimTime,
    pub service_end: SimTime,
    /// 离开节点的时间；被下游阻塞时晚于 `service_end`
    pub exit: SimTime,
    /// 下一个节点；`None` 表示离开系统
    pub destination: Option<NodeId>,
    pub queue_size_at_exit: usize,
    pub server: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisitOutcome {
    RejectedAtArrival,
    RejectedAtServiceStart {
        service_start: SimTime,
        reason: RejectionReason,
    },
    Served(ServedVisit),
}

/// 一次到达的最终结果，键为 `(individual, node, arrival)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisitRecord {
    pub individual: Individual,
    pub node: NodeId,
    pub arrival: SimTime,
    pub queue_size_at_arrival: usize,
    pub outcome: VisitOutcome,
}

impl VisitRecord {
    pub fn served(&self) -> Option<&ServedVisit> {
        match &self.outcome {
            VisitOutcome::Served(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_rejection(&self) -> bool {
        !matches!(self.outcome, VisitOutcome::Served(_))
    }

    /// 排队等待时长（到达至开始服务）
    pub fn waiting_duration(&self) -> Option<u64> {
        match &self.outcome {
            VisitOutcome::Served(s) => Some(s.service_start.since(self.arrival)),
            VisitOutcome::RejectedAtServiceStart { service_start, .. } => {
                Some(service_start.since(self.arrival))
            }
            VisitOutcome::RejectedAtArrival => None,
        }
    }

    pub fn service_duration(&self) -> Option<u64> {
        self.served().map(|s| s.service_end.since(s.service_start))
    }

    /// 服务结束后因下游队列已满而阻塞服务台的时长
    pub fn block_duration(&self) -> Option<u64> {
        self.served().map(|s| s.exit.since(s.service_end))
    }
}
