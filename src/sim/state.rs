//! 单次运行的可变状态
//!
//! - `NodeState`：节点的服务台占用、等待队列和溢出（阻塞）队列
//! - `VisitLog`：随事件处理逐步填充的访问记录，字段全部就绪后才会输出

use std::collections::VecDeque;

use super::record::{RejectionReason, ServedVisit, VisitOutcome, VisitRecord};
use super::time::SimTime;
use crate::model::{Individual, Node, NodeId};

/// 访问记录在 `VisitLog` 中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisitId(pub(crate) usize);

/// 在 `blocked_node` 完成服务、但因目标队列已满而占着 `blocked_server` 等待的个体
#[derive(Debug, Clone, Copy)]
pub(crate) struct Overflow {
    pub(crate) visit: VisitId,
    pub(crate) blocked_node: NodeId,
    pub(crate) blocked_server: usize,
}

#[derive(Debug)]
pub(crate) struct NodeState {
    pub(crate) servers: Vec<Option<Individual>>,
    /// FIFO 等待队列；访问记录中带有到达时间
    pub(crate) queue: VecDeque<VisitId>,
    pub(crate) overflow: VecDeque<Overflow>,
    capacity: Option<usize>,
}

impl NodeState {
    pub(crate) fn new(node: &Node) -> Self {
        Self {
            servers: vec![None; node.servers()],
            queue: VecDeque::new(),
            overflow: VecDeque::new(),
            capacity: node.queue_capacity(),
        }
    }

    pub(crate) fn is_queue_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.queue.len() >= cap)
    }

    pub(crate) fn busy_servers(&self) -> usize {
        self.servers.iter().filter(|s| s.is_some()).count()
    }
}

#[derive(Debug, Clone)]
struct Visit {
    individual: Individual,
    node: NodeId,
    arrival: SimTime,
    queue_size_at_arrival: usize,
    service_start: Option<SimTime>,
    server: Option<usize>,
    service_end: Option<SimTime>,
    exit: Option<SimTime>,
    queue_size_at_exit: Option<usize>,
    destination: Option<NodeId>,
    rejection: Option<RejectionReason>,
}

impl Visit {
    /// 字段未填全（仍在排队、服务中或被阻塞）时返回 `None`
    fn finalize(&self) -> Option<VisitRecord> {
        let outcome = match self.rejection {
            Some(RejectionReason::QueueFull) => VisitOutcome::RejectedAtArrival,
            Some(reason) => VisitOutcome::RejectedAtServiceStart {
                service_start: self.service_start?,
                reason,
            },
            None => VisitOutcome::Served(ServedVisit {
                service_start: self.service_start?,
                service_end: self.service_end?,
                exit: self.exit?,
                destination: self.destination,
                queue_size_at_exit: self.queue_size_at_exit?,
                server: self.server?,
            }),
        };
        Some(VisitRecord {
            individual: self.individual,
            node: self.node,
            arrival: self.arrival,
            queue_size_at_arrival: self.queue_size_at_arrival,
            outcome,
        })
    }
}

/// 按创建顺序保存的访问记录
#[derive(Debug, Default)]
pub(crate) struct VisitLog {
    visits: Vec<Visit>,
}

impl VisitLog {
    pub(crate) fn open(
        &mut self,
        individual: Individual,
        node: NodeId,
        arrival: SimTime,
        queue_size_at_arrival: usize,
    ) -> VisitId {
        let id = VisitId(self.visits.len());
        self.visits.push(Visit {
            individual,
            node,
            arrival,
            queue_size_at_arrival,
            service_start: None,
            server: None,
            service_end: None,
            exit: None,
            queue_size_at_exit: None,
            destination: None,
            rejection: None,
        });
        id
    }

    pub(crate) fn individual(&self, id: VisitId) -> Individual {
        self.visits[id.0].individual
    }

    pub(crate) fn start_service(&mut self, id: VisitId, at: SimTime, server: usize) {
        let v = &mut self.visits[id.0];
        v.service_start = Some(at);
        v.server = Some(server);
    }

    pub(crate) fn complete_service(&mut self, id: VisitId, at: SimTime) {
        self.visits[id.0].service_end = Some(at);
    }

    pub(crate) fn reject(
        &mut self,
        id: VisitId,
        reason: RejectionReason,
        service_start: Option<SimTime>,
    ) {
        let v = &mut self.visits[id.0];
        v.rejection = Some(reason);
        v.service_start = service_start;
    }

    pub(crate) fn exit(
        &mut self,
        id: VisitId,
        at: SimTime,
        queue_size: usize,
        destination: Option<NodeId>,
    ) {
        let v = &mut self.visits[id.0];
        v.exit = Some(at);
        v.queue_size_at_exit = Some(queue_size);
        v.destination = destination;
    }

    pub(crate) fn len(&self) -> usize {
        self.visits.len()
    }

    pub(crate) fn clear(&mut self) {
        self.visits.clear();
    }

    /// 已完成的记录，按创建（到达）顺序
    pub(crate) fn records(&self) -> Vec<VisitRecord> {
        self.visits.iter().filter_map(Visit::finalize).collect()
    }
}
