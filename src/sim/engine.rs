//! 仿真引擎
//!
//! 单线程、确定性的事件循环：从事件队列中按时间取出到达/服务完成事件，
//! 推进每个个体的状态机，并产出访问记录。
//!
//! 个体生命周期：
//!
//! ```text
//! 到达 ──┬─ 队列为空 ─> 尝试开始服务 ──┬─ 服务中 ─> 完成服务 ─> 路由
//!        ├─ 队列已满 ─> 拒绝(QueueFull) ├─ 排队
//!        └─ 排队                        └─ 拒绝(CannotSelectServer / CannotCompleteService)
//!
//! 路由 ──┬─ 离开系统
//!        ├─ 前往目标节点（到达）
//!        ├─ 目标已满 + RejectIndividual ─> 在目标节点被拒绝
//!        └─ 目标已满 + WaitAndBlockCurrentServer ─> 阻塞当前服务台，进入目标的溢出队列
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use super::cancel::CancellationToken;
use super::event::Event;
use super::record::{RejectionReason, VisitRecord};
use super::scheduler::EventQueue;
use super::state::{NodeState, Overflow, VisitId, VisitLog};
use super::time::SimTime;
use crate::error::SimError;
use crate::model::{Cohort, CohortId, Individual, Network, NodeId, Scenario};
use crate::routing::{QueueFullBehavior, RoutingDecision};

/// 单次运行的设置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationSettings {
    /// 时间戳超过它的事件不再处理；届时仍在排队或服务中的个体不出现在结果中
    pub max_time: Option<SimTime>,
}

impl SimulationSettings {
    pub fn with_max_time(max_time: u64) -> Self {
        Self {
            max_time: Some(SimTime(max_time)),
        }
    }
}

/// 一次仿真运行。拥有自己的随机数流、事件队列、节点状态和人群副本，
/// 多个运行之间不共享可变状态。
pub struct Simulation {
    network: Network,
    template: Vec<Cohort>,
    /// 本次运行使用的人群副本（经验分布的回放游标在这里推进）
    cohorts: Vec<Cohort>,
    settings: SimulationSettings,
    rng: ChaCha8Rng,
    now: SimTime,
    events: EventQueue,
    nodes: Vec<NodeState>,
    visits: VisitLog,
    /// 每个人群已创建的个体数
    next_individual: Vec<u64>,
}

impl Simulation {
    pub fn new(scenario: &Scenario, settings: SimulationSettings, seed: u64) -> Self {
        let mut sim = Self {
            network: scenario.network.clone(),
            template: scenario.cohorts.clone(),
            cohorts: Vec::new(),
            settings,
            rng: ChaCha8Rng::seed_from_u64(seed),
            now: SimTime::ZERO,
            events: EventQueue::default(),
            nodes: Vec::new(),
            visits: VisitLog::default(),
            next_individual: Vec::new(),
        };
        sim.clear_state();
        sim
    }

    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn settings(&self) -> SimulationSettings {
        self.settings
    }

    /// 清空所有节点的队列、服务台和溢出队列，保留拓扑；随机数流继续向前。
    pub fn clear_state(&mut self) {
        self.now = SimTime::ZERO;
        self.events.clear();
        self.visits.clear();
        self.cohorts = self.template.clone();
        self.nodes = self.network.iter().map(NodeState::new).collect();
        self.next_individual = vec![0; self.cohorts.len()];
    }

    /// 运行直到事件队列为空、超过 `max_time` 或收到取消信号，返回已完成的访问记录。
    #[tracing::instrument(skip(self, cancel), fields(nodes = self.network.len(), cohorts = self.template.len()))]
    pub fn start(&mut self, cancel: &CancellationToken) -> Result<Vec<VisitRecord>, SimError> {
        info!("▶️  开始运行仿真");
        self.clear_state();
        self.schedule_initial_arrivals();
        debug!(queue_size = self.events.len(), "初始事件已调度");

        let mut event_count: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                info!(now = %self.now, "仿真被取消");
                break;
            }
            let Some((at, ev)) = self.events.pop() else {
                break;
            };
            if self.settings.max_time.is_some_and(|max| at > max) {
                debug!(at = %at, "超过最大仿真时间，截断");
                break;
            }
            if at > SimTime::LIMIT {
                return Err(SimError::TimeLimitExceeded(at));
            }

            self.now = at;
            event_count += 1;
            debug!(
                event_num = event_count,
                now = %self.now,
                remaining_queue = self.events.len(),
                ?ev,
                "执行事件"
            );
            self.process(ev)?;
        }

        let records = self.visits.records();
        info!(
            total_events = event_count,
            final_time = %self.now,
            visits = self.visits.len(),
            records = records.len(),
            "✅ 仿真完成"
        );
        Ok(records)
    }

    fn process(&mut self, ev: Event) -> Result<(), SimError> {
        match ev {
            Event::Arrival { individual, node } => {
                self.arrive(individual, node)?;
                self.schedule_arrival(individual.cohort, node, false);
                Ok(())
            }
            Event::CompleteService {
                visit,
                node,
                server,
            } => self.complete_service(visit, node, server),
        }
    }

    fn schedule_initial_arrivals(&mut self) {
        let plan: Vec<(CohortId, NodeId)> = self
            .cohorts
            .iter()
            .enumerate()
            .flat_map(|(ci, cohort)| cohort.nodes().map(move |(node, _)| (CohortId(ci), node)))
            .collect();
        for (cohort, node) in plan {
            self.schedule_arrival(cohort, node, true);
        }
    }

    /// 为人群在节点上安排下一次外部到达；分布耗尽时不再安排。
    fn schedule_arrival(&mut self, cohort: CohortId, node: NodeId, is_initial: bool) {
        let now = self.now;
        let Some(props) = self.cohorts[cohort.0].properties_mut(node) else {
            return;
        };
        let Some(at) = props.arrivals.try_next_time(now, is_initial, &mut self.rng) else {
            trace!(%cohort, %node, "到达分布已耗尽");
            return;
        };
        let counter = &mut self.next_individual[cohort.0];
        *counter += 1;
        let individual = Individual {
            cohort,
            id: *counter,
        };
        self.events.push(at, Event::Arrival { individual, node });
    }

    /// 个体到达节点
    fn arrive(&mut self, individual: Individual, node: NodeId) -> Result<(), SimError> {
        let queue_len = self.nodes[node.0].queue.len();
        let visit = self.visits.open(individual, node, self.now, queue_len);
        trace!(%individual, %node, queue_len, "个体到达");

        if queue_len == 0 {
            return self.try_serve(visit, individual, node);
        }
        if self.nodes[node.0].is_queue_full() {
            debug!(%individual, %node, "队列已满，拒绝");
            self.visits.reject(visit, RejectionReason::QueueFull, None);
            return Ok(());
        }
        self.nodes[node.0].queue.push_back(visit);
        Ok(())
    }

    /// 由服务台选择策略挑选服务台；没有可用服务台时排队或拒绝。
    fn try_serve(
        &mut self,
        visit: VisitId,
        individual: Individual,
        node: NodeId,
    ) -> Result<(), SimError> {
        let selector = match self.cohorts[individual.cohort.0].properties(node) {
            Some(props) => Arc::clone(&props.server_selector),
            None => return Err(self.missing_properties(individual.cohort, node)),
        };
        let state = &self.nodes[node.0];
        let Some(server) = selector.select(&state.servers, &mut self.rng) else {
            if state.is_queue_full() {
                debug!(%individual, %node, "无可用服务台且队列已满，拒绝");
                self.visits
                    .reject(visit, RejectionReason::CannotSelectServer, Some(self.now));
            } else {
                self.nodes[node.0].queue.push_back(visit);
            }
            return Ok(());
        };

        if state.servers.get(server).is_none_or(Option::is_some) {
            return Err(SimError::ImplausibleServer {
                node: self.network.name(node).to_string(),
                server,
            });
        }
        self.start_service(visit, individual, node, server)?;
        Ok(())
    }

    /// 在指定服务台上开始服务。服务时长无法产生时拒绝个体并保持服务台原状，返回 `false`。
    fn start_service(
        &mut self,
        visit: VisitId,
        individual: Individual,
        node: NodeId,
        server: usize,
    ) -> Result<bool, SimError> {
        let now = self.now;
        let Some(props) = self.cohorts[individual.cohort.0].properties_mut(node) else {
            return Err(self.missing_properties(individual.cohort, node));
        };
        let Some(done) = props.service.try_next_time(now, false, &mut self.rng) else {
            debug!(%individual, %node, "服务时长分布已耗尽，拒绝");
            self.visits
                .reject(visit, RejectionReason::CannotCompleteService, Some(now));
            return Ok(false);
        };

        self.nodes[node.0].servers[server] = Some(individual);
        self.events.push(
            done,
            Event::CompleteService {
                visit,
                node,
                server,
            },
        );
        self.visits.start_service(visit, now, server);
        trace!(%individual, %node, server, done = %done, "开始服务");
        Ok(true)
    }

    fn complete_service(
        &mut self,
        visit: VisitId,
        node: NodeId,
        server: usize,
    ) -> Result<(), SimError> {
        let now = self.now;
        self.visits.complete_service(visit, now);
        let individual = self.visits.individual(visit);
        let decision = self.cohorts[individual.cohort.0]
            .routing()
            .route_after_service(node, &mut self.rng);
        debug!(%individual, %node, ?decision, "服务完成，路由决策");

        match decision {
            RoutingDecision::ExitSystem => {
                let queue_len = self.nodes[node.0].queue.len();
                self.visits.exit(visit, now, queue_len, None);
            }
            RoutingDecision::SeekDestination {
                destination,
                behavior,
            } => {
                let queue_len = self.nodes[node.0].queue.len();
                if !self.nodes[destination.0].is_queue_full() {
                    self.visits.exit(visit, now, queue_len, Some(destination));
                    self.arrive(individual, destination)?;
                } else {
                    match behavior {
                        QueueFullBehavior::RejectIndividual => {
                            self.visits.exit(visit, now, queue_len, None);
                            let dest_len = self.nodes[destination.0].queue.len();
                            let rejected = self.visits.open(individual, destination, now, dest_len);
                            self.visits
                                .reject(rejected, RejectionReason::QueueFull, None);
                            debug!(%individual, %destination, "目标队列已满，拒绝");
                        }
                        QueueFullBehavior::WaitAndBlockCurrentServer => {
                            self.nodes[destination.0].overflow.push_back(Overflow {
                                visit,
                                blocked_node: node,
                                blocked_server: server,
                            });
                            debug!(%individual, %node, server, %destination, "目标队列已满，阻塞服务台");
                            return Ok(());
                        }
                    }
                }
            }
        }

        self.release_server(node, server)?;
        self.resolve_overflow(node)
    }

    /// 服务台空出后依次尝试队首个体；被拒绝的跳过，直到有人开始服务或队列清空。
    fn release_server(&mut self, node: NodeId, server: usize) -> Result<(), SimError> {
        while let Some(next) = self.nodes[node.0].queue.pop_front() {
            let individual = self.visits.individual(next);
            if self.start_service(next, individual, node, server)? {
                return Ok(());
            }
        }
        self.nodes[node.0].servers[server] = None;
        trace!(%node, server, busy = self.nodes[node.0].busy_servers(), "服务台空闲");
        Ok(())
    }

    /// 处理阻塞链：节点空出位置后接纳一个溢出个体，释放其被阻塞的服务台，
    /// 被释放的节点可能又能接纳自己的溢出个体，依此类推。
    /// 释放服务台时若有排队个体因服务时长耗尽被拒绝，同一节点会空出多个位置，
    /// 此时该节点重新入列，继续接纳溢出个体。
    /// 每轮消耗一个溢出条目，因此即使存在环形阻塞也会终止。
    fn resolve_overflow(&mut self, origin: NodeId) -> Result<(), SimError> {
        let mut pending = VecDeque::from([origin]);
        while let Some(node) = pending.pop_front() {
            let Some(overflow) = self.nodes[node.0].overflow.pop_front() else {
                continue;
            };
            let individual = self.visits.individual(overflow.visit);
            debug!(
                %individual,
                %node,
                blocked_node = %overflow.blocked_node,
                blocked_server = overflow.blocked_server,
                "解除阻塞"
            );

            self.arrive(individual, node)?;
            self.release_server(overflow.blocked_node, overflow.blocked_server)?;
            pending.push_back(overflow.blocked_node);

            let queue_len = self.nodes[overflow.blocked_node.0].queue.len();
            self.visits.exit(overflow.visit, self.now, queue_len, None);

            let state = &self.nodes[node.0];
            if !state.overflow.is_empty() && !state.is_queue_full() {
                pending.push_back(node);
            }
        }
        Ok(())
    }

    fn missing_properties(&self, cohort: CohortId, node: NodeId) -> SimError {
        SimError::MissingNodeProperties {
            cohort: self.cohorts[cohort.0].name().to_string(),
            node: self.network.name(node).to_string(),
        }
    }
}
