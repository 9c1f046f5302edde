//! 仿真报告
//!
//! 单次运行按节点汇总访问记录；多次运行再逐节点合并。

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::metrics::{MetricsAggregation, SetMetrics};
use crate::model::NodeId;
use crate::sim::{SimTime, VisitOutcome, VisitRecord};

/// 报告只统计到达时间落在 `[min, max]` 内的记录；两端均可省略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub min: Option<SimTime>,
    pub max: Option<SimTime>,
}

impl TimeWindow {
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        Self {
            min: min.map(SimTime),
            max: max.map(SimTime),
        }
    }

    pub fn contains(&self, t: SimTime) -> bool {
        self.min.is_none_or(|min| t >= min) && self.max.is_none_or(|max| t <= max)
    }
}

/// 单个节点在一次运行中的指标
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NodeReport {
    pub waiting: SetMetrics,
    pub service: SetMetrics,
    /// 只包含阻塞时长大于 0 的访问
    pub block: SetMetrics,
    pub rejected_at_arrival: u64,
    pub rejected_at_service_start: u64,
}

impl NodeReport {
    pub fn served(&self) -> u64 {
        self.service.count as u64
    }

    pub fn rejected(&self) -> u64 {
        self.rejected_at_arrival + self.rejected_at_service_start
    }
}

/// 一次运行的报告
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationReport {
    pub nodes: BTreeMap<NodeId, NodeReport>,
}

impl SimulationReport {
    pub fn from_records(records: &[VisitRecord], window: TimeWindow) -> Self {
        let mut grouped: BTreeMap<NodeId, Vec<&VisitRecord>> = BTreeMap::new();
        for r in records.iter().filter(|r| window.contains(r.arrival)) {
            grouped.entry(r.node).or_default().push(r);
        }

        let nodes = grouped
            .into_iter()
            .map(|(node, visits)| {
                let served = || visits.iter().copied().filter(|r| r.served().is_some());
                let report = NodeReport {
                    waiting: SetMetrics::from_durations(
                        served().filter_map(VisitRecord::waiting_duration),
                    ),
                    service: SetMetrics::from_durations(
                        served().filter_map(VisitRecord::service_duration),
                    ),
                    block: SetMetrics::from_durations(
                        served()
                            .filter_map(VisitRecord::block_duration)
                            .filter(|d| *d > 0),
                    ),
                    rejected_at_arrival: count(&visits, |o| {
                        matches!(o, VisitOutcome::RejectedAtArrival)
                    }),
                    rejected_at_service_start: count(&visits, |o| {
                        matches!(o, VisitOutcome::RejectedAtServiceStart { .. })
                    }),
                };
                (node, report)
            })
            .collect();
        Self { nodes }
    }

    pub fn served(&self) -> u64 {
        self.nodes.values().map(NodeReport::served).sum()
    }

    pub fn rejected_at_arrival(&self) -> u64 {
        self.nodes.values().map(|n| n.rejected_at_arrival).sum()
    }

    pub fn rejected_at_service_start(&self) -> u64 {
        self.nodes.values().map(|n| n.rejected_at_service_start).sum()
    }

    pub fn rejected(&self) -> u64 {
        self.rejected_at_arrival() + self.rejected_at_service_start()
    }
}

fn count(visits: &[&VisitRecord], pred: impl Fn(&VisitOutcome) -> bool) -> u64 {
    visits.iter().filter(|r| pred(&r.outcome)).count() as u64
}

/// 多次运行合并后的节点指标
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregatedNodeReport {
    pub waiting: MetricsAggregation,
    pub service: MetricsAggregation,
    pub block: MetricsAggregation,
    pub rejected_at_arrival: SetMetrics,
    pub rejected_at_service_start: SetMetrics,
}

impl AggregatedNodeReport {
    /// 每次运行平均服务的个体数
    pub fn mean_served(&self) -> f64 {
        self.service.count.mean
    }
}

/// 逐节点合并多次运行的报告；某次运行中没有记录的节点按空报告计入
pub fn merge_reports(reports: &[SimulationReport]) -> BTreeMap<NodeId, AggregatedNodeReport> {
    let nodes: BTreeSet<NodeId> = reports
        .iter()
        .flat_map(|r| r.nodes.keys().copied())
        .collect();

    nodes
        .into_iter()
        .map(|node| {
            let per_run: Vec<NodeReport> = reports
                .iter()
                .map(|r| r.nodes.get(&node).copied().unwrap_or_default())
                .collect();
            let aggregated = AggregatedNodeReport {
                waiting: MetricsAggregation::merge(per_run.iter().map(|n| &n.waiting)),
                service: MetricsAggregation::merge(per_run.iter().map(|n| &n.service)),
                block: MetricsAggregation::merge(per_run.iter().map(|n| &n.block)),
                rejected_at_arrival: SetMetrics::from_values(
                    per_run.iter().map(|n| n.rejected_at_arrival as f64),
                ),
                rejected_at_service_start: SetMetrics::from_values(
                    per_run.iter().map(|n| n.rejected_at_service_start as f64),
                ),
            };
            (node, aggregated)
        })
        .collect()
}
