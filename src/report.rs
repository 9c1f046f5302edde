//! 制表符分隔的文本输出
//!
//! - `records_tsv`：按到达时间排序的访问记录
//! - `queue_length_tsv`：各节点队列长度随时间的变化

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::model::{Network, NodeId};
use crate::sim::{VisitOutcome, VisitRecord};

const RECORDS_HEADER: &str = "Arrival Time\tNode Id\tIndividual Id\tCohort Id\tQueue Size at Arrival\tRejection\tService Start Time\tService End Time\tExit Time\tQueue Size at Exit\tDestination Node Id";

/// 每条记录一行；拒绝记录只填写到拒绝原因（及开始服务时间）为止
pub fn records_tsv(network: &Network, records: &[VisitRecord]) -> String {
    let mut sorted: Vec<&VisitRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.arrival);

    let mut out = String::new();
    out.push_str(RECORDS_HEADER);
    out.push('\n');
    for r in sorted {
        // 写入 String 不会失败
        let _ = write!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            r.arrival,
            network.name(r.node),
            r.individual.id,
            r.individual.cohort.0,
            r.queue_size_at_arrival
        );
        let _ = match &r.outcome {
            VisitOutcome::Served(s) => write!(
                out,
                "\t\t{}\t{}\t{}\t{}\t{}",
                s.service_start,
                s.service_end,
                s.exit,
                s.queue_size_at_exit,
                s.destination.map(|d| network.name(d)).unwrap_or("")
            ),
            VisitOutcome::RejectedAtArrival => write!(out, "\tRejected at Arrival"),
            VisitOutcome::RejectedAtServiceStart { service_start, .. } => {
                write!(out, "\tRejected at Service Start\t{service_start}")
            }
        };
        out.push('\n');
    }
    out
}

/// 每个节点从 `0` 时刻长度 0 开始，之后每个有变化的时刻输出一行。
/// 服务结束但被阻塞、尚未离开的时刻记一个 0 增量的标记。
pub fn queue_length_tsv(network: &Network, records: &[VisitRecord]) -> String {
    let mut deltas: BTreeMap<NodeId, BTreeMap<u64, i64>> = BTreeMap::new();
    for r in records {
        let per_time = deltas.entry(r.node).or_default();
        match &r.outcome {
            VisitOutcome::Served(s) => {
                *per_time.entry(r.arrival.0).or_default() += 1;
                *per_time.entry(s.exit.0).or_default() -= 1;
                per_time.entry(s.service_end.0).or_default();
            }
            VisitOutcome::RejectedAtArrival => {}
            VisitOutcome::RejectedAtServiceStart { service_start, .. } => {
                *per_time.entry(r.arrival.0).or_default() += 1;
                *per_time.entry(service_start.0).or_default() -= 1;
            }
        }
    }

    let mut out = String::from("Node\tTime\tQueue Length\n");
    for (node, per_time) in deltas {
        let name = network.name(node);
        let mut len: i64 = 0;
        let _ = writeln!(out, "{name}\t0\t{len}");
        for (time, delta) in per_time {
            len += delta;
            let _ = writeln!(out, "{name}\t{time}\t{len}");
        }
    }
    out
}
