//! 访问记录一致性检查
//!
//! 对一次运行的完整记录流做事后校验，用于发现引擎自身的错误。

use std::collections::HashMap;

use crate::model::{Individual, NodeId};
use crate::sim::{SimTime, VisitRecord};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("server {server} at {node} starts {individual} at {start} before the previous individual left at {previous_exit}")]
    ServerOverlap {
        node: NodeId,
        server: usize,
        individual: Individual,
        start: SimTime,
        previous_exit: SimTime,
    },

    #[error("{individual} has a record at {node} after being rejected")]
    RecordAfterRejection { individual: Individual, node: NodeId },

    #[error("{individual} arrives at {node} at {arrival} but left the previous node at {previous_exit}")]
    ArrivalMismatch {
        individual: Individual,
        node: NodeId,
        arrival: SimTime,
        previous_exit: SimTime,
    },

    #[error("{individual} at {node} has out-of-order timestamps (arrival {arrival}, start {start}, end {end}, exit {exit})")]
    TimestampOrder {
        individual: Individual,
        node: NodeId,
        arrival: SimTime,
        start: SimTime,
        end: SimTime,
        exit: SimTime,
    },
}

/// 校验记录流：
/// - 同一服务台上，前一个个体离开之前不能开始服务下一个；
/// - 个体被拒绝后不能再有记录；
/// - 每次到达时间等于上一次离开时间；
/// - 服务记录满足 `arrival <= start <= end <= exit`。
pub fn validate(records: &[VisitRecord]) -> Result<(), ValidationError> {
    let mut by_server: HashMap<(NodeId, usize), Vec<&VisitRecord>> = HashMap::new();
    for r in records {
        if let Some(s) = r.served() {
            by_server.entry((r.node, s.server)).or_default().push(r);
        }
    }
    for ((node, server), mut visits) in by_server {
        visits.sort_by_key(|r| r.served().map(|s| (s.service_start, s.exit)));
        let mut previous_exit: Option<SimTime> = None;
        for r in visits {
            let Some(s) = r.served() else { continue };
            if let Some(prev) = previous_exit {
                if prev > s.service_start {
                    return Err(ValidationError::ServerOverlap {
                        node,
                        server,
                        individual: r.individual,
                        start: s.service_start,
                        previous_exit: prev,
                    });
                }
            }
            previous_exit = Some(s.exit);
        }
    }

    let mut by_individual: HashMap<Individual, Vec<&VisitRecord>> = HashMap::new();
    for r in records {
        by_individual.entry(r.individual).or_default().push(r);
    }
    for (individual, mut visits) in by_individual {
        visits.sort_by_key(|r| r.arrival);
        let mut previous_exit: Option<SimTime> = None;
        let mut rejected = false;
        for r in visits {
            if rejected {
                return Err(ValidationError::RecordAfterRejection {
                    individual,
                    node: r.node,
                });
            }
            let expected = *previous_exit.get_or_insert(r.arrival);
            if expected != r.arrival {
                return Err(ValidationError::ArrivalMismatch {
                    individual,
                    node: r.node,
                    arrival: r.arrival,
                    previous_exit: expected,
                });
            }
            match r.served() {
                Some(s) => {
                    if !(r.arrival <= s.service_start
                        && s.service_start <= s.service_end
                        && s.service_end <= s.exit)
                    {
                        return Err(ValidationError::TimestampOrder {
                            individual,
                            node: r.node,
                            arrival: r.arrival,
                            start: s.service_start,
                            end: s.service_end,
                            exit: s.exit,
                        });
                    }
                    previous_exit = Some(s.exit);
                }
                None => rejected = true,
            }
        }
    }
    Ok(())
}
