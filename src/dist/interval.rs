//! 闭区间
//!
//! 时间上的闭区间 `[start, end]`，用于划分分布生效的时间段。

use std::fmt;

use serde::Serialize;

use crate::error::SimError;
use crate::sim::SimTime;

/// 闭区间 `[start, end]`，`start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    start: SimTime,
    end: SimTime,
}

impl Interval {
    /// 创建区间；`start > end` 视为配置错误
    pub fn new(start: u64, end: u64) -> Result<Self, SimError> {
        if start > end {
            return Err(SimError::InvalidInterval { start, end });
        }
        Ok(Self {
            start: SimTime(start),
            end: SimTime(end),
        })
    }

    pub fn start(&self) -> SimTime {
        self.start
    }

    pub fn end(&self) -> SimTime {
        self.end
    }

    /// 两端都包含
    pub fn contains(&self, t: SimTime) -> bool {
        t >= self.start && t <= self.end
    }

    /// 共享任何一段区间即视为重叠；首尾相接（一个的 end 等于另一个的 start）不算重叠。
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start.0, self.end.0)
    }
}
