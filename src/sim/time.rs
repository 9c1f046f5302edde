//! 仿真时间类型
//!
//! 仿真时间是单调递增的整数计数器，与真实时间无关。

use std::fmt;

use serde::Serialize;

/// 仿真时间（无单位的整数刻度）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    /// 事件时间的安全上限，超过即视为时间无界增长
    pub const LIMIT: SimTime = SimTime(1 << 62);

    pub fn saturating_add(self, d: u64) -> SimTime {
        SimTime(self.0.saturating_add(d))
    }

    /// `self - earlier`，不会下溢
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
