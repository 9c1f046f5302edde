//! 分布选择器
//!
//! 一组互不重叠的 `(区间, 分布)`，按区间起点排序。给定当前时间，
//! 选出生效的分布并计算下一个事件时间。
//!
//! 若抽到的时长越过了当前区间的终点，只有落在区间内的那一部分被“消耗”，
//! 剩余比例 `1 - consumed / duration` 带入下一个区间，并用下一个区间自己的
//! 分布重新抽样、按该比例缩放。所有后续区间都装不下剩余部分时返回 `None`，
//! 即该时间段的分布体制已经结束。

use rand::{Rng, RngCore};
use tracing::trace;

use super::distribution::{DurationDistribution, to_duration};
use super::interval::Interval;
use crate::error::SimError;
use crate::sim::SimTime;

#[derive(Debug, Clone, Default)]
pub struct DistributionSelector {
    entries: Vec<(Interval, DurationDistribution)>,
    /// 首次到达使用的固定比例；为空时在 `[0, 1)` 上均匀抽取
    initial_fraction: Option<f64>,
}

impl DistributionSelector {
    /// 构建选择器；区间重叠或比例越界视为配置错误
    pub fn new(
        entries: impl IntoIterator<Item = (Interval, DurationDistribution)>,
        initial_fraction: Option<f64>,
    ) -> Result<Self, SimError> {
        if let Some(f) = initial_fraction {
            if !(0.0..=1.0).contains(&f) {
                return Err(SimError::InvalidFraction(f));
            }
        }

        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by_key(|(interval, _)| interval.start());

        for (i, (a, _)) in entries.iter().enumerate() {
            for (b, _) in &entries[i + 1..] {
                if a.overlaps(b) {
                    return Err(SimError::OverlappingIntervals {
                        first: *a,
                        second: *b,
                    });
                }
            }
        }

        Ok(Self {
            entries,
            initial_fraction,
        })
    }

    /// 永远不产生事件的选择器（例如没有外部到达的节点）
    pub fn none() -> Self {
        Self::default()
    }

    /// 单区间常数时长
    pub fn constant(
        start: u64,
        end: u64,
        duration: u64,
        initial_fraction: Option<f64>,
    ) -> Result<Self, SimError> {
        Self::new(
            [(
                Interval::new(start, end)?,
                DurationDistribution::constant(duration),
            )],
            initial_fraction,
        )
    }

    /// 单区间均匀分布 `[min, max)`
    pub fn uniform(
        start: u64,
        end: u64,
        min: u64,
        max: u64,
        initial_fraction: Option<f64>,
    ) -> Result<Self, SimError> {
        Self::new(
            [(
                Interval::new(start, end)?,
                DurationDistribution::uniform(min, max)?,
            )],
            initial_fraction,
        )
    }

    /// 单区间指数分布
    pub fn exponential(
        start: u64,
        end: u64,
        rate: f64,
        initial_fraction: Option<f64>,
    ) -> Result<Self, SimError> {
        Self::new(
            [(
                Interval::new(start, end)?,
                DurationDistribution::exponential(rate)?,
            )],
            initial_fraction,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 计算 `now` 之后的下一个事件时间。
    ///
    /// `is_initial` 表示首个事件（没有上一次到达可供偏移），此时时长先乘以
    /// 初始比例，避免所有节点在启动时同步到达。
    pub fn try_next_time(
        &mut self,
        now: SimTime,
        is_initial: bool,
        rng: &mut dyn RngCore,
    ) -> Option<SimTime> {
        let mut fraction = if is_initial {
            match self.initial_fraction {
                Some(f) => f,
                None => rng.r#gen::<f64>(),
            }
        } else {
            1.0
        };

        for (interval, dist) in self.entries.iter_mut() {
            if interval.end() < now {
                continue;
            }
            let point = now.max(interval.start());
            let raw = dist.sample(rng);
            let duration = scale(raw, fraction);
            let candidate = point.saturating_add(duration);
            if candidate <= interval.end() {
                return Some(candidate);
            }

            // 只有 [point, end] 这一段被消耗，剩余部分带入下一个区间
            let consumed = interval.end().since(point);
            fraction = 1.0 - consumed as f64 / duration as f64;
            trace!(%interval, raw, duration, consumed, fraction, "时长溢出当前区间");
        }
        None
    }
}

fn scale(raw: u64, fraction: f64) -> u64 {
    if fraction == 1.0 {
        raw
    } else {
        to_duration(raw as f64 * fraction)
    }
}
