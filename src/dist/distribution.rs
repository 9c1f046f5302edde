//! 时长分布
//!
//! 每次抽样产生一个非负整数时长。连续分布的样本按“四舍六入五成双”取整，
//! 负数截断为 0。

use std::sync::Arc;

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Exp, Normal};

use crate::error::SimError;

/// 时长分布（闭集合）
#[derive(Debug, Clone)]
pub enum DurationDistribution {
    /// 每次返回同一个时长
    Constant(u64),
    /// `[min, max)` 上的整数均匀分布
    Uniform { min: u64, max: u64 },
    /// 指数分布，参数为速率
    Exponential(Exp<f64>),
    /// 正态分布，可选上下界截断
    Normal {
        dist: Normal<f64>,
        min: Option<u64>,
        max: Option<u64>,
    },
    /// 经验数据：随机抽取，或按顺序循环回放
    Empirical(EmpiricalDuration),
}

/// 经验分布。回放游标属于所在仿真运行持有的那份拷贝。
#[derive(Debug, Clone)]
pub struct EmpiricalDuration {
    values: Arc<[u64]>,
    randomize: bool,
    cursor: usize,
}

impl DurationDistribution {
    pub fn constant(duration: u64) -> Self {
        Self::Constant(duration)
    }

    pub fn uniform(min: u64, max: u64) -> Result<Self, SimError> {
        if min >= max {
            return Err(SimError::InvalidDistribution(format!(
                "uniform bounds require min < max, got [{min}, {max})"
            )));
        }
        Ok(Self::Uniform { min, max })
    }

    pub fn exponential(rate: f64) -> Result<Self, SimError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SimError::InvalidDistribution(format!(
                "exponential rate must be positive, got {rate}"
            )));
        }
        let dist = Exp::new(rate)
            .map_err(|e| SimError::InvalidDistribution(format!("exponential: {e}")))?;
        Ok(Self::Exponential(dist))
    }

    pub fn normal(
        mean: f64,
        std_dev: f64,
        min: Option<u64>,
        max: Option<u64>,
    ) -> Result<Self, SimError> {
        if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
            return Err(SimError::InvalidDistribution(format!(
                "normal requires a finite mean and a finite non-negative std dev, got mean {mean}, std dev {std_dev}"
            )));
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(SimError::InvalidDistribution(format!(
                    "normal clamp bounds require min <= max, got [{lo}, {hi}]"
                )));
            }
        }
        let dist = Normal::new(mean, std_dev)
            .map_err(|e| SimError::InvalidDistribution(format!("normal: {e}")))?;
        Ok(Self::Normal { dist, min, max })
    }

    pub fn empirical(values: impl Into<Vec<u64>>, randomize: bool) -> Result<Self, SimError> {
        let values: Vec<u64> = values.into();
        if values.is_empty() {
            return Err(SimError::InvalidDistribution(
                "empirical distribution needs at least one value".to_string(),
            ));
        }
        Ok(Self::Empirical(EmpiricalDuration {
            values: values.into(),
            randomize,
            cursor: 0,
        }))
    }

    /// 抽取一个时长
    pub fn sample(&mut self, rng: &mut dyn RngCore) -> u64 {
        match self {
            Self::Constant(d) => *d,
            Self::Uniform { min, max } => rng.gen_range(*min..*max),
            Self::Exponential(dist) => to_duration(dist.sample(rng)),
            Self::Normal { dist, min, max } => {
                let mut d = to_duration(dist.sample(rng));
                if let Some(lo) = min {
                    d = d.max(*lo);
                }
                if let Some(hi) = max {
                    d = d.min(*hi);
                }
                d
            }
            Self::Empirical(e) => e.next(rng),
        }
    }
}

impl EmpiricalDuration {
    fn next(&mut self, rng: &mut dyn RngCore) -> u64 {
        if self.randomize {
            return self.values[rng.gen_range(0..self.values.len())];
        }
        let d = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        d
    }
}

/// 连续样本转为时长：银行家舍入，负数与 NaN 记为 0
pub(crate) fn to_duration(x: f64) -> u64 {
    let r = x.round_ties_even();
    if r.is_nan() || r <= 0.0 { 0 } else { r as u64 }
}
