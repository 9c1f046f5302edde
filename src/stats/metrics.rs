//! 集合统计量
//!
//! Welford 单遍算法计算均值与总体方差，同时记录最小值、最大值、个数和总和。

use serde::Serialize;

/// 流式累加器
#[derive(Debug, Clone, Copy, Default)]
pub struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    sum: f64,
}

impl Welford {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.sum += value;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// 空集合的所有统计量为 0
    pub fn finish(&self) -> SetMetrics {
        if self.count == 0 {
            return SetMetrics::default();
        }
        SetMetrics {
            mean: self.mean,
            variance: self.m2 / self.count as f64,
            min: self.min,
            max: self.max,
            count: self.count as f64,
            sum: self.sum,
        }
    }
}

impl Extend<f64> for Welford {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for v in iter {
            self.push(v);
        }
    }
}

/// 一组数值的汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SetMetrics {
    pub mean: f64,
    /// 总体方差
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub count: f64,
    pub sum: f64,
}

impl SetMetrics {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut acc = Welford::new();
        acc.extend(values);
        acc.finish()
    }

    /// 整数时长的便捷入口
    pub fn from_durations(values: impl IntoIterator<Item = u64>) -> Self {
        Self::from_values(values.into_iter().map(|v| v as f64))
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// 多次运行的同一统计量再做一次汇总（统计量的统计量）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsAggregation {
    pub mean: SetMetrics,
    pub variance: SetMetrics,
    pub min: SetMetrics,
    pub max: SetMetrics,
    pub count: SetMetrics,
    pub sum: SetMetrics,
}

impl MetricsAggregation {
    pub fn merge<'a>(sets: impl IntoIterator<Item = &'a SetMetrics>) -> Self {
        let mut acc = [Welford::new(); 6];
        for m in sets {
            for (w, v) in acc
                .iter_mut()
                .zip([m.mean, m.variance, m.min, m.max, m.count, m.sum])
            {
                w.push(v);
            }
        }
        let [mean, variance, min, max, count, sum] = acc.map(|w| w.finish());
        Self {
            mean,
            variance,
            min,
            max,
            count,
            sum,
        }
    }
}
