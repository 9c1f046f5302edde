//! 服务台选择策略
//!
//! 决定新到的个体由哪个空闲服务台接收。

use std::fmt::Debug;

use rand::RngCore;
use rand::seq::SliceRandom;

use crate::model::Individual;

/// 服务台选择接口
pub trait ServerSelector: Debug + Send + Sync {
    /// `servers[i]` 为 `None` 表示第 i 个服务台空闲；全部忙碌时返回 `None`
    fn select(&self, servers: &[Option<Individual>], rng: &mut dyn RngCore) -> Option<usize>;
}

/// 选择下标最小的空闲服务台
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstServer;

impl ServerSelector for FirstServer {
    fn select(&self, servers: &[Option<Individual>], _rng: &mut dyn RngCore) -> Option<usize> {
        servers.iter().position(Option::is_none)
    }
}

/// 在空闲服务台中均匀随机选择
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomServer;

impl ServerSelector for RandomServer {
    fn select(&self, servers: &[Option<Individual>], rng: &mut dyn RngCore) -> Option<usize> {
        let idle: Vec<usize> = servers
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| i)
            .collect();
        idle.choose(rng).copied()
    }
}
