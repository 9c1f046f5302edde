//! 场景：网络拓扑加上人群定义
//!
//! 场景在仿真运行之间只读共享；每次运行拷贝自己需要修改的部分。

use super::cohort::Cohort;
use super::id::CohortId;
use super::node::Network;

#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub network: Network,
    pub cohorts: Vec<Cohort>,
}

impl Scenario {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            cohorts: Vec::new(),
        }
    }

    pub fn add_cohort(&mut self, cohort: Cohort) -> CohortId {
        let id = CohortId(self.cohorts.len());
        self.cohorts.push(cohort);
        id
    }
}
