//! 个体

use std::fmt;

use serde::Serialize;

use super::id::CohortId;

/// 在网络中流转的一个个体。`id` 只在所属人群内唯一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Individual {
    pub cohort: CohortId,
    pub id: u64,
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.cohort, self.id)
    }
}
