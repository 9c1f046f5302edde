//! 网络模型
//!
//! 节点、边、人群、个体以及把它们组合在一起的场景。

mod arc;
mod cohort;
mod id;
mod individual;
mod node;
mod scenario;

pub use arc::WeightedArc;
pub use cohort::{Cohort, NodeProperties};
pub use id::{CohortId, NodeId};
pub use individual::Individual;
pub use node::{Network, Node};
pub use scenario::Scenario;
