//! 人群
//!
//! 人群描述一类个体：会访问哪些节点、每个节点上的到达/服务时长分布和
//! 服务台选择策略，以及服务完成后的路由策略。构造后不再修改。

use std::collections::BTreeMap;
use std::sync::Arc;

use super::id::NodeId;
use crate::dist::DistributionSelector;
use crate::routing::Routing;
use crate::server::{FirstServer, ServerSelector};

/// 人群在某个节点上的属性
#[derive(Debug, Clone)]
pub struct NodeProperties {
    /// 外部到达间隔；`DistributionSelector::none()` 表示只能从其它节点路由过来
    pub arrivals: DistributionSelector,
    pub service: DistributionSelector,
    pub server_selector: Arc<dyn ServerSelector>,
}

impl NodeProperties {
    /// 默认选择第一个空闲服务台
    pub fn new(arrivals: DistributionSelector, service: DistributionSelector) -> Self {
        Self {
            arrivals,
            service,
            server_selector: Arc::new(FirstServer),
        }
    }

    pub fn with_server_selector(mut self, selector: Arc<dyn ServerSelector>) -> Self {
        self.server_selector = selector;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Cohort {
    name: String,
    nodes: BTreeMap<NodeId, NodeProperties>,
    routing: Arc<dyn Routing>,
}

impl Cohort {
    pub fn new(name: impl Into<String>, routing: Arc<dyn Routing>) -> Self {
        Self {
            name: name.into(),
            nodes: BTreeMap::new(),
            routing,
        }
    }

    /// 设置人群在 `node` 上的属性
    pub fn with_node(mut self, node: NodeId, properties: NodeProperties) -> Self {
        self.nodes.insert(node, properties);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn routing(&self) -> &dyn Routing {
        self.routing.as_ref()
    }

    pub fn properties(&self, node: NodeId) -> Option<&NodeProperties> {
        self.nodes.get(&node)
    }

    pub(crate) fn properties_mut(&mut self, node: NodeId) -> Option<&mut NodeProperties> {
        self.nodes.get_mut(&node)
    }

    /// 按节点下标升序遍历
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeProperties)> {
        self.nodes.iter().map(|(id, p)| (*id, p))
    }
}
