//! 节点与网络
//!
//! `Network` 是节点的 arena：只保存静态定义（名称、服务台数量、队列容量）。
//! 每次仿真运行各自持有可变的节点状态，见 `sim::state`。

use std::collections::HashMap;

use super::id::NodeId;
use crate::error::SimError;

/// 服务站点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    name: String,
    servers: usize,
    queue_capacity: Option<usize>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 并行服务台数量
    pub fn servers(&self) -> usize {
        self.servers
    }

    /// 队列容量；`None` 表示不限
    pub fn queue_capacity(&self) -> Option<usize> {
        self.queue_capacity
    }
}

/// 网络拓扑中的全部节点
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeId>,
}

impl Network {
    /// 添加节点；名称必须唯一
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        servers: usize,
        queue_capacity: Option<usize>,
    ) -> Result<NodeId, SimError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SimError::DuplicateNode(name));
        }
        let id = NodeId(self.nodes.len());
        self.by_name.insert(name.clone(), id);
        self.nodes.push(Node {
            id,
            name,
            servers,
            queue_capacity,
        });
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.nodes[id.0].name()
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// 按名称查找节点，找不到视为配置错误
    pub fn require(&self, name: &str) -> Result<NodeId, SimError> {
        self.lookup(name)
            .ok_or_else(|| SimError::UnknownNode(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}
