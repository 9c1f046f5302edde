//! JSON 场景配置
//!
//! `ScenarioSpec` 是场景的可序列化描述，节点以名称引用；`build()` 校验后
//! 生成内核使用的 `Scenario`。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dist::{DistributionSelector, DurationDistribution, Interval};
use crate::error::SimError;
use crate::model::{Cohort, Network, NodeId, NodeProperties, Scenario, WeightedArc};
use crate::routing::{ChainRouting, QueueFullBehavior, RandomRouting, Routing};
use crate::server::{FirstServer, RandomServer, ServerSelector};
use crate::sim::{SimTime, SimulationSettings};
use crate::stats::TimeWindow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub cohorts: Vec<CohortSpec>,
    #[serde(default)]
    pub settings: Option<SettingsSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(default = "default_servers")]
    pub servers: usize,
    /// 省略表示不限容量
    #[serde(default)]
    pub queue_capacity: Option<usize>,
}

/// 运行参数；命令行参数优先
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsSpec {
    #[serde(default)]
    pub max_time: Option<u64>,
    #[serde(default)]
    pub iterations: Option<u64>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub window_min: Option<u64>,
    #[serde(default)]
    pub window_max: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortSpec {
    pub id: String,
    pub routing: RoutingSpec,
    /// 节点名 -> 该人群在节点上的属性
    pub nodes: BTreeMap<String, NodePropertiesSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingSpec {
    Random {
        #[serde(default)]
        arcs: Vec<ArcSpec>,
        #[serde(default)]
        queue_full: QueueFullSpec,
    },
    Chain {
        path: Vec<String>,
        #[serde(default)]
        queue_full: QueueFullSpec,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcSpec {
    pub from: String,
    pub to: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// 目标队列已满时的行为：默认值加上按目标节点的覆盖
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueFullSpec {
    #[serde(default)]
    pub default: QueueFullBehavior,
    #[serde(default)]
    pub per_destination: BTreeMap<String, QueueFullBehavior>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodePropertiesSpec {
    /// 省略表示该人群不会从外部到达这个节点
    #[serde(default)]
    pub arrivals: Option<SelectorSpec>,
    pub service: SelectorSpec,
    #[serde(default)]
    pub server_selection: ServerSelectionSpec,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerSelectionSpec {
    #[default]
    First,
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorSpec {
    #[serde(default)]
    pub initial_fraction: Option<f64>,
    pub intervals: Vec<IntervalSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalSpec {
    pub start: u64,
    pub end: u64,
    pub distribution: DistributionSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionSpec {
    Constant {
        duration: u64,
    },
    Uniform {
        min: u64,
        max: u64,
    },
    Exponential {
        rate: f64,
    },
    Normal {
        mean: f64,
        std_dev: f64,
        #[serde(default)]
        min: Option<u64>,
        #[serde(default)]
        max: Option<u64>,
    },
    Empirical {
        values: Vec<u64>,
        #[serde(default)]
        randomize: bool,
    },
}

fn default_servers() -> usize {
    1
}

fn default_weight() -> f64 {
    1.0
}

impl ScenarioSpec {
    pub fn from_json(s: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            max_time: self
                .settings
                .as_ref()
                .and_then(|s| s.max_time)
                .map(SimTime),
        }
    }

    pub fn window(&self) -> TimeWindow {
        match &self.settings {
            Some(s) => TimeWindow::new(s.window_min, s.window_max),
            None => TimeWindow::default(),
        }
    }

    /// 校验并构建场景：节点名唯一，所有引用的节点都已定义，
    /// 路由能到达的节点都配置了属性。
    pub fn build(&self) -> Result<Scenario, SimError> {
        let mut network = Network::default();
        for n in &self.nodes {
            network.add_node(n.id.clone(), n.servers, n.queue_capacity)?;
        }

        let mut scenario = Scenario::new(network);
        for c in &self.cohorts {
            let cohort = c.build(&scenario.network)?;
            debug!(cohort = %c.id, nodes = c.nodes.len(), "人群已构建");
            scenario.add_cohort(cohort);
        }
        Ok(scenario)
    }
}

impl CohortSpec {
    fn build(&self, network: &Network) -> Result<Cohort, SimError> {
        let (routing, reachable) = self.routing.build(network)?;
        for node in reachable {
            let name = network.name(node);
            if !self.nodes.contains_key(name) {
                return Err(SimError::MissingNodeProperties {
                    cohort: self.id.clone(),
                    node: name.to_string(),
                });
            }
        }

        let mut cohort = Cohort::new(self.id.clone(), routing);
        for (name, props) in &self.nodes {
            let node = network.require(name)?;
            cohort = cohort.with_node(node, props.build()?);
        }
        Ok(cohort)
    }
}

impl RoutingSpec {
    /// 返回路由策略以及它可能送往的目标节点
    fn build(&self, network: &Network) -> Result<(Arc<dyn Routing>, Vec<NodeId>), SimError> {
        match self {
            RoutingSpec::Random { arcs, queue_full } => {
                let arcs = arcs
                    .iter()
                    .map(|a| {
                        let origin = network.require(&a.from)?;
                        let destination = network.require(&a.to)?;
                        if !a.weight.is_finite() || a.weight < 0.0 {
                            return Err(SimError::InvalidWeight {
                                origin: a.from.clone(),
                                destination: a.to.clone(),
                                weight: a.weight,
                            });
                        }
                        Ok(WeightedArc::weighted(origin, destination, a.weight))
                    })
                    .collect::<Result<Vec<_>, SimError>>()?;
                let reachable = arcs.iter().map(|a| a.destination).collect();
                let mut routing =
                    RandomRouting::new(arcs)?.with_default_queue_full(queue_full.default);
                for (dest, behavior) in &queue_full.per_destination {
                    routing = routing.with_queue_full(network.require(dest)?, *behavior);
                }
                let routing: Arc<dyn Routing> = Arc::new(routing);
                Ok((routing, reachable))
            }
            RoutingSpec::Chain { path, queue_full } => {
                let path = path
                    .iter()
                    .map(|name| network.require(name))
                    .collect::<Result<Vec<_>, SimError>>()?;
                let mut routing =
                    ChainRouting::new(&path).with_default_queue_full(queue_full.default);
                for (dest, behavior) in &queue_full.per_destination {
                    routing = routing.with_queue_full(network.require(dest)?, *behavior);
                }
                let reachable = path.iter().skip(1).copied().collect();
                let routing: Arc<dyn Routing> = Arc::new(routing);
                Ok((routing, reachable))
            }
        }
    }
}

impl NodePropertiesSpec {
    fn build(&self) -> Result<NodeProperties, SimError> {
        let arrivals = match &self.arrivals {
            Some(spec) => spec.build()?,
            None => DistributionSelector::none(),
        };
        let selector: Arc<dyn ServerSelector> = match self.server_selection {
            ServerSelectionSpec::First => Arc::new(FirstServer),
            ServerSelectionSpec::Random => Arc::new(RandomServer),
        };
        Ok(NodeProperties::new(arrivals, self.service.build()?).with_server_selector(selector))
    }
}

impl SelectorSpec {
    fn build(&self) -> Result<DistributionSelector, SimError> {
        let entries = self
            .intervals
            .iter()
            .map(|i| -> Result<_, SimError> {
                Ok((Interval::new(i.start, i.end)?, i.distribution.build()?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        DistributionSelector::new(entries, self.initial_fraction)
    }
}

impl DistributionSpec {
    fn build(&self) -> Result<DurationDistribution, SimError> {
        match self {
            DistributionSpec::Constant { duration } => Ok(DurationDistribution::constant(*duration)),
            DistributionSpec::Uniform { min, max } => DurationDistribution::uniform(*min, *max),
            DistributionSpec::Exponential { rate } => DurationDistribution::exponential(*rate),
            DistributionSpec::Normal {
                mean,
                std_dev,
                min,
                max,
            } => DurationDistribution::normal(*mean, *std_dev, *min, *max),
            DistributionSpec::Empirical { values, randomize } => {
                DurationDistribution::empirical(values.clone(), *randomize)
            }
        }
    }
}
