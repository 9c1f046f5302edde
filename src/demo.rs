//! 示例网络
//!
//! 几个可以直接运行的场景，供命令行工具和测试使用。

use std::sync::Arc;

use crate::dist::{DistributionSelector, DurationDistribution, Interval};
use crate::error::SimError;
use crate::model::{Cohort, Network, NodeProperties, Scenario, WeightedArc};
use crate::routing::{ChainRouting, QueueFullBehavior, RandomRouting};

/// 单节点：每 10 个时间单位到达一人（`[0, 1000]`），服务 30（`[0, 2000]`）
pub fn single_node(servers: usize) -> Result<Scenario, SimError> {
    let mut network = Network::default();
    let node = network.add_node("Node01", servers, None)?;

    let mut scenario = Scenario::new(network);
    scenario.add_cohort(
        Cohort::new("Cohort01", Arc::new(RandomRouting::exit_only())).with_node(
            node,
            NodeProperties::new(
                DistributionSelector::constant(0, 1000, 10, Some(1.0))?,
                DistributionSelector::constant(0, 2000, 30, None)?,
            ),
        ),
    );
    Ok(scenario)
}

/// 活动入口：检票口、行李检查、金属探测门。
///
/// 三类人群：无票者在检票口被劝返后离开；持票带包者依次经过三个节点；
/// 持票不带包者跳过行李检查。到达间隔随时间段变化。
pub fn event_entrance() -> Result<Scenario, SimError> {
    let mut network = Network::default();
    let gate = network.add_node("Ticket Gate", 3, None)?;
    let bags = network.add_node("Bag Inspection", 4, None)?;
    let detector = network.add_node("Person Metal Detector", 2, None)?;

    // 三个时间段 [0,1000] [1000,2000] [2000,3000] 的常数到达间隔
    let staged = |durations: [u64; 3]| -> Result<DistributionSelector, SimError> {
        let entries = durations
            .iter()
            .enumerate()
            .map(|(i, d)| -> Result<_, SimError> {
                let start = i as u64 * 1000;
                Ok((
                    Interval::new(start, start + 1000)?,
                    DurationDistribution::constant(*d),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        DistributionSelector::new(entries, None)
    };
    let service = |d: u64| DistributionSelector::constant(0, 5000, d, None);

    let mut scenario = Scenario::new(network);
    scenario.add_cohort(
        Cohort::new("Without Ticket", Arc::new(RandomRouting::exit_only())).with_node(
            gate,
            NodeProperties::new(staged([30, 15, 45])?, service(12)?),
        ),
    );

    let with_bag = RandomRouting::new([
        WeightedArc::new(gate, bags),
        WeightedArc::new(bags, detector),
    ])?
    .with_default_queue_full(QueueFullBehavior::WaitAndBlockCurrentServer);
    scenario.add_cohort(
        Cohort::new("With Ticket and Bag", Arc::new(with_bag))
            .with_node(gate, NodeProperties::new(staged([20, 10, 30])?, service(12)?))
            .with_node(bags, NodeProperties::new(DistributionSelector::none(), service(30)?))
            .with_node(
                detector,
                NodeProperties::new(DistributionSelector::none(), service(15)?),
            ),
    );

    let without_bag = RandomRouting::new([WeightedArc::new(gate, detector)])?
        .with_default_queue_full(QueueFullBehavior::WaitAndBlockCurrentServer);
    scenario.add_cohort(
        Cohort::new("With Ticket without Bag", Arc::new(without_bag))
            .with_node(gate, NodeProperties::new(staged([20, 10, 30])?, service(12)?))
            .with_node(
                detector,
                NodeProperties::new(DistributionSelector::none(), service(10)?),
            ),
    );
    Ok(scenario)
}

/// 食堂：冷餐台之后 30% 去热餐台、70% 直接结账；热餐台之后结账。
/// 到达与服务均为指数分布，分布覆盖 `[0, 2 * run_time]`。
pub fn cafeteria(run_time: u64) -> Result<Scenario, SimError> {
    let mut network = Network::default();
    let cold = network.add_node("Cold Food", 1, None)?;
    let hot = network.add_node("Hot Food", 2, None)?;
    let till = network.add_node("Till", 2, None)?;

    let routing = RandomRouting::new([
        WeightedArc::weighted(cold, hot, 0.3),
        WeightedArc::weighted(cold, till, 0.7),
        WeightedArc::new(hot, till),
    ])?;
    let end = run_time.saturating_mul(2);
    let exp = |rate: f64| DistributionSelector::exponential(0, end, rate, None);

    let mut scenario = Scenario::new(network);
    scenario.add_cohort(
        Cohort::new("Cohort01", Arc::new(routing))
            .with_node(cold, NodeProperties::new(exp(0.003)?, exp(0.01)?))
            .with_node(hot, NodeProperties::new(exp(0.002)?, exp(0.004)?))
            .with_node(till, NodeProperties::new(DistributionSelector::none(), exp(0.005)?)),
    );
    Ok(scenario)
}

/// 三个单服务台、队列容量 1 的节点串联。第一个节点满时新到者被拒绝，
/// 后两个节点满时上游服务台被阻塞。
pub fn restricted_chain(run_time: u64) -> Result<Scenario, SimError> {
    let mut network = Network::default();
    let nodes = [
        network.add_node("Node01", 1, Some(1))?,
        network.add_node("Node02", 1, Some(1))?,
        network.add_node("Node03", 1, Some(1))?,
    ];

    let routing = ChainRouting::new(&nodes)
        .with_queue_full(nodes[1], QueueFullBehavior::WaitAndBlockCurrentServer)
        .with_queue_full(nodes[2], QueueFullBehavior::WaitAndBlockCurrentServer);
    let end = run_time.saturating_mul(2);

    let mut scenario = Scenario::new(network);
    scenario.add_cohort(
        Cohort::new("Stools", Arc::new(routing))
            .with_node(
                nodes[0],
                NodeProperties::new(
                    DistributionSelector::constant(0, end, 330, Some(1.0))?,
                    DistributionSelector::constant(0, end, 350, None)?,
                ),
            )
            .with_node(
                nodes[1],
                NodeProperties::new(
                    DistributionSelector::none(),
                    DistributionSelector::constant(0, end, 400, None)?,
                ),
            )
            .with_node(
                nodes[2],
                NodeProperties::new(
                    DistributionSelector::none(),
                    DistributionSelector::constant(0, end, 450, None)?,
                ),
            ),
    );
    Ok(scenario)
}
