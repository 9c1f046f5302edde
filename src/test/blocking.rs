use std::collections::HashMap;
use std::sync::Arc;

use crate::demo;
use crate::dist::DistributionSelector;
use crate::model::{Cohort, Network, NodeId, NodeProperties, Scenario, WeightedArc};
use crate::routing::{ChainRouting, QueueFullBehavior, RandomRouting};
use crate::sim::{
    CancellationToken, RejectionReason, SimTime, Simulation, SimulationSettings, VisitOutcome,
    VisitRecord,
};
use crate::stats::{SimulationReport, TimeWindow};
use crate::validate;

fn run_restricted_chain() -> Vec<VisitRecord> {
    let scenario = demo::restricted_chain(40_000).unwrap();
    Simulation::new(&scenario, SimulationSettings::with_max_time(40_000), 1)
        .start(&CancellationToken::new())
        .unwrap()
}

#[test]
fn restricted_chain_matches_reference_numbers() {
    let records = run_restricted_chain();
    validate(&records).unwrap();
    let report = SimulationReport::from_records(&records, TimeWindow::default());

    let n0 = &report.nodes[&NodeId(0)];
    assert_eq!(n0.rejected(), 29);
    assert_eq!(n0.served(), 90);
    assert_eq!(n0.service.sum, 31_500.0);
    assert_eq!(n0.block.sum, 7_950.0);

    let n1 = &report.nodes[&NodeId(1)];
    assert_eq!(n1.served(), 88);
    assert_eq!(n1.block.sum, 3_900.0);

    let n2 = &report.nodes[&NodeId(2)];
    assert_eq!(n2.served(), 86);
    assert_eq!(n2.block.sum, 0.0);
    assert_eq!(n2.block.count, 0.0);

    let arrival_sum = |node: usize| -> u64 {
        records
            .iter()
            .filter(|r| r.node == NodeId(node))
            .map(|r| r.arrival.0)
            .sum()
    };
    assert_eq!(arrival_sum(0), 2_356_200);
    assert_eq!(arrival_sum(1), 1_703_940);
    assert_eq!(arrival_sum(2), 1_701_180);
}

#[test]
fn blocked_individuals_are_conserved_along_the_chain() {
    let records = run_restricted_chain();
    let mut paths: HashMap<u64, Vec<&VisitRecord>> = HashMap::new();
    for r in &records {
        paths.entry(r.individual.id).or_default().push(r);
    }
    for (id, path) in paths {
        // 每一段都从上一段离开的节点与时间接续
        for w in path.windows(2) {
            let prev = w[0].served().expect("only the last visit may be a rejection");
            if let Some(d) = prev.destination {
                assert_eq!(d, w[1].node, "individual {id}");
            }
            assert_eq!(prev.exit, w[1].arrival, "individual {id}");
        }
        // 被阻塞后离开的记录不带目标节点
        for r in &path {
            if let Some(s) = r.served() {
                if s.exit > s.service_end {
                    assert_ne!(r.node, NodeId(2));
                    assert_eq!(s.destination, None);
                }
            }
        }
    }
}

#[test]
fn reject_individual_exits_origin_without_destination() {
    // A 服务很快，B 只有一个服务台、容量 1 且服务很慢：B 很快被占满
    let mut network = Network::default();
    let a = network.add_node("A", 1, None).unwrap();
    let b = network.add_node("B", 1, Some(1)).unwrap();
    let mut scenario = Scenario::new(network);
    scenario.add_cohort(
        Cohort::new("C", Arc::new(ChainRouting::new(&[a, b])))
            .with_node(
                a,
                NodeProperties::new(
                    DistributionSelector::constant(0, 200, 10, Some(1.0)).unwrap(),
                    DistributionSelector::constant(0, 1000, 5, None).unwrap(),
                ),
            )
            .with_node(
                b,
                NodeProperties::new(
                    DistributionSelector::none(),
                    DistributionSelector::constant(0, 1000, 100, None).unwrap(),
                ),
            ),
    );
    let records = Simulation::new(&scenario, SimulationSettings::default(), 0)
        .start(&CancellationToken::new())
        .unwrap();
    validate(&records).unwrap();

    let rejected: Vec<_> = records
        .iter()
        .filter(|r| r.node == b && matches!(r.outcome, VisitOutcome::RejectedAtArrival))
        .collect();
    assert!(!rejected.is_empty());
    for r in rejected {
        let origin = records
            .iter()
            .find(|o| o.individual == r.individual && o.node == a)
            .and_then(|o| o.served())
            .unwrap();
        assert_eq!(origin.destination, None);
        assert_eq!(origin.exit, r.arrival);
        // 未被阻塞
        assert_eq!(origin.exit, origin.service_end);
    }
}

#[test]
fn wait_and_block_holds_origin_server() {
    let mut network = Network::default();
    let a = network.add_node("A", 1, None).unwrap();
    let b = network.add_node("B", 1, Some(1)).unwrap();
    let mut scenario = Scenario::new(network);
    scenario.add_cohort(
        Cohort::new(
            "C",
            Arc::new(
                ChainRouting::new(&[a, b])
                    .with_default_queue_full(QueueFullBehavior::WaitAndBlockCurrentServer),
            ),
        )
        .with_node(
            a,
            NodeProperties::new(
                DistributionSelector::constant(0, 200, 10, Some(1.0)).unwrap(),
                DistributionSelector::constant(0, 10_000, 5, None).unwrap(),
            ),
        )
        .with_node(
            b,
            NodeProperties::new(
                DistributionSelector::none(),
                DistributionSelector::constant(0, 10_000, 100, None).unwrap(),
            ),
        ),
    );
    let records = Simulation::new(&scenario, SimulationSettings::default(), 0)
        .start(&CancellationToken::new())
        .unwrap();
    validate(&records).unwrap();

    // 无人在 B 被拒绝，A 上出现阻塞
    assert!(records.iter().all(|r| !r.is_rejection() || r.node == a));
    let blocked = records
        .iter()
        .filter(|r| r.node == a)
        .filter_map(|r| r.block_duration())
        .filter(|d| *d > 0)
        .count();
    assert!(blocked > 0);
    // 所有到达 A 的个体最终都在 B 完成服务
    let at_a = records.iter().filter(|r| r.node == a).count();
    let served_b = records
        .iter()
        .filter(|r| r.node == b && r.served().is_some())
        .count();
    let rejected_a = records.iter().filter(|r| r.node == a && r.is_rejection()).count();
    assert_eq!(served_b + rejected_a, at_a);
}

#[test]
fn every_blocked_individual_is_admitted_when_several_slots_free_up() {
    // A 有 3 个服务台，1..=6 时刻各到达一人；B 只有 1 个服务台、容量 2，
    // 服务只能在 [0, 60] 内完成。B 在 51 空出时，排队的 2、3 号因服务时长耗尽
    // 被拒绝，B 同时空出两个位置，阻塞在 A 上的 4、5、6 号都应被接纳。
    let mut network = Network::default();
    let a = network.add_node("A", 3, None).unwrap();
    let b = network.add_node("B", 1, Some(2)).unwrap();
    let mut scenario = Scenario::new(network);
    scenario.add_cohort(
        Cohort::new(
            "C",
            Arc::new(
                ChainRouting::new(&[a, b])
                    .with_default_queue_full(QueueFullBehavior::WaitAndBlockCurrentServer),
            ),
        )
        .with_node(
            a,
            NodeProperties::new(
                DistributionSelector::constant(0, 6, 1, Some(1.0)).unwrap(),
                DistributionSelector::constant(0, 1000, 10, None).unwrap(),
            ),
        )
        .with_node(
            b,
            NodeProperties::new(
                DistributionSelector::none(),
                DistributionSelector::constant(0, 60, 40, None).unwrap(),
            ),
        ),
    );
    let records = Simulation::new(&scenario, SimulationSettings::default(), 0)
        .start(&CancellationToken::new())
        .unwrap();
    validate(&records).unwrap();

    let at_a: Vec<_> = records.iter().filter(|r| r.node == a).collect();
    assert_eq!(at_a.len(), 6);
    let exits: Vec<(u64, u64)> = at_a
        .iter()
        .map(|r| (r.individual.id, r.served().unwrap().exit.0))
        .collect();
    assert_eq!(
        exits,
        vec![(1, 11), (2, 12), (3, 13), (4, 51), (5, 51), (6, 51)]
    );

    let at_b: Vec<_> = records.iter().filter(|r| r.node == b).collect();
    assert_eq!(at_b.len(), 6);
    assert_eq!(at_b.iter().filter(|r| r.served().is_some()).count(), 1);
    assert!(at_b.iter().filter(|r| r.is_rejection()).all(|r| matches!(
        r.outcome,
        VisitOutcome::RejectedAtServiceStart {
            reason: RejectionReason::CannotCompleteService,
            service_start: SimTime(51),
        }
    )));
}

#[test]
fn cyclic_blocking_terminates() {
    // A 与 B 互相路由且都等待阻塞，容量为 1，很快形成环形阻塞
    let mut network = Network::default();
    let a = network.add_node("A", 1, Some(1)).unwrap();
    let b = network.add_node("B", 1, Some(1)).unwrap();
    let c = network.add_node("C", 1, None).unwrap();
    let routing = RandomRouting::new([
        WeightedArc::new(a, b),
        WeightedArc::new(b, a),
        WeightedArc::new(b, c),
    ])
    .unwrap()
    .with_default_queue_full(QueueFullBehavior::WaitAndBlockCurrentServer);
    let entry = || {
        NodeProperties::new(
            DistributionSelector::constant(0, 2000, 5, None).unwrap(),
            DistributionSelector::constant(0, 100_000, 20, None).unwrap(),
        )
    };
    let mut scenario = Scenario::new(network);
    scenario.add_cohort(
        Cohort::new("C", Arc::new(routing))
            .with_node(a, entry())
            .with_node(b, entry())
            .with_node(
                c,
                NodeProperties::new(
                    DistributionSelector::none(),
                    DistributionSelector::constant(0, 100_000, 1, None).unwrap(),
                ),
            ),
    );

    for seed in 0..5 {
        let records = Simulation::new(&scenario, SimulationSettings::default(), seed)
            .start(&CancellationToken::new())
            .unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().any(|r| r.is_rejection()));
        validate(&records).unwrap();
    }
}
