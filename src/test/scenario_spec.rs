use crate::SimError;
use crate::model::NodeId;
use crate::scenario::ScenarioSpec;
use crate::sim::{CancellationToken, SimTime, Simulation};
use crate::stats::{SimulationReport, TimeWindow};

const RESTRICTED_CHAIN: &str = r#"
{
    "nodes": [
        { "id": "Node01", "queue_capacity": 1 },
        { "id": "Node02", "queue_capacity": 1 },
        { "id": "Node03", "queue_capacity": 1 }
    ],
    "cohorts": [
        {
            "id": "Stools",
            "routing": {
                "kind": "chain",
                "path": ["Node01", "Node02", "Node03"],
                "queue_full": { "default": "wait_and_block_current_server" }
            },
            "nodes": {
                "Node01": {
                    "arrivals": {
                        "initial_fraction": 1.0,
                        "intervals": [ { "start": 0, "end": 80000, "distribution": { "kind": "constant", "duration": 330 } } ]
                    },
                    "service": { "intervals": [ { "start": 0, "end": 80000, "distribution": { "kind": "constant", "duration": 350 } } ] }
                },
                "Node02": {
                    "service": { "intervals": [ { "start": 0, "end": 80000, "distribution": { "kind": "constant", "duration": 400 } } ] }
                },
                "Node03": {
                    "service": { "intervals": [ { "start": 0, "end": 80000, "distribution": { "kind": "constant", "duration": 450 } } ] }
                }
            }
        }
    ],
    "settings": { "max_time": 40000 }
}
"#;

#[test]
fn json_scenario_runs_like_the_builder() {
    let spec = ScenarioSpec::from_json(RESTRICTED_CHAIN).unwrap();
    assert_eq!(spec.nodes[0].servers, 1);
    let settings = spec.simulation_settings();
    assert_eq!(settings.max_time, Some(SimTime(40_000)));

    let scenario = spec.build().unwrap();
    assert_eq!(scenario.network.len(), 3);
    assert_eq!(scenario.cohorts[0].name(), "Stools");

    let records = Simulation::new(&scenario, settings, 0)
        .start(&CancellationToken::new())
        .unwrap();
    let report = SimulationReport::from_records(&records, spec.window());
    assert_eq!(report.nodes[&NodeId(0)].served(), 90);
    assert_eq!(report.nodes[&NodeId(0)].rejected(), 29);
    assert_eq!(report.nodes[&NodeId(2)].served(), 86);
}

#[test]
fn all_distribution_kinds_parse() {
    let json = r#"
    {
        "nodes": [ { "id": "A", "servers": 3 } ],
        "cohorts": [ {
            "id": "c",
            "routing": { "kind": "random" },
            "nodes": { "A": {
                "arrivals": { "intervals": [
                    { "start": 0, "end": 100, "distribution": { "kind": "uniform", "min": 1, "max": 5 } },
                    { "start": 100, "end": 200, "distribution": { "kind": "exponential", "rate": 0.5 } },
                    { "start": 200, "end": 300, "distribution": { "kind": "normal", "mean": 4.0, "std_dev": 1.0, "min": 1 } },
                    { "start": 300, "end": 400, "distribution": { "kind": "empirical", "values": [2, 3, 4] } }
                ] },
                "service": { "intervals": [ { "start": 0, "end": 1000, "distribution": { "kind": "constant", "duration": 2 } } ] },
                "server_selection": "random"
            } }
        } ],
        "settings": { "window_min": 50, "window_max": 350 }
    }
    "#;
    let spec = ScenarioSpec::from_json(json).unwrap();
    assert_eq!(spec.window(), TimeWindow::new(Some(50), Some(350)));
    let scenario = spec.build().unwrap();
    let records = Simulation::new(&scenario, spec.simulation_settings(), 5)
        .start(&CancellationToken::new())
        .unwrap();
    assert!(!records.is_empty());
    crate::validate(&records).unwrap();
}

fn build_err(json: &str) -> SimError {
    ScenarioSpec::from_json(json).unwrap().build().unwrap_err()
}

#[test]
fn unknown_and_duplicate_nodes_are_rejected() {
    let err = build_err(r#"{ "nodes": [ { "id": "A" }, { "id": "A" } ] }"#);
    assert!(matches!(err, SimError::DuplicateNode(name) if name == "A"));

    let err = build_err(
        r#"{ "nodes": [ { "id": "A" } ], "cohorts": [ { "id": "c",
            "routing": { "kind": "chain", "path": ["A", "B"] }, "nodes": {} } ] }"#,
    );
    assert!(matches!(err, SimError::UnknownNode(name) if name == "B"));
}

#[test]
fn reachable_node_without_properties_is_rejected() {
    let err = build_err(
        r#"{ "nodes": [ { "id": "A" }, { "id": "B" } ], "cohorts": [ { "id": "c",
            "routing": { "kind": "random", "arcs": [ { "from": "A", "to": "B" } ] },
            "nodes": { "A": { "service": { "intervals": [] } } } } ] }"#,
    );
    assert!(matches!(
        err,
        SimError::MissingNodeProperties { cohort, node } if cohort == "c" && node == "B"
    ));
}

#[test]
fn invalid_values_are_configuration_errors() {
    let with_service = |distribution: &str| {
        format!(
            r#"{{ "nodes": [ {{ "id": "A" }} ], "cohorts": [ {{ "id": "c",
                "routing": {{ "kind": "random" }},
                "nodes": {{ "A": {{ "service": {{ "intervals": [
                    {{ "start": 0, "end": 10, "distribution": {distribution} }} ] }} }} }} }} ] }}"#
        )
    };
    assert!(matches!(
        build_err(&with_service(r#"{ "kind": "uniform", "min": 5, "max": 5 }"#)),
        SimError::InvalidDistribution(_)
    ));
    assert!(matches!(
        build_err(&with_service(r#"{ "kind": "empirical", "values": [] }"#)),
        SimError::InvalidDistribution(_)
    ));

    let err = build_err(
        r#"{ "nodes": [ { "id": "A" }, { "id": "B" } ], "cohorts": [ { "id": "c",
            "routing": { "kind": "random", "arcs": [ { "from": "A", "to": "B", "weight": -1 } ] },
            "nodes": {} } ] }"#,
    );
    assert!(matches!(err, SimError::InvalidWeight { .. }));

    assert!(matches!(
        ScenarioSpec::from_json("{ not json"),
        Err(SimError::Json(_))
    ));
}
