use clap::{Parser, ValueEnum};
use qnsim_rs::demo;
use qnsim_rs::model::{Network, Scenario};
use qnsim_rs::report::{queue_length_tsv, records_tsv};
use qnsim_rs::scenario::ScenarioSpec;
use qnsim_rs::sim::{CancellationToken, SimTime, Simulation, SimulationSettings, run_replications};
use qnsim_rs::stats::{SimulationReport, TimeWindow, merge_reports};
use qnsim_rs::validate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DemoName {
    SingleNode,
    EventEntrance,
    Cafeteria,
    RestrictedChain,
}

#[derive(Debug, Parser)]
#[command(name = "qnsim", about = "Run a queueing network simulation")]
struct Args {
    /// Path to scenario JSON
    #[arg(long, conflicts_with = "demo", required_unless_present = "demo")]
    scenario: Option<PathBuf>,

    /// Run a built-in example network instead of a scenario file
    #[arg(long, value_enum)]
    demo: Option<DemoName>,

    /// Seed of the random number generator (single run)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of independent runs; seeds 0..n are used when greater than 1
    #[arg(long)]
    iterations: Option<u64>,

    /// Stop processing events after this time
    #[arg(long)]
    max_time: Option<u64>,

    /// Only count visits arriving at or after this time in the report
    #[arg(long)]
    window_min: Option<u64>,

    /// Only count visits arriving at or before this time in the report
    #[arg(long)]
    window_max: Option<u64>,

    /// Write the visit records as TSV (single run only)
    #[arg(long)]
    records_tsv: Option<PathBuf>,

    /// Write queue length over time as TSV (single run only)
    #[arg(long)]
    queue_tsv: Option<PathBuf>,

    /// Write the per-node report as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Check the record stream for consistency (single run only)
    #[arg(long)]
    validate: bool,
}

/// 解析后的运行参数：命令行优先于场景文件，场景文件优先于示例默认值
struct RunPlan {
    scenario: Scenario,
    settings: SimulationSettings,
    window: TimeWindow,
    seed: u64,
    iterations: u64,
}

fn plan(args: &Args) -> Result<RunPlan, Box<dyn Error>> {
    let (scenario, file_settings, default_max_time) = match (&args.scenario, args.demo) {
        (Some(path), _) => {
            let spec = ScenarioSpec::load(path)?;
            let scenario = spec.build()?;
            info!(path = %path.display(), nodes = scenario.network.len(), cohorts = scenario.cohorts.len(), "场景已加载");
            (scenario, spec.settings.unwrap_or_default(), None)
        }
        (None, Some(name)) => {
            let (scenario, max_time) = match name {
                DemoName::SingleNode => (demo::single_node(2)?, None),
                DemoName::EventEntrance => (demo::event_entrance()?, None),
                DemoName::Cafeteria => (demo::cafeteria(20_000)?, Some(20_000)),
                DemoName::RestrictedChain => (demo::restricted_chain(40_000)?, Some(40_000)),
            };
            (scenario, Default::default(), max_time)
        }
        (None, None) => return Err("either --scenario or --demo is required".into()),
    };

    let max_time = args
        .max_time
        .or(file_settings.max_time)
        .or(default_max_time);
    Ok(RunPlan {
        scenario,
        settings: SimulationSettings {
            max_time: max_time.map(SimTime),
        },
        window: TimeWindow::new(
            args.window_min.or(file_settings.window_min),
            args.window_max.or(file_settings.window_max),
        ),
        seed: args.seed.or(file_settings.seed).unwrap_or(0),
        iterations: args.iterations.or(file_settings.iterations).unwrap_or(1),
    })
}

/// 按节点名输出 JSON
fn by_name<T: Serialize + Copy>(
    network: &Network,
    nodes: &BTreeMap<qnsim_rs::model::NodeId, T>,
) -> BTreeMap<String, T> {
    nodes
        .iter()
        .map(|(id, v)| (network.name(*id).to_string(), *v))
        .collect()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let plan = plan(&args)?;
    let cancel = CancellationToken::new();

    if plan.iterations == 0 {
        return Err("--iterations must be at least 1".into());
    }
    if plan.iterations > 1 {
        if args.records_tsv.is_some() || args.queue_tsv.is_some() || args.validate {
            return Err("record output and validation require a single run".into());
        }
        let reports = run_replications(
            &plan.scenario,
            plan.iterations,
            plan.settings,
            plan.window,
            &cancel,
        )?;
        let merged = merge_reports(&reports);
        println!("runs={}", reports.len());
        for (node, agg) in &merged {
            println!(
                "node={} mean_served={:.3} mean_waiting={:.3} mean_service={:.3} mean_rejected_at_arrival={:.3}",
                plan.scenario.network.name(*node),
                agg.mean_served(),
                agg.waiting.mean.mean,
                agg.service.mean.mean,
                agg.rejected_at_arrival.mean,
            );
        }
        if let Some(path) = &args.report_json {
            write_json(path, &by_name(&plan.scenario.network, &merged))?;
        }
        return Ok(());
    }

    let mut sim = Simulation::new(&plan.scenario, plan.settings, plan.seed);
    let records = sim.start(&cancel)?;
    let network = &plan.scenario.network;

    if args.validate {
        validate(&records)?;
        println!("validation=ok");
    }
    if let Some(path) = &args.records_tsv {
        fs::write(path, records_tsv(network, &records))?;
    }
    if let Some(path) = &args.queue_tsv {
        fs::write(path, queue_length_tsv(network, &records))?;
    }

    let report = SimulationReport::from_records(&records, plan.window);
    println!(
        "done @ {}, records={}, served={}, rejected_at_arrival={}, rejected_at_service_start={}",
        sim.now(),
        records.len(),
        report.served(),
        report.rejected_at_arrival(),
        report.rejected_at_service_start(),
    );
    for (node, r) in &report.nodes {
        println!(
            "node={} served={} mean_waiting={:.3} mean_service={:.3} block_sum={}",
            network.name(*node),
            r.served(),
            r.waiting.mean,
            r.service.mean,
            r.block.sum,
        );
    }
    if let Some(path) = &args.report_json {
        write_json(path, &by_name(network, &report.nodes))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
