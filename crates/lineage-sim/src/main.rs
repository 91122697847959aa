use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use lineage_sim::{run_simulator, SimulatorConfig};
use lineage_store::{InMemoryPlanStore, ProvenanceStore, StoreConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("lineage-sim")
        .version(lineage_sim::VERSION)
        .about("Randomized invariant simulator for the provenance store")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("simulate")
                .about("Insert random activities and verify store invariants")
                .arg(
                    Arg::new("activities")
                        .long("activities")
                        .default_value("1000")
                        .value_parser(value_parser!(usize))
                        .help("Number of insertions to attempt"),
                )
                .arg(
                    Arg::new("paths")
                        .long("paths")
                        .default_value("32")
                        .value_parser(value_parser!(usize))
                        .help("Size of the artifact path pool"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Store configuration file (TOML)"),
                )
                .arg(
                    Arg::new("stop-on-violation")
                        .long("stop-on-violation")
                        .action(ArgAction::SetTrue)
                        .help("Stop at the first invariant violation"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the report as JSON"),
                ),
        )
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    if let Some(("simulate", args)) = matches.subcommand() {
        let activities = args.get_one::<usize>("activities").copied().unwrap_or(1000);
        let paths = args.get_one::<usize>("paths").copied().unwrap_or(32);
        let seed = args.get_one::<u64>("seed").copied().unwrap_or(42);

        let store_config = match args.get_one::<PathBuf>("config") {
            Some(path) => StoreConfig::load(path)
                .with_context(|| format!("loading store config from {}", path.display()))?,
            None => StoreConfig::default(),
        };
        let store = ProvenanceStore::from_config(store_config, Arc::new(InMemoryPlanStore::new()))
            .context("opening provenance store")?;

        let config = SimulatorConfig::default()
            .with_seed(seed)
            .with_activities(activities)
            .with_paths(paths)
            .with_stop_on_first_violation(args.get_flag("stop-on-violation"));
        let report = run_simulator(config, &store);

        if args.get_flag("json") {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", report.generate_text());
        }

        std::process::exit(if report.passed() { 0 } else { 1 });
    }

    Ok(())
}
