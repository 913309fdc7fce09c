use std::path::PathBuf;

use cca_sim_core::EmissionTemplate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cca_sim_cli::{
    commands::{Report, import, preset, run, templates},
    config::{DEFAULT_SCENARIO_PATH, ScenarioOverrides, load_scenario, resolve_scenario},
};

#[derive(Debug, Parser)]
#[command(name = "cca-sim", about = "Continuous clearing auction simulator", version)]
struct Cli {
    /// Log every advanced block and crossed tick
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a scenario file through the engine
    Run(RunArgs),

    /// Run a bundled scenario, or list them when no key is given
    Preset(PresetArgs),

    /// Rebuild a simulation from an exported JSON snapshot
    Import(ImportArgs),

    /// Show the emission schedule templates
    Templates,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Path to the scenario file
    #[arg(
        short,
        long,
        default_value = DEFAULT_SCENARIO_PATH,
        env = "CCA_SCENARIO",
        value_name = "FILE"
    )]
    scenario: PathBuf,

    /// Stop at this block instead of running to the end
    #[arg(long, value_name = "BLOCK")]
    to_block: Option<u64>,

    /// Override the graduation threshold from the file
    #[arg(long, value_name = "AMOUNT")]
    required_raise: Option<Decimal>,

    /// Replace the file's emission schedule with a template
    #[arg(long, value_name = "KEY", value_parser = templates::parse)]
    template: Option<EmissionTemplate>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct PresetArgs {
    /// Preset key, e.g. `hot_auction`
    key: Option<String>,

    /// Stop at this block instead of running to the end
    #[arg(long, value_name = "BLOCK")]
    to_block: Option<u64>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// Snapshot previously written with `--export`
    #[arg(value_name = "FILE")]
    snapshot: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Write a JSON snapshot of the final state
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Write the per-block price and raise series as JSON
    #[arg(long, value_name = "FILE")]
    series: Option<PathBuf>,

    /// Print the demand resting at each price level
    #[arg(long)]
    demand: bool,
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => {
            let file = load_scenario(&args.scenario)?;
            let overrides = ScenarioOverrides {
                required_raise: args.required_raise,
                template: args.template,
            };
            let scenario = resolve_scenario(&file, overrides)?;
            info!(
                path = %args.scenario.display(),
                bids = scenario.bids.len(),
                "scenario loaded"
            );
            let report = run::run(&scenario, args.to_block)?;
            emit(report, &args.output)?;
        }
        Commands::Preset(PresetArgs {
            key: None,
            ..
        }) => print!("{}", preset::PresetList),
        Commands::Preset(PresetArgs {
            key: Some(key),
            to_block,
            output,
        }) => {
            let report = run::run(&preset::scenario(&key)?, to_block)?;
            emit(report, &output)?;
        }
        Commands::Import(args) => {
            let report = import::import(&args.snapshot)?;
            emit(report, &args.output)?;
        }
        Commands::Templates => print!("{}", templates::TemplateList),
    }

    Ok(())
}

fn emit(report: Report, output: &OutputArgs) -> eyre::Result<()> {
    let report = report.with_demand(output.demand);
    print!("{report}");

    if let Some(path) = &output.export {
        report.export(path)?;
        info!(path = %path.display(), "snapshot written");
    }
    if let Some(path) = &output.series {
        report.export_series(path)?;
        info!(path = %path.display(), "series written");
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
