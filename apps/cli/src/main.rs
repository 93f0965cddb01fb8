//! Tungsten CLI - drives the model development and promotion pipeline.

mod listener;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use tungsten_core::{
    CheckpointStore, DecisionMode, DecisionSource, FileDecisionSource, HttpModelPublisher,
    ModelPublisher, NullModelPublisher, PhaseController, PipelineConfig, PipelineLayout,
    RunOutcome, SimulatedDecisionSource,
};
use tungsten_training::PerceptronTrainer;

/// Tungsten - durable model development and promotion pipeline
#[derive(Parser, Debug)]
#[command(name = "tungsten", author, version, about)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Pipeline state directory
    #[arg(short, long, default_value = ".tungsten", global = true)]
    pipeline_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline from its checkpointed phase
    Run {
        /// Path to the pipeline configuration file
        #[arg(short, long, default_value = "tungsten.json")]
        config: PathBuf,

        /// Stop after one development run instead of looping
        #[arg(long)]
        once: bool,
    },
    /// Print the current workflow checkpoint
    Status,
    /// Discard all progress and return to the Starting phase
    Reset,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level: Level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let layout = PipelineLayout::new(&args.pipeline_dir);
    match args.command {
        Command::Run { config, once } => run(layout, &config, once),
        Command::Status => status(&layout),
        Command::Reset => reset(&layout),
    }
}

fn run(layout: PipelineLayout, config_path: &std::path::Path, once: bool) -> anyhow::Result<()> {
    let config = PipelineConfig::load(config_path)?;

    let decisions: Box<dyn DecisionSource> = match config.decisions.mode {
        DecisionMode::File => Box::new(FileDecisionSource::new(layout.decision_file_path())),
        DecisionMode::Simulated => Box::new(SimulatedDecisionSource::new(config.decisions.seed)),
    };
    let publisher: Box<dyn ModelPublisher> = match &config.promotion.url {
        Some(url) => Box::new(HttpModelPublisher::new(url.clone())?),
        None => Box::new(NullModelPublisher),
    };

    let mut controller = PhaseController::new(
        layout,
        config,
        Box::new(PerceptronTrainer::new()),
        decisions,
        publisher,
    )?;

    let _listener = listener::spawn(controller.mailbox(), controller.layout().inbox_path());

    loop {
        match controller.run()? {
            RunOutcome::AwaitingInput => {
                info!("paused for user input, edit the decision file and run again");
                return Ok(());
            }
            outcome => {
                info!(?outcome, "development run finished");
                if once {
                    return Ok(());
                }
            }
        }
    }
}

fn status(layout: &PipelineLayout) -> anyhow::Result<()> {
    let store = CheckpointStore::load(layout.status_path())?;
    println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
    Ok(())
}

fn reset(layout: &PipelineLayout) -> anyhow::Result<()> {
    let store = CheckpointStore::load(layout.status_path())?;
    store.reset()?;
    info!("pipeline reset to Starting");
    Ok(())
}
