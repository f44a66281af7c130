use anyhow::Result;
use civitas_core::metrics::init_logging;
use civitas_core::telemetry::ExperimentConfig;
use civitas_core::DecisionSource;
use civitas_lib::{App, RunOptions, ShutdownManager};
use civitas_oracle::{GeminiOracle, ScriptedOracle};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulation headless for a number of days
    Run {
        /// Days to simulate
        #[arg(short, long, default_value_t = 30)]
        days: u64,

        /// Seed for every stochastic decision (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Custom config file path
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Record an experiment run under this name
        #[arg(short, long)]
        experiment: Option<String>,

        /// Experiment definition file (.json or .toml)
        #[arg(long)]
        experiment_file: Option<PathBuf>,

        /// Write the finished run as JSON
        #[arg(long)]
        export_json: Option<PathBuf>,

        /// Write the finished run's snapshots as CSV
        #[arg(long)]
        export_csv: Option<PathBuf>,

        /// Write the final government state as JSON
        #[arg(long)]
        save_state: Option<PathBuf>,

        /// Where agent decisions come from
        #[arg(long, value_enum, default_value = "scripted")]
        oracle: OracleKind,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OracleKind {
    /// Canned offline decisions
    Scripted,
    /// Gemini API, key read from the configured environment variable
    Gemini,
    /// No decision source; agents observe but never act
    None,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    match args.command {
        Command::Run {
            days,
            seed,
            config,
            experiment,
            experiment_file,
            export_json,
            export_csv,
            save_state,
            oracle,
        } => {
            let mut app_config = civitas_io::load_config(&config)?;
            if seed.is_some() {
                app_config.simulation.seed = seed;
            }

            let experiment = match (experiment_file, experiment) {
                (Some(path), name) => {
                    let mut loaded = civitas_io::load_experiment(path)?;
                    if let Some(name) = name {
                        loaded.name = name;
                    }
                    Some(loaded)
                }
                (None, Some(name)) => Some(ExperimentConfig::named(name)),
                (None, None) => None,
            };
            anyhow::ensure!(
                experiment.is_some() || (export_json.is_none() && export_csv.is_none()),
                "Exports need an experiment; pass --experiment or --experiment-file"
            );

            let source: Option<Arc<dyn DecisionSource>> = match oracle {
                OracleKind::Scripted => Some(Arc::new(ScriptedOracle::default())),
                OracleKind::Gemini => Some(Arc::new(GeminiOracle::from_config(&app_config.oracle)?)),
                OracleKind::None => None,
            };

            let mut app = App::new(
                app_config,
                source,
                RunOptions {
                    days,
                    experiment,
                    export_json,
                    export_csv,
                    save_state,
                },
            )?;
            tracing::info!(seed = app.engine.seed(), days, "Starting simulation");

            let shutdown = ShutdownManager::new();
            shutdown.listen_for_ctrl_c();
            let outcome = app.run(&shutdown).await?;

            if let Some(run) = &outcome.run {
                let s = &run.summary;
                println!("Run {} ({} snapshots)", run.run_id, run.snapshots.len());
                println!("  days:              {}", s.total_days);
                println!("  agents created:    {}", s.total_agents_created);
                println!("  goals completed:   {}", s.total_goals_completed);
                println!("  meetings held:     {}", s.total_meetings_held);
                println!("  laws enacted:      {}", s.total_laws_enacted);
                println!("  public approval:   {:.3}", s.final_public_approval);
                println!("  avg effectiveness: {:.3}", s.avg_effectiveness);
                println!("  emergent patterns: {}", s.emergent_patterns.len());
            }
            if outcome.interrupted {
                println!("Stopped early after {} days.", outcome.days_run);
            }
        }
    }

    Ok(())
}
