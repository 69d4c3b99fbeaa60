//! Flight Analytics CLI
//!
//! `parse` joins and archives the run left in the data directory;
//! `collate` gathers every archived run into one dataset.

use anyhow::Result;
use clap::{Parser, Subcommand};
use flight_analytics::{Collation, RingMode, RingRadii, TrialRun, archive_trial};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flight-analyze")]
#[command(about = "Post-process exported flight trajectories")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join the latest run's trajectories and archive it under your name
    Parse {
        /// Name the trial is archived under
        #[arg(short, long)]
        name: String,

        /// Directory the simulator exported to
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Root of the archived trials
        #[arg(long, default_value = "./final_results/trials")]
        out_dir: PathBuf,
    },

    /// Collate every archived trial and extract the ring
    Collate {
        /// Root of the archived trials
        #[arg(long, default_value = "./final_results/trials")]
        trials_dir: PathBuf,

        /// Directory collated files are written to
        #[arg(long, default_value = "./final_results/collated")]
        out_dir: PathBuf,

        /// Inner ring radius
        #[arg(long, default_value_t = 120.0)]
        inner: f64,

        /// Outer ring radius
        #[arg(long, default_value_t = 200.0)]
        outer: f64,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .init();

    match Args::parse().command {
        Command::Parse {
            name,
            data_dir,
            out_dir,
        } => {
            let trial = TrialRun::load(&data_dir)?;
            trial.write_joint(&data_dir)?;
            let dir = archive_trial(&data_dir, &out_dir, &name)?;
            info!(samples = trial.first().len(), dir = %dir.display(), "Trial parsed");
        }
        Command::Collate {
            trials_dir,
            out_dir,
            inner,
            outer,
        } => {
            let radii = RingRadii::new(inner, outer)?;
            let collation = Collation::load(&trials_dir)?;
            collation.write(&out_dir, "all")?;
            collation
                .ring(radii, RingMode::Absolute)
                .write(&out_dir, "ring")?;

            let relative = collation.with_relative();
            relative.write(&out_dir, "rel-all")?;
            relative
                .ring(radii, RingMode::Relative)
                .write(&out_dir, "rel-ring")?;
            info!(samples = relative.len(), "Collation complete");
        }
    }
    Ok(())
}
