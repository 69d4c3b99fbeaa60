//! Flight Simulator CLI
//!
//! Runs the leader/follower scenario headless, driving the leader from an
//! input script, and hands the final export to the JSON persistence
//! service.

use anyhow::{Context, Result};
use clap::Parser;
use flight_domain::SimulationConfig;
use flight_persistence::{DocumentStore, JsonFileStore, MemoryStore, PersistenceService};
use flight_simulator::{
    ChannelTransport, Exporter, InputScript, LaunchGenerator, LaunchLayout, LogFormat, RunConfig,
    ScenarioSpec, SimulationClock, Termination, TickOutcome, TraceRenderer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flight-simulator")]
#[command(about = "Simulate a manually flown leader and a mirroring follower")]
struct Args {
    /// Launch layout: default | rand
    #[arg(short, long)]
    launch: Option<LaunchLayout>,

    /// Seed for random launch points
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation configuration JSON (defaults are used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario JSON (leader/follower pair otherwise)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Input script JSON driving the manual aircraft
    #[arg(long)]
    script: Option<PathBuf>,

    /// Directory exported documents are written to
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Assert the stop key once this many ticks have run
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Run ticks back to back instead of at the configured frequency
    #[arg(long)]
    fast: bool,

    /// Keep exported documents in memory instead of writing them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut run = RunConfig::from_env()?;
    if let Some(launch) = args.launch {
        run.launch = launch;
    }
    if args.seed.is_some() {
        run.seed = args.seed;
    }
    if let Some(dir) = args.data_dir.clone() {
        run.data_dir = dir;
    }
    if let Some(max_ticks) = args.max_ticks {
        run.max_ticks = max_ticks;
    }

    init_tracing(&run)?;
    info!(version = flight_simulator::VERSION, "Starting flight simulator");

    if args.dry_run {
        simulate(&args, &run, MemoryStore::new()).await
    } else {
        info!(data_dir = %run.data_dir.display(), "Writing documents to disk");
        simulate(&args, &run, JsonFileStore::new(&run.data_dir)).await
    }
}

fn init_tracing(run: &RunConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&run.log_level))
        .context("invalid log filter")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match run.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
    Ok(())
}

async fn simulate<S: DocumentStore + 'static>(args: &Args, run: &RunConfig, store: S) -> Result<()> {
    let config = match &args.config {
        Some(path) => SimulationConfig::from_json_str(&read(path)?)?,
        None => SimulationConfig::default(),
    };
    let scenario = match &args.scenario {
        Some(path) => ScenarioSpec::from_json_str(&read(path)?)?,
        None => ScenarioSpec::pair(),
    };
    let script = match &args.script {
        Some(path) => InputScript::from_json_str(&read(path)?)?,
        None => InputScript::new(),
    };

    if script.end() > run.max_ticks {
        warn!(
            script_end = script.end(),
            max_ticks = run.max_ticks,
            "Input script runs past the tick limit"
        );
    }

    let config = Arc::new(config);
    let launch = LaunchGenerator::new(config.world_size, run.seed).generate(run.launch);
    info!(
        layout = %run.launch,
        first = ?launch.first,
        second = ?launch.second,
        "Launch points chosen"
    );

    let fleet = scenario.build_fleet(Arc::clone(&config), &launch)?;
    let (transport, rx) = ChannelTransport::channel();
    let persistence = PersistenceService::new(store).spawn(rx);
    let mut clock = SimulationClock::new(fleet, Exporter::new(transport), scenario.goal_watch()?)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupted.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut renderer = TraceRenderer::default();
    let mut interval = tokio::time::interval(config.tick_interval());
    let termination: Termination = loop {
        if args.fast {
            tokio::task::yield_now().await;
        } else {
            interval.tick().await;
        }

        let tick = clock.ticks_run();
        let mut input = script.frame(tick);
        if interrupted.load(Ordering::SeqCst) || tick + 1 >= run.max_ticks {
            input.press(clock.stop_key());
        }

        if let TickOutcome::Halted(termination) = clock.step(&input, &mut renderer)? {
            break termination;
        }
    };

    info!(
        reason = termination.reason.as_str(),
        ticks = termination.ticks,
        "Simulation finished"
    );
    if let Err(e) = &termination.export {
        warn!(error = %e, "Export incomplete");
    }

    // Dropping the clock closes the transport so the service can drain
    drop(clock);
    let (_, report) = persistence.await.context("persistence task failed")?;
    info!(written = report.written, failed = report.failed, "Persistence finished");

    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
