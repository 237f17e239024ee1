use std::{path::PathBuf, time::Duration};

use clap::Parser;
use mazewalk::{app::App, logging, session::SessionConfig};

/// Animate depth-first and breadth-first search solving a random maze.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Seed for the first maze; each regenerated maze uses the next seed
    #[arg(long)]
    seed: Option<u64>,

    /// Pause after each solver step, in microseconds
    #[arg(long, default_value_t = 500)]
    step_delay_us: u64,

    /// Directory to write mazewalk.log to (defaults to the system temp directory)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.unwrap_or_else(std::env::temp_dir);
    let _log_guard = logging::init_file(&log_dir)?;
    tracing::info!("[main] starting (seed: {:?})", cli.seed);

    let app = App::new(SessionConfig {
        seed: cli.seed,
        step_delay: Duration::from_micros(cli.step_delay_us),
        ..SessionConfig::default()
    });

    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let result = app.run();
    App::restore_terminal(&mut stdout)?;
    if let Err(e) = &result {
        tracing::error!("[main] {}", e);
    }
    result
}
