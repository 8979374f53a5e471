use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};
use sandbox::{Player, QueryWorld, SandboxConfig, Scenario, demo_course};

/// Runs the scripted obstacle course headlessly and logs the character state.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// JSON config file. Defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of ticks to run (defaults to the length of the script).
    #[arg(long)]
    ticks: Option<u32>,

    /// Log the character state every N ticks.
    #[arg(long, default_value_t = 30)]
    log_every: u32,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> sandbox::Result<()> {
    let config = match &cli.config {
        Some(path) => SandboxConfig::load(path)?,
        None => SandboxConfig::default(),
    };

    let log_every = if cli.log_every == 0 {
        warn!("--log-every 0 is not allowed, logging every tick");
        1
    } else {
        cli.log_every
    };

    let scenario = Scenario::obstacle_run();
    let ticks = cli.ticks.unwrap_or_else(|| scenario.total_ticks());
    let dt = config.fixed_dt();

    let mut player = Player::new(&config, QueryWorld::build(demo_course()));
    info!("running {ticks} ticks at {} Hz", config.tick_rate_hz);

    let mut last_label = None;
    for tick in 0..ticks {
        let label = scenario.label_at(tick);
        if label != last_label {
            if let Some(label) = label {
                info!("[{tick:>5}] -> {label}");
            }
            last_label = label;
        }

        player.tick(&scenario.input_at(tick), dt);

        if (tick + 1) % log_every == 0 {
            info!("[{:>5}] {}", tick + 1, player.state_text());
        }
    }

    info!("done: {}", player.state_text());
    Ok(())
}
