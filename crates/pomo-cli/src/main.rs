use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pomo_core::{Config, Driver, ExitReason, Session, SystemClock, Ticker};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::input::Start;

mod input;
mod render;

#[derive(Parser, Debug)]
#[command(name = "pomo", version, about = "Pomodoro focus timer")]
#[command(after_help = r#"WHILE RUNNING:
    <enter>   proceed to the next phase once the current one is over
    p         pause
    r         resume
    s         show stats
    q         quit and print the final report

Flag defaults can be changed in ~/.config/pomo/config.toml
(see --init-config)."#)]
struct Cli {
    /// The number of focus rounds per cycle/long break [default: 3]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    rounds: Option<u32>,

    /// The duration of the short breaks [default: 5]
    #[arg(long)]
    short: Option<u32>,

    /// The duration of the long breaks [default: 15]
    #[arg(long)]
    long: Option<u32>,

    /// The duration of each focus session [default: 25]
    #[arg(long)]
    focus: Option<u32>,

    /// Auto progress to the next phase without input
    #[arg(long)]
    auto: bool,

    /// Count durations in seconds instead of minutes
    #[arg(long)]
    seconds: bool,

    /// Read defaults from this config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    init_config: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Flags override whatever the config file says.
    fn apply(&self, config: &mut Config) {
        if let Some(rounds) = self.rounds {
            config.timer.rounds = rounds;
        }
        if let Some(short) = self.short {
            config.timer.short = short;
        }
        if let Some(long) = self.long {
            config.timer.long = long;
        }
        if let Some(focus) = self.focus {
            config.timer.focus = focus;
        }
        config.timer.auto |= self.auto;
        config.timer.seconds |= self.seconds;
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            1
        }
    };

    // The stdin reader may still be blocked on a read; exit without
    // waiting for it.
    let _ = std::io::stdout().flush();
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;
    cli.apply(&mut config);
    tracing::debug!(?config, path = %config_path.display(), "loaded configuration");

    if cli.init_config {
        config.save_to(&config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(0);
    }

    let session_config = config.session_config()?;
    let tick = config.tick_interval()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match input::wait_for_start(&mut lines).await {
        Start::Begin => {}
        Start::Quit => return Ok(0),
        Start::Closed(reason) => {
            eprintln!("error: {reason}");
            return Ok(1);
        }
    }

    let session = Session::new(session_config, Arc::new(SystemClock::new()));
    let (input_tx, input_rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let ticker = Ticker::spawn(tick, input_tx.clone());
    let printer = tokio::spawn(render::print_events(event_rx, cli.json));
    tokio::spawn(input::read_commands(lines, input_tx));

    let outcome = Driver::new(session, event_tx).run(input_rx, ticker).await?;
    printer.await.context("event printer failed")?;

    if let ExitReason::InputFailed(reason) = &outcome.exit {
        eprintln!("error: {reason}");
    }
    Ok(outcome.exit.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() {
        let cli = Cli::parse_from(["pomo", "--focus", "50", "--seconds"]);
        let mut config = Config::parse("[timer]\nfocus = 30\nshort = 7\n").unwrap();
        cli.apply(&mut config);

        assert_eq!(config.timer.focus, 50);
        assert_eq!(config.timer.short, 7);
        assert!(config.timer.seconds);
        assert!(!config.timer.auto);
    }

    #[test]
    fn bool_flags_cannot_switch_off_the_file() {
        let cli = Cli::parse_from(["pomo"]);
        let mut config = Config::parse("[timer]\nauto = true\n").unwrap();
        cli.apply(&mut config);
        assert!(config.timer.auto);
    }

    #[test]
    fn zero_rounds_flag_is_refused() {
        assert!(Cli::try_parse_from(["pomo", "--rounds", "0"]).is_err());
    }
}
