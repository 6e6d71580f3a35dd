//! desktop-verify - screenshot runs against the web desktop via CDP.

mod browser;
mod config;
mod models;
mod scenario;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use crate::browser::{BrowserOptions, DEFAULT_VIEWPORT};
use crate::config::{RunConfig, DEFAULT_OUT_DIR};
use crate::models::ScenarioOutcome;
use crate::scenario::Scenario;

const LOG_FILTER: &str = "desktop_verify=info,chromiumoxide=warn";

#[derive(Parser)]
#[command(name = "desktop-verify")]
#[command(about = "Drive the web desktop in Chrome and save screenshots for review")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Run browser in headed mode (visible)
    #[arg(long, global = true)]
    headed: bool,

    /// Directory screenshots are written to
    #[arg(short, long, global = true, default_value = DEFAULT_OUT_DIR)]
    out_dir: String,

    /// Override the scenario's default URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Chrome/Chromium executable (detected if omitted)
    #[arg(long, global = true)]
    chrome: Option<std::path::PathBuf>,

    /// Output JSON outcome lines
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the notifications panel from the navbar clock
    Notifications,
    /// Booted desktop, error overlay check, application grid
    Yaru,
    /// Selection drag, icon drag, desktop context menu
    Desktop,
    /// Save a file with nano and cat it back
    NanoSave,
    /// Run lsblk and open/close nano
    Terminal,
    /// Run every scenario, one browser at a time
    All,
    /// List scenarios
    List,
}

impl Commands {
    fn scenarios(&self) -> Vec<Scenario> {
        match self {
            Commands::Notifications => vec![Scenario::Notifications],
            Commands::Yaru => vec![Scenario::Yaru],
            Commands::Desktop => vec![Scenario::Desktop],
            Commands::NanoSave => vec![Scenario::NanoSave],
            Commands::Terminal => vec![Scenario::Terminal],
            Commands::All => Scenario::ALL.to_vec(),
            Commands::List => Vec::new(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::List = cli.command {
        for scenario in Scenario::ALL {
            println!(
                "{:<14} {:<24} {}",
                scenario.name(),
                scenario.default_url(),
                scenario.description()
            );
        }
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = BrowserOptions {
        headless: !cli.headed,
        chrome: cli.chrome.clone(),
        viewport: DEFAULT_VIEWPORT,
    };
    let config = RunConfig::new(options, &cli.out_dir, cli.url.clone(), cli.json);

    std::fs::create_dir_all(config.out_dir()).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.out_dir().display()
        )
    })?;

    let runtime = Runtime::new().context("Failed to create tokio runtime")?;

    for scenario in cli.command.scenarios() {
        let outcome = runtime.block_on(scenario.run(&config))?;
        report(&outcome, config.json)?;
    }

    Ok(())
}

fn report(outcome: &ScenarioOutcome, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string(outcome)?);
    } else {
        tracing::info!(
            "{} {} ({} screenshots)",
            outcome.scenario,
            if outcome.completed { "finished" } else { "ended early" },
            outcome.screenshots.len()
        );
    }
    Ok(())
}
