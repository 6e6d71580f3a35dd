//! Verification scenarios against the web desktop.
//!
//! Every scenario opens its own browser, walks a fixed sequence of gestures
//! and leaves screenshots behind. Guarded waits that fail print a message,
//! take a debug screenshot and end the scenario early; that is an outcome,
//! not an error.

mod desktop;
mod notifications;
mod terminal;
mod yaru;

use anyhow::Result;
use std::time::Duration;

use crate::browser::{BrowserClient, WaitUntil};
use crate::config::RunConfig;
use crate::models::ScenarioOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Notifications,
    Yaru,
    Desktop,
    NanoSave,
    Terminal,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Notifications,
        Scenario::Yaru,
        Scenario::Desktop,
        Scenario::NanoSave,
        Scenario::Terminal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Notifications => "notifications",
            Scenario::Yaru => "yaru",
            Scenario::Desktop => "desktop",
            Scenario::NanoSave => "nano-save",
            Scenario::Terminal => "terminal",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Scenario::Notifications => "Open the notifications panel from the navbar clock",
            Scenario::Yaru => "Desktop after boot, error overlay check, application grid",
            Scenario::Desktop => "Rubber-band selection, icon drag, desktop context menu",
            Scenario::NanoSave => "Write a file with nano in the terminal and cat it back",
            Scenario::Terminal => "Run lsblk and open/close nano in the terminal",
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            Scenario::Notifications => "http://localhost:3002",
            _ => "http://localhost:3000",
        }
    }

    /// Launch a browser, run the scenario, and always close the browser.
    pub async fn run(self, config: &RunConfig) -> Result<ScenarioOutcome> {
        tracing::info!("Running scenario {}", self.name());

        let client = BrowserClient::launch(&config.browser).await?;
        let mut run = Run::new(&client, config, self.default_url());

        let body = match self {
            Scenario::Notifications => notifications::run(&mut run).await,
            Scenario::Yaru => yaru::run(&mut run).await,
            Scenario::Desktop => desktop::run(&mut run).await,
            Scenario::NanoSave => terminal::run_nano_save(&mut run).await,
            Scenario::Terminal => terminal::run_terminal(&mut run).await,
        };
        let screenshots = run.screenshots;

        if let Err(e) = client.close().await {
            tracing::warn!("Failed to close browser cleanly: {:#}", e);
        }

        let completed = match body {
            Ok(completed) => completed,
            Err(e) => {
                tracing::error!("Scenario {} aborted: {:#}", self.name(), e);
                false
            }
        };

        Ok(ScenarioOutcome {
            scenario: self.name().to_string(),
            completed,
            screenshots,
            finished_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

/// State threaded through one scenario body.
pub(crate) struct Run<'a> {
    pub client: &'a BrowserClient,
    config: &'a RunConfig,
    default_url: &'static str,
    screenshots: Vec<String>,
}

impl<'a> Run<'a> {
    fn new(client: &'a BrowserClient, config: &'a RunConfig, default_url: &'static str) -> Self {
        Self {
            client,
            config,
            default_url,
            screenshots: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        self.config.target_url(self.default_url)
    }

    /// Host and port for progress lines, e.g. `localhost:3000`.
    pub fn host(&self) -> &str {
        host_of(self.url())
    }

    /// Navigate to the scenario's URL.
    pub async fn open(&self, wait_until: WaitUntil) -> Result<()> {
        let url = self.url().to_string();
        let nav = self.client.navigate(&url, wait_until).await?;
        tracing::info!("Loaded {} ({})", nav.url, nav.title);
        Ok(())
    }

    pub async fn screenshot(&mut self, file_name: &str) -> Result<()> {
        let path = self.config.screenshot_path(file_name);
        let shot = self.client.screenshot(&path).await?;
        tracing::info!("Saved {} ({} bytes)", shot.path, shot.bytes);
        self.screenshots.push(shot.path);
        Ok(())
    }
}

fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.trim_end_matches('/')
}

pub(crate) async fn pause(seconds: f64) {
    tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
}

pub(crate) fn secs(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}
