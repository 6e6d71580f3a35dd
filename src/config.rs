//! Run configuration assembled from command-line flags.

use std::path::{Path, PathBuf};

use crate::browser::BrowserOptions;

pub const DEFAULT_OUT_DIR: &str = "verification";

/// Settings shared by every scenario in one invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub browser: BrowserOptions,
    /// Directory screenshots are written into
    pub out_dir: PathBuf,
    /// Overrides each scenario's default URL
    pub url: Option<String>,
    /// Print a JSON outcome line per scenario
    pub json: bool,
}

impl RunConfig {
    pub fn new(browser: BrowserOptions, out_dir: &str, url: Option<String>, json: bool) -> Self {
        Self {
            browser,
            out_dir: expand_dir(out_dir),
            url,
            json,
        }
    }

    /// The URL a scenario should open.
    pub fn target_url<'a>(&'a self, default: &'a str) -> &'a str {
        self.url.as_deref().unwrap_or(default)
    }

    pub fn screenshot_path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

fn expand_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screenshots_land_in_out_dir() {
        let config = RunConfig::new(BrowserOptions::default(), DEFAULT_OUT_DIR, None, false);
        assert_eq!(
            config.screenshot_path("app_grid.png"),
            PathBuf::from("verification/app_grid.png")
        );
    }

    #[test]
    fn url_override_wins() {
        let config = RunConfig::new(BrowserOptions::default(), "out", None, false);
        assert_eq!(config.target_url("http://localhost:3000"), "http://localhost:3000");

        let config = RunConfig::new(
            BrowserOptions::default(),
            "out",
            Some("http://localhost:3001".into()),
            false,
        );
        assert_eq!(config.target_url("http://localhost:3000"), "http://localhost:3001");
    }

    #[test]
    fn tilde_expands_to_home() {
        let config = RunConfig::new(BrowserOptions::default(), "~/shots", None, false);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.out_dir(), home.join("shots").as_path());
        }
    }
}
