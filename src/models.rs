//! Data models for verification runs.

use serde::{Deserialize, Serialize};

/// Navigation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// Final URL after navigation
    pub url: String,
    /// Page title
    pub title: String,
}

/// Element box in CSS pixels, relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementBox {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Screenshot written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotResult {
    pub path: String,
    /// PNG size in bytes
    pub bytes: usize,
}

/// What one scenario run left behind for the reviewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario: String,
    /// False when the run ended early on a failed wait or error
    pub completed: bool,
    #[serde(default)]
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub finished_at: String,
}
