//! Chrome CDP client wrapper for single-page verification runs.
//!
//! One browser, one page, real input events. Element waits poll the page on
//! a fixed interval and fail once their timeout elapses.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::network;
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::keys::{KeyCombo, KeyDefinition};
use super::network::{InFlight, NetworkEvent};
use super::selector::Selector;
use crate::models::{ElementBox, NavigationResult, ScreenshotResult};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const NETWORK_QUIET: Duration = Duration::from_millis(500);
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Viewport used when a scenario does not ask for one.
pub const DEFAULT_VIEWPORT: (u32, u32) = (1280, 720);

/// How long `navigate` waits after the document loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitUntil {
    #[default]
    Load,
    /// No request in flight for 500 ms.
    NetworkIdle,
}

/// Browser launch options.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    /// Explicit Chrome/Chromium binary; detected when absent.
    pub chrome: Option<PathBuf>,
    pub viewport: (u32, u32),
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome: None,
            viewport: DEFAULT_VIEWPORT,
        }
    }
}

#[derive(Debug, Default)]
struct CursorState {
    x: f64,
    y: f64,
    pressed: Option<MouseButton>,
}

/// Chrome browser client driving a single page.
pub struct BrowserClient {
    browser: Browser,
    page: Page,
    cursor: Mutex<CursorState>,
    handler_task: JoinHandle<()>,
}

impl BrowserClient {
    /// Launch a browser and open a blank page.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let (width, height) = options.viewport;

        let mut builder = BrowserConfig::builder()
            .viewport(Viewport {
                width,
                height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            })
            .window_size(width, height)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-background-timer-throttling")
            .arg("--disable-breakpad")
            .arg("--disable-default-apps")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--disable-renderer-backgrounding")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--mute-audio")
            .arg("--no-first-run")
            .arg("--password-store=basic");

        let chrome_path = options.chrome.clone().or_else(find_chrome_executable);
        if let Some(path) = chrome_path {
            builder = builder.chrome_executable(path);
        }

        if !options.headless {
            builder = builder.with_head();
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to create initial page")?;

        tracing::debug!(
            "Browser launched ({}, {}x{})",
            if options.headless { "headless" } else { "headed" },
            width,
            height
        );

        Ok(Self {
            browser,
            page,
            cursor: Mutex::new(CursorState::default()),
            handler_task,
        })
    }

    /// Navigate to a URL.
    pub async fn navigate(&self, url: &str, wait_until: WaitUntil) -> Result<NavigationResult> {
        // Subscribe before navigating so requests issued during load are seen.
        let network = match wait_until {
            WaitUntil::NetworkIdle => Some(self.network_events().await?),
            WaitUntil::Load => None,
        };

        self.page
            .goto(url)
            .await
            .with_context(|| format!("Navigation to {} failed", url))?;

        if let Some(events) = network {
            self.wait_for_network_idle(events).await?;
        }

        let current_url = self.page.url().await?.unwrap_or_default();
        let title = self.page.get_title().await?.unwrap_or_default();
        tracing::debug!("Navigated to {}", current_url);

        Ok(NavigationResult {
            url: current_url,
            title,
        })
    }

    async fn network_events(&self) -> Result<BoxStream<'static, NetworkEvent>> {
        self.page
            .execute(network::EnableParams::default())
            .await
            .context("Failed to enable network events")?;

        let started = self
            .page
            .event_listener::<network::EventRequestWillBeSent>()
            .await?
            .map(|event| NetworkEvent::Started(event.request_id.inner().clone()));
        let finished = self
            .page
            .event_listener::<network::EventLoadingFinished>()
            .await?
            .map(|event| NetworkEvent::Settled(event.request_id.inner().clone()));
        let failed = self
            .page
            .event_listener::<network::EventLoadingFailed>()
            .await?
            .map(|event| NetworkEvent::Settled(event.request_id.inner().clone()));

        Ok(futures::stream::select_all([started.boxed(), finished.boxed(), failed.boxed()]).boxed())
    }

    /// Wait until no request has been in flight for `NETWORK_QUIET`.
    async fn wait_for_network_idle(&self, mut events: BoxStream<'static, NetworkEvent>) -> Result<()> {
        let wait = async {
            let mut inflight = InFlight::new(Instant::now());
            while let Some(left) = inflight.remaining_quiet(Instant::now(), NETWORK_QUIET) {
                match tokio::time::timeout(left, events.next()).await {
                    Ok(Some(event)) => inflight.apply(event, Instant::now()),
                    Ok(None) => break,
                    Err(_) => {}
                }
            }
            inflight.open_requests()
        };

        let open = tokio::time::timeout(NAVIGATION_TIMEOUT, wait)
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Timeout {}ms exceeded waiting for network idle",
                    NAVIGATION_TIMEOUT.as_millis()
                )
            })?;
        tracing::debug!("Network idle ({} requests still tracked)", open);
        Ok(())
    }

    /// Wait until a visible element matches the selector.
    pub async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<ElementBox> {
        let parsed = Selector::parse(selector);
        let script = parsed.box_script()?;

        let poll = async {
            loop {
                // Evaluation fails while the page is mid-navigation; keep polling.
                if let Ok(Some(found)) = self.eval_json::<Option<ElementBox>>(&script).await {
                    return found;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, poll).await.map_err(|_| {
            anyhow::anyhow!(
                "Timeout {}ms exceeded waiting for selector \"{}\"",
                timeout.as_millis(),
                parsed
            )
        })
    }

    /// Wait for an element, then left-click its centre.
    pub async fn click(&self, selector: &str, timeout: Duration) -> Result<()> {
        let target = self.wait_for(selector, timeout).await?;
        let (x, y) = target.center();

        self.mouse_move(x, y).await?;
        self.mouse_down(MouseButton::Left).await?;
        self.mouse_up(MouseButton::Left).await?;

        tracing::debug!("Clicked {} at ({:.0}, {:.0})", selector, x, y);
        Ok(())
    }

    /// Number of elements matching the selector right now.
    pub async fn count(&self, selector: &str) -> Result<usize> {
        let script = Selector::parse(selector).count_script()?;
        self.page
            .evaluate(script)
            .await
            .with_context(|| format!("Failed to count \"{}\"", selector))?
            .into_value()
            .context("Failed to parse element count")
    }

    /// Box of the first visible match, if any.
    pub async fn bounding_box(&self, selector: &str) -> Result<Option<ElementBox>> {
        let script = Selector::parse(selector).box_script()?;
        self.eval_json(&script).await
    }

    /// `innerText` of the first match.
    pub async fn inner_text(&self, selector: &str) -> Result<String> {
        let script = Selector::parse(selector).inner_text_script()?;
        self.eval_json::<Option<String>>(&script)
            .await?
            .with_context(|| format!("Element not found: {}", selector))
    }

    /// Fire a bubbling mouse event on the first match from page script.
    pub async fn dispatch_event(&self, selector: &str, event_type: &str) -> Result<()> {
        let script = Selector::parse(selector).dispatch_script(event_type)?;
        let dispatched: bool = self
            .page
            .evaluate(script)
            .await
            .context("Failed to dispatch event")?
            .into_value()
            .context("Failed to parse dispatch result")?;

        if !dispatched {
            anyhow::bail!("Element not found: {}", selector);
        }
        Ok(())
    }

    /// Serialized HTML of the page.
    pub async fn content(&self) -> Result<String> {
        self.page.content().await.context("Failed to read page content")
    }

    async fn eval_json<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T> {
        let raw: String = self
            .page
            .evaluate(script)
            .await?
            .into_value()
            .context("Page script did not return a string")?;
        Ok(serde_json::from_str(&raw)?)
    }

    // =========================================================================
    // Mouse
    // =========================================================================

    /// Move the mouse; drags if a button is held.
    pub async fn mouse_move(&self, x: f64, y: f64) -> Result<()> {
        let mut cursor = self.cursor.lock().await;
        let button = cursor.pressed.clone().unwrap_or(MouseButton::None);
        let buttons = cursor.pressed.as_ref().map_or(0, buttons_mask);

        self.dispatch_mouse(DispatchMouseEventType::MouseMoved, x, y, button, buttons, 0)
            .await?;

        cursor.x = x;
        cursor.y = y;
        Ok(())
    }

    /// Press a mouse button at the current position.
    pub async fn mouse_down(&self, button: MouseButton) -> Result<()> {
        let mut cursor = self.cursor.lock().await;
        let buttons = buttons_mask(&button);

        self.dispatch_mouse(
            DispatchMouseEventType::MousePressed,
            cursor.x,
            cursor.y,
            button.clone(),
            buttons,
            1,
        )
        .await?;

        cursor.pressed = Some(button);
        Ok(())
    }

    /// Release a mouse button at the current position.
    pub async fn mouse_up(&self, button: MouseButton) -> Result<()> {
        let mut cursor = self.cursor.lock().await;

        self.dispatch_mouse(
            DispatchMouseEventType::MouseReleased,
            cursor.x,
            cursor.y,
            button,
            0,
            1,
        )
        .await?;

        cursor.pressed = None;
        Ok(())
    }

    async fn dispatch_mouse(
        &self,
        kind: DispatchMouseEventType,
        x: f64,
        y: f64,
        button: MouseButton,
        buttons: i64,
        click_count: i64,
    ) -> Result<()> {
        self.page
            .execute(
                DispatchMouseEventParams::builder()
                    .r#type(kind)
                    .x(x)
                    .y(y)
                    .button(button)
                    .buttons(buttons)
                    .click_count(click_count)
                    .build()
                    .map_err(|e| anyhow::anyhow!("Failed to build mouse event: {:?}", e))?,
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// Type text into the focused element, one key event per character.
    pub async fn type_text(&self, text: &str) -> Result<()> {
        for c in text.chars() {
            let key = KeyDefinition::from_char(c);
            self.dispatch_key(&key, 0).await?;
        }
        tracing::debug!("Typed {} characters", text.chars().count());
        Ok(())
    }

    /// Press a key or combo such as `Enter` or `Control+o`.
    pub async fn press(&self, combo: &str) -> Result<()> {
        let combo = KeyCombo::parse(combo)?;
        self.dispatch_key(&combo.key, combo.modifiers).await
    }

    async fn dispatch_key(&self, key: &KeyDefinition, modifiers: i64) -> Result<()> {
        let down_type = if key.text.is_some() {
            DispatchKeyEventType::KeyDown
        } else {
            DispatchKeyEventType::RawKeyDown
        };

        let mut down = DispatchKeyEventParams::builder()
            .r#type(down_type)
            .key(key.key.clone())
            .code(key.code.clone())
            .windows_virtual_key_code(key.key_code)
            .modifiers(modifiers);
        if let Some(text) = &key.text {
            down = down.text(text.clone()).unmodified_text(text.clone());
        }

        self.page
            .execute(
                down.build()
                    .map_err(|e| anyhow::anyhow!("Failed to build key event: {:?}", e))?,
            )
            .await?;

        self.page
            .execute(
                DispatchKeyEventParams::builder()
                    .r#type(DispatchKeyEventType::KeyUp)
                    .key(key.key.clone())
                    .code(key.code.clone())
                    .windows_virtual_key_code(key.key_code)
                    .modifiers(modifiers)
                    .build()
                    .map_err(|e| anyhow::anyhow!("Failed to build key event: {:?}", e))?,
            )
            .await?;

        Ok(())
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Write a viewport PNG, creating parent directories.
    pub async fn screenshot(&self, path: &Path) -> Result<ScreenshotResult> {
        let data = self
            .page
            .screenshot(ScreenshotParams::builder().build())
            .await
            .context("Failed to capture screenshot")?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &data)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::debug!("Wrote {} ({} bytes)", path.display(), data.len());

        Ok(ScreenshotResult {
            path: path.display().to_string(),
            bytes: data.len(),
        })
    }

    /// Page `console.*` calls rendered as text.
    pub async fn console_messages(&self) -> Result<BoxStream<'static, String>> {
        let listener = self
            .page
            .event_listener::<EventConsoleApiCalled>()
            .await
            .context("Failed to subscribe to console events")?;

        Ok(listener
            .map(|event| {
                let values: Vec<Option<&Value>> =
                    event.args.iter().map(|arg| arg.value.as_ref()).collect();
                let descriptions: Vec<Option<&str>> = event
                    .args
                    .iter()
                    .map(|arg| arg.description.as_deref())
                    .collect();
                console_text(&values, &descriptions)
            })
            .boxed())
    }

    /// Close the browser and wait for the process to exit.
    ///
    /// The CDP handler task is stopped even when closing fails.
    pub async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if closed.is_ok() {
            if let Err(e) = self.browser.wait().await {
                tracing::debug!("Failed to wait for browser exit: {}", e);
            }
        }
        self.handler_task.abort();
        closed.context("Failed to close browser")?;
        tracing::debug!("Browser closed");
        Ok(())
    }
}

fn buttons_mask(button: &MouseButton) -> i64 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Right => 2,
        MouseButton::Middle => 4,
        MouseButton::Back => 8,
        MouseButton::Forward => 16,
        _ => 0,
    }
}

/// Join console arguments the way devtools prints them.
fn console_text(values: &[Option<&Value>], descriptions: &[Option<&str>]) -> String {
    values
        .iter()
        .zip(descriptions.iter())
        .map(|(value, description)| match (value, description) {
            (Some(Value::String(s)), _) => s.clone(),
            (Some(v), _) => v.to_string(),
            (None, Some(d)) => d.to_string(),
            (None, None) => String::new(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Find a Chrome executable: Playwright's cache first, then system installs.
fn find_chrome_executable() -> Option<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        let caches = [
            home.join(".cache/ms-playwright"),
            home.join("Library/Caches/ms-playwright"),
        ];
        let binaries = [
            "chrome-linux/chrome",
            "chrome-mac/Chromium.app/Contents/MacOS/Chromium",
        ];

        for cache in caches.iter().filter(|c| c.exists()) {
            let Ok(entries) = std::fs::read_dir(cache) else {
                continue;
            };

            let mut chromium_dirs: Vec<_> = entries
                .filter_map(|e| e.ok())
                .filter(|e| {
                    let name = e.file_name();
                    let name = name.to_string_lossy();
                    name.starts_with("chromium-") || name.starts_with("chromium_")
                })
                .filter(|e| !e.file_name().to_string_lossy().contains("headless"))
                .collect();

            chromium_dirs.sort_by_key(|b| std::cmp::Reverse(b.file_name()));

            for dir in chromium_dirs {
                for binary in &binaries {
                    let candidate = dir.path().join(binary);
                    if candidate.exists() {
                        tracing::info!("Using Playwright Chromium at: {:?}", candidate);
                        return Some(candidate);
                    }
                }
            }
        }
    }

    let paths = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    for path in &paths {
        let p = PathBuf::from(path);
        if p.exists() {
            tracing::info!("Found Chrome at: {}", path);
            return Some(p);
        }
    }

    tracing::debug!("No known Chrome install found, deferring to chromiumoxide detection");
    None
}

#[cfg(test)]
mod page_tests;
