//! Terminal app scenarios: shell commands and the nano editor.

use anyhow::Result;

use super::{pause, secs, Run};
use crate::browser::WaitUntil;

const SIDEBAR_ITEM: &str = "[id^=\"sidebar-\"]";
const SIDEBAR_TERMINAL: &str = "#sidebar-terminal";
const PROMPT: &str = "text=vcto@ubuntu";

/// Load the desktop and open a terminal window from the sidebar.
///
/// Returns `false` after taking a debug screenshot if any step times out.
async fn open_terminal(run: &mut Run<'_>) -> Result<bool> {
    println!("Navigating to {}...", run.host());
    run.open(WaitUntil::Load).await?;

    println!("Waiting for sidebar...");
    if run.client.wait_for(SIDEBAR_ITEM, secs(30)).await.is_err() {
        println!("Sidebar not found. Taking debug screenshot.");
        run.screenshot("debug_load_fail.png").await?;
        return Ok(false);
    }

    println!("Clicking Terminal...");
    if run.client.click(SIDEBAR_TERMINAL, secs(5)).await.is_err() {
        println!("sidebar-terminal not found. Taking debug screenshot...");
        run.screenshot("debug_sidebar.png").await?;
        return Ok(false);
    }

    println!("Waiting for terminal window...");
    if run.client.wait_for(PROMPT, secs(10)).await.is_err() {
        println!("Terminal window not found. Screenshotting.");
        run.screenshot("debug_terminal_fail.png").await?;
        return Ok(false);
    }

    Ok(true)
}

/// Type a command line and submit it.
async fn enter(run: &Run<'_>, line: &str) -> Result<()> {
    run.client.type_text(line).await?;
    run.client.press("Enter").await
}

pub(crate) async fn run_nano_save(run: &mut Run<'_>) -> Result<bool> {
    if !open_terminal(run).await? {
        return Ok(false);
    }

    println!("Typing nano test_save.txt...");
    enter(run, "nano test_save.txt").await?;
    pause(1.0).await;

    run.client.type_text("Hello World").await?;
    pause(0.5).await;

    println!("Saving with Ctrl+O...");
    run.client.press("Control+o").await?;
    pause(0.5).await;

    println!("Screenshotting Nano Save...");
    run.screenshot("terminal_nano_save.png").await?;

    println!("Exiting Nano...");
    run.client.press("Control+x").await?;
    pause(1.0).await;

    println!("Verifying file content via cat...");
    enter(run, "cat test_save.txt").await?;
    pause(1.0).await;

    println!("Screenshotting Cat Output...");
    run.screenshot("terminal_cat_verify.png").await?;

    Ok(true)
}

pub(crate) async fn run_terminal(run: &mut Run<'_>) -> Result<bool> {
    if !open_terminal(run).await? {
        return Ok(false);
    }

    println!("Typing lsblk...");
    enter(run, "lsblk").await?;
    pause(1.0).await;

    println!("Screenshotting lsblk...");
    run.screenshot("terminal_lsblk.png").await?;

    println!("Typing nano test.txt...");
    enter(run, "nano test.txt").await?;
    pause(1.0).await;

    println!("Screenshotting Nano...");
    run.screenshot("terminal_nano.png").await?;

    if run.client.content().await?.contains("GNU nano") {
        println!("Nano header found.");
    } else {
        println!("Nano header NOT found.");
    }

    println!("Exiting Nano...");
    run.client.press("Control+x").await?;
    pause(1.0).await;

    println!("Screenshotting Exit...");
    run.screenshot("terminal_exit.png").await?;

    Ok(true)
}
