//! Notification panel opened from the navbar clock.

use anyhow::Result;
use futures::StreamExt;

use super::{pause, secs, Run};
use crate::browser::WaitUntil;

const CLOCK: &str = ".main-navbar-vp > div:nth-child(2)";

pub(crate) async fn run(run: &mut Run<'_>) -> Result<bool> {
    let mut console = run.client.console_messages().await?;
    let echo = tokio::spawn(async move {
        while let Some(text) = console.next().await {
            println!("CONSOLE: {}", text);
        }
    });

    let completed = open_panel(run).await;
    echo.abort();
    completed
}

async fn open_panel(run: &mut Run<'_>) -> Result<bool> {
    run.open(WaitUntil::Load).await?;

    run.client.wait_for("text=Activities", secs(10)).await?;
    pause(3.0).await;

    // The clock handles onMouseDown, so a synthetic mousedown is enough.
    println!("Targeting: {}", run.client.inner_text(CLOCK).await?);

    println!("Triggering mousedown via JS...");
    run.client.dispatch_event(CLOCK, "mousedown").await?;

    match run.client.wait_for("text=Notifications", secs(5)).await {
        Ok(_) => println!("Panel opened!"),
        Err(e) => {
            println!("Panel did not open: {}", e);
            run.screenshot("failure_debug.png").await?;
            return Ok(false);
        }
    }

    run.screenshot("notification_panel_v3.png").await?;
    Ok(true)
}
