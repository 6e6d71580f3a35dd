//! Yaru theme check: booted desktop, error overlay, application grid.

use anyhow::Result;
use std::time::Duration;

use super::{pause, Run};
use crate::browser::WaitUntil;

const SHOW_APPLICATIONS: &str = "img[alt='Show Applications']";

pub(crate) async fn run(run: &mut Run<'_>) -> Result<bool> {
    println!("Navigating to {}...", run.host());

    match walk(run).await {
        Ok(()) => Ok(true),
        Err(e) => {
            println!("Error: {:#}", e);
            Ok(false)
        }
    }
}

async fn walk(run: &mut Run<'_>) -> Result<()> {
    run.open(WaitUntil::NetworkIdle).await?;

    // Boot animation.
    pause(5.0).await;

    println!("Taking desktop screenshot...");
    run.screenshot("desktop_v2.png").await?;

    // Next's dev overlay shows "1 error" when the page threw during render.
    if run.client.count("text=1 error").await? > 0 {
        println!("FOUND '1 error' on the page!");
    } else {
        println!("No '1 error' found.");
    }

    println!("Clicking Show Applications...");
    if run.client.count(SHOW_APPLICATIONS).await? > 0 {
        run.client
            .click(SHOW_APPLICATIONS, Duration::from_secs(30))
            .await?;
        pause(1.0).await;
        run.screenshot("app_grid.png").await?;
        println!("Taking app grid screenshot...");
    } else {
        println!("Show Applications button not found!");
    }

    Ok(())
}
