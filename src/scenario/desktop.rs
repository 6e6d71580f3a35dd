//! Desktop gestures: rubber-band selection, icon drag, context menu.

use anyhow::Result;

use super::{pause, secs, Run};
use crate::browser::{MouseButton, WaitUntil};

const DESKTOP_AREA: &str = "[data-context='desktop-area']";
const FIREFOX_ICON: &str = "#firefox";

pub(crate) async fn run(run: &mut Run<'_>) -> Result<bool> {
    run.open(WaitUntil::Load).await?;

    run.client.wait_for(DESKTOP_AREA, secs(30)).await?;
    pause(2.0).await;

    // Selection rectangle is only drawn while the button is held.
    run.client.mouse_move(100.0, 100.0).await?;
    run.client.mouse_down(MouseButton::Left).await?;
    run.client.mouse_move(300.0, 300.0).await?;
    run.screenshot("selection_v2.png").await?;
    run.client.mouse_up(MouseButton::Left).await?;

    drag_firefox_icon(run).await?;

    run.client.mouse_move(500.0, 100.0).await?;
    run.client.mouse_down(MouseButton::Right).await?;
    run.client.mouse_up(MouseButton::Right).await?;
    pause(0.5).await;
    run.screenshot("context_menu.png").await?;

    Ok(true)
}

async fn drag_firefox_icon(run: &mut Run<'_>) -> Result<()> {
    if run.client.count(FIREFOX_ICON).await? == 0 {
        tracing::info!("No {} icon on the desktop, skipping drag", FIREFOX_ICON);
        return Ok(());
    }
    let Some(icon) = run.client.bounding_box(FIREFOX_ICON).await? else {
        tracing::info!("{} has no box, skipping drag", FIREFOX_ICON);
        return Ok(());
    };

    let (cx, cy) = icon.center();
    run.client.mouse_move(cx, cy).await?;
    run.client.mouse_down(MouseButton::Left).await?;
    run.client.mouse_move(icon.x + 150.0, icon.y + 150.0).await?;
    run.client.mouse_up(MouseButton::Left).await?;

    // Icons snap to the grid on release.
    pause(1.0).await;
    run.screenshot("dragged_v2.png").await
}
