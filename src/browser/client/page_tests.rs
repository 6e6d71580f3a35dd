//! Driver behaviour against a real page.
//!
//! These launch Chrome, so they are ignored by default:
//! `cargo test -- --ignored`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

use super::{BrowserClient, BrowserOptions, MouseButton, WaitUntil};

const FIXTURE: &str = r#"<!doctype html>
<html>
<head><title>fixture</title></head>
<body style="margin:0">
<div id="status" style="position:absolute;left:0;top:0;width:600px;height:30px">Status: <span id="greeting">Hello   World</span></div>
<div id="hidden" style="display:none">Secret</div>
<div id="panel" style="position:absolute;left:0;top:40px">Notifications</div>
<div id="badge" style="position:absolute;left:0;top:70px">Notifications (3)</div>
<div id="clock" style="position:absolute;left:0;top:100px;width:100px;height:20px">12:00</div>
<textarea id="editor" style="position:absolute;left:0;top:140px;width:300px;height:80px"></textarea>
<script>
window.keys = [];
window.mice = [];
window.menus = 0;
window.clockDowns = 0;
document.addEventListener('keydown', (e) => keys.push({ key: e.key, ctrl: e.ctrlKey }));
for (const t of ['mousedown', 'mousemove', 'mouseup']) {
  document.addEventListener(t, (e) => mice.push({ type: e.type, button: e.button, buttons: e.buttons }));
}
document.addEventListener('contextmenu', (e) => { e.preventDefault(); menus += 1; });
document.getElementById('clock').addEventListener('mousedown', () => { clockDowns += 1; });
</script>
</body>
</html>
"#;

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("desktop-verify-{}-{}", std::process::id(), name))
}

fn fixture_url(name: &str) -> String {
    let dir = scratch_dir(name);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("fixture.html");
    std::fs::write(&path, FIXTURE).unwrap();
    format!("file://{}", path.display())
}

async fn open_fixture(name: &str) -> BrowserClient {
    let client = BrowserClient::launch(&BrowserOptions::default())
        .await
        .expect("Chrome should launch");
    client
        .navigate(&fixture_url(name), WaitUntil::Load)
        .await
        .expect("fixture should load");
    client
}

async fn eval<T: DeserializeOwned>(client: &BrowserClient, expr: &str) -> T {
    client
        .page
        .evaluate(expr)
        .await
        .unwrap()
        .into_value()
        .unwrap()
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_text_selector_picks_innermost_element() {
    let client = open_fixture("innermost").await;

    assert_eq!(client.count("text=HELLO world").await.unwrap(), 1);
    assert_eq!(client.inner_text("text=hello   WORLD").await.unwrap(), "Hello World");

    // Substring matching finds both, the quoted form only the exact one.
    assert_eq!(client.count("text=Notifications").await.unwrap(), 2);
    assert_eq!(client.count("text=\"Notifications\"").await.unwrap(), 1);
    assert_eq!(client.count("text=\"notifications\"").await.unwrap(), 0);

    client.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_wait_for_skips_hidden_elements() {
    let client = open_fixture("hidden").await;

    let found = client
        .wait_for("text=Hello World", Duration::from_secs(2))
        .await
        .unwrap();
    assert!(found.width > 0.0 && found.height > 0.0);

    let err = client
        .wait_for("#hidden", Duration::from_millis(300))
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("Timeout 300ms"), "unexpected error: {}", err);
    assert!(err.contains("#hidden"), "unexpected error: {}", err);

    assert_eq!(client.bounding_box("#hidden").await.unwrap(), None);
    assert_eq!(client.count("#hidden").await.unwrap(), 1);

    client.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_control_o_sets_ctrl_key() {
    let client = open_fixture("ctrl").await;

    client.press("Control+o").await.unwrap();
    client.press("Enter").await.unwrap();

    let keys: Vec<Value> = eval(&client, "keys").await;
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0]["key"], "o");
    assert_eq!(keys[0]["ctrl"], true);
    assert_eq!(keys[1]["key"], "Enter");
    assert_eq!(keys[1]["ctrl"], false);

    client.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_typing_into_clicked_textarea() {
    let client = open_fixture("typing").await;

    client
        .click("#editor", Duration::from_secs(2))
        .await
        .unwrap();
    client.type_text("Hello World").await.unwrap();

    let value: String = eval(&client, "document.getElementById('editor').value").await;
    assert_eq!(value, "Hello World");

    client.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_drag_reports_held_button() {
    let client = open_fixture("drag").await;

    client.mouse_move(400.0, 400.0).await.unwrap();
    client.mouse_down(MouseButton::Left).await.unwrap();
    client.mouse_move(450.0, 420.0).await.unwrap();
    client.mouse_up(MouseButton::Left).await.unwrap();

    let mice: Vec<Value> = eval(&client, "mice").await;
    let types: Vec<&str> = mice.iter().filter_map(|m| m["type"].as_str()).collect();
    assert_eq!(types, ["mousemove", "mousedown", "mousemove", "mouseup"]);
    assert_eq!(mice[0]["buttons"], 0);
    assert_eq!(mice[1]["button"], 0);
    assert_eq!(mice[2]["buttons"], 1);
    assert_eq!(mice[3]["buttons"], 0);

    client.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_right_button_opens_context_menu() {
    let client = open_fixture("context").await;

    client.mouse_move(500.0, 300.0).await.unwrap();
    client.mouse_down(MouseButton::Right).await.unwrap();
    client.mouse_up(MouseButton::Right).await.unwrap();

    let menus: u32 = eval(&client, "menus").await;
    assert_eq!(menus, 1);

    let mice: Vec<Value> = eval(&client, "mice").await;
    let down = mice.iter().find(|m| m["type"] == "mousedown").unwrap();
    assert_eq!(down["button"], 2);

    client.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_dispatch_event_reaches_listener() {
    let client = open_fixture("dispatch").await;

    client.dispatch_event("#clock", "mousedown").await.unwrap();
    let downs: u32 = eval(&client, "clockDowns").await;
    assert_eq!(downs, 1);
    assert_eq!(client.inner_text("#clock").await.unwrap(), "12:00");

    assert!(client.dispatch_event("#missing", "mousedown").await.is_err());

    client.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_screenshot_creates_parent_directories() {
    let client = open_fixture("screenshot").await;

    let path = scratch_dir("screenshot").join("nested/deeper/shot.png");
    let shot = client.screenshot(&path).await.unwrap();

    let data = std::fs::read(&path).unwrap();
    assert_eq!(shot.bytes, data.len());
    assert_eq!(&data[..4], b"\x89PNG");
    assert!(client.content().await.unwrap().contains("Notifications (3)"));

    client.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_network_idle_navigation_settles() {
    let client = BrowserClient::launch(&BrowserOptions::default())
        .await
        .expect("Chrome should launch");

    let nav = client
        .navigate(&fixture_url("idle"), WaitUntil::NetworkIdle)
        .await
        .unwrap();
    assert_eq!(nav.title, "fixture");

    client.close().await.unwrap();
}
