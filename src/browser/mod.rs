//! Browser driving via Chrome DevTools Protocol.

mod client;
mod keys;
mod network;
mod selector;

pub use chromiumoxide::cdp::browser_protocol::input::MouseButton;
pub use client::{BrowserClient, BrowserOptions, WaitUntil, DEFAULT_VIEWPORT};
