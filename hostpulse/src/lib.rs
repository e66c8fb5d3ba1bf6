//! hostpulse client library: snapshot types, bounded chart series, the live
//! chart registry, connection profiles and the WebSocket helpers behind the TUI.

pub mod app;
pub mod charts;
pub mod error;
pub mod history;
pub mod profiles;
pub mod types;
pub mod ui;
pub mod ws;
