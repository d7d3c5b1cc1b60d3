use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::HotkeyTable;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Read key presses from the controlling terminal and dispatch them until
/// `stop` is set. The terminal stays in cooked mode so log lines render
/// normally; keys arrive once the line is submitted with Enter.
pub(crate) fn listen(hotkeys: HotkeyTable, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(name) = key_name(key.code) {
                        hotkeys.dispatch(&name);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Terminal hotkeys disabled: {}", e);
                    return;
                }
            },
            Ok(false) => {}
            Err(e) => {
                warn!("Terminal hotkeys disabled: {}", e);
                return;
            }
        }
    }
}

fn key_name(code: KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(c) => Some(c.to_lowercase().to_string()),
        KeyCode::Esc => Some("esc".into()),
        KeyCode::Enter => Some("enter".into()),
        KeyCode::F(n) => Some(format!("f{}", n)),
        _ => None,
    }
}
