use anyhow::Result;
use farm_data::Coordinates;
use tracing::{debug, info};

use super::{terminal, HotkeyCallback, HotkeyTable, InputPort, Listener};

/// Logs every action instead of sending it; hotkeys come from the terminal
#[derive(Default)]
pub struct DryRunInput {
    hotkeys: HotkeyTable,
    listener: Option<Listener>,
}

impl DryRunInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputPort for DryRunInput {
    fn click(&mut self, at: Coordinates) -> Result<()> {
        info!("[dry-run] click {}", at);
        Ok(())
    }

    fn move_to(&mut self, at: Coordinates) -> Result<()> {
        info!("[dry-run] move_to {}", at);
        Ok(())
    }

    fn press_key(&mut self, key: &str) -> Result<()> {
        info!("[dry-run] press_key \"{}\"", key);
        Ok(())
    }

    fn register_hotkey(&mut self, key: &str, callback: HotkeyCallback) -> Result<()> {
        self.hotkeys.insert(key, callback);
        if self.listener.is_none() {
            let hotkeys = self.hotkeys.clone();
            self.listener = Some(Listener::spawn("terminal-hotkeys", move |stop| {
                terminal::listen(hotkeys, stop)
            })?);
        }
        debug!("Registered hotkey: {}", key);
        Ok(())
    }

    fn unregister_all_hotkeys(&mut self) {
        self.hotkeys.clear();
        if let Some(mut listener) = self.listener.take() {
            listener.shutdown();
        }
        debug!("Unregistered all hotkeys");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_are_accepted() {
        let mut input = DryRunInput::new();
        input.click(Coordinates::new(715, 850)).unwrap();
        input.move_to(Coordinates::new(5, 5)).unwrap();
        input.press_key("esc").unwrap();
    }

    #[test]
    fn test_unregister_without_hotkeys() {
        let mut input = DryRunInput::new();
        input.unregister_all_hotkeys();
        assert!(input.hotkeys.keys().is_empty());
    }
}
