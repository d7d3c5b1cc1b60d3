use anyhow::{bail, Result};
use farm_data::Coordinates;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::SetCursorPos;

use super::{HotkeyCallback, HotkeyTable, InputPort, Listener};

const KEY_POLL_INTERVAL: Duration = Duration::from_millis(30);
const PRESS_HOLD: Duration = Duration::from_millis(50);

fn mouse_input(flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn key_input(vk: u8, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk as u16),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Queue `inputs` on the system input stream
fn send(inputs: &[INPUT]) -> Result<()> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        bail!("SendInput accepted {} of {} events", sent, inputs.len());
    }
    Ok(())
}

/// Virtual-key code for a key name
fn virtual_key(name: &str) -> Option<u8> {
    let name = name.to_lowercase();
    let vk = match name.as_str() {
        "esc" | "escape" => 0x1B,
        "enter" | "return" => 0x0D,
        "space" => 0x20,
        "tab" => 0x09,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => c.to_ascii_uppercase() as u8,
                _ => return None,
            }
        }
    };
    Some(vk)
}

fn key_is_down(vk: u8) -> bool {
    // High bit set while the key is held
    unsafe { (GetAsyncKeyState(vk as i32) as u16 & 0x8000) != 0 }
}

/// Injects real mouse and keyboard events with `SendInput` and polls the
/// global key state for hotkeys, so they work while the game has focus.
#[derive(Default)]
pub struct WindowsInput {
    hotkeys: HotkeyTable,
    listener: Option<Listener>,
}

impl WindowsInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputPort for WindowsInput {
    fn click(&mut self, at: Coordinates) -> Result<()> {
        self.move_to(at)?;
        send(&[
            mouse_input(MOUSEEVENTF_LEFTDOWN),
            mouse_input(MOUSEEVENTF_LEFTUP),
        ])
    }

    fn move_to(&mut self, at: Coordinates) -> Result<()> {
        unsafe { SetCursorPos(at.x, at.y) }?;
        Ok(())
    }

    fn press_key(&mut self, key: &str) -> Result<()> {
        let Some(vk) = virtual_key(key) else {
            bail!("Unsupported key '{}'", key);
        };
        send(&[key_input(vk, KEYBD_EVENT_FLAGS(0))])?;
        std::thread::sleep(PRESS_HOLD);
        send(&[key_input(vk, KEYEVENTF_KEYUP)])
    }

    fn register_hotkey(&mut self, key: &str, callback: HotkeyCallback) -> Result<()> {
        if virtual_key(key).is_none() {
            bail!("Unsupported hotkey '{}'", key);
        }
        self.hotkeys.insert(key, callback);
        if self.listener.is_none() {
            let hotkeys = self.hotkeys.clone();
            self.listener = Some(Listener::spawn("global-hotkeys", move |stop| {
                poll_keys(hotkeys, stop)
            })?);
            info!("Global hotkeys active");
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

/// Fire each registered hotkey once per key-down edge
fn poll_keys(hotkeys: HotkeyTable, stop: Arc<AtomicBool>) {
    let mut held: HashSet<String> = HashSet::new();
    while !stop.load(Ordering::Acquire) {
        for key in hotkeys.keys() {
            let down = virtual_key(&key).is_some_and(key_is_down);
            if down && held.insert(key.clone()) {
                hotkeys.dispatch(&key);
            } else if !down {
                held.remove(&key);
            }
        }
        std::thread::sleep(KEY_POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_events_carry_button_flags() {
        let down = mouse_input(MOUSEEVENTF_LEFTDOWN);
        assert_eq!(down.r#type, INPUT_MOUSE);
        assert_eq!(unsafe { down.Anonymous.mi.dwFlags }, MOUSEEVENTF_LEFTDOWN);

        let up = key_input(0x1B, KEYEVENTF_KEYUP);
        assert_eq!(up.r#type, INPUT_KEYBOARD);
        assert_eq!(unsafe { up.Anonymous.ki.wVk }, VIRTUAL_KEY(0x1B));
    }

    #[test]
    fn test_virtual_keys() {
        assert_eq!(virtual_key("esc"), Some(0x1B));
        assert_eq!(virtual_key("p"), Some(b'P'));
        assert_eq!(virtual_key("L"), Some(b'L'));
        assert_eq!(virtual_key("7"), Some(b'7'));
        assert_eq!(virtual_key("ctrl+k"), None);
        assert_eq!(virtual_key(""), None);
    }
}
