mod stub;
mod terminal;
#[cfg(windows)]
mod windows;

pub use stub::DryRunInput;
#[cfg(windows)]
pub use windows::WindowsInput;

use anyhow::Result;
use farm_data::Coordinates;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use tracing::{info, warn};

pub type HotkeyCallback = Box<dyn Fn() + Send + Sync>;

/// Mouse/keyboard injection and hotkey registration
pub trait InputPort: Send {
    /// Left click at global screen coordinates
    fn click(&mut self, at: Coordinates) -> Result<()>;

    fn move_to(&mut self, at: Coordinates) -> Result<()>;

    /// Tap a named key (`"esc"`, `"enter"`, a single character...)
    fn press_key(&mut self, key: &str) -> Result<()>;

    /// Bind `callback` to `key`. Callbacks run on the adapter's own thread.
    fn register_hotkey(&mut self, key: &str, callback: HotkeyCallback) -> Result<()>;

    fn unregister_all_hotkeys(&mut self);
}

/// Pick the input adapter for this platform
pub fn create_input(dry_run: bool) -> Box<dyn InputPort> {
    if dry_run {
        info!("Dry run: clicks and key presses are logged, not sent");
        return Box::new(DryRunInput::new());
    }
    #[cfg(windows)]
    {
        Box::new(WindowsInput::new())
    }
    #[cfg(not(windows))]
    {
        warn!("Input injection is only available on Windows, falling back to dry run");
        Box::new(DryRunInput::new())
    }
}

/// Hotkey callbacks keyed by lower-cased key name, shared with a listener thread
#[derive(Clone, Default)]
pub(crate) struct HotkeyTable {
    callbacks: Arc<Mutex<HashMap<String, Arc<dyn Fn() + Send + Sync>>>>,
}

impl HotkeyTable {
    pub fn insert(&self, key: &str, callback: HotkeyCallback) {
        self.lock().insert(key.to_lowercase(), Arc::from(callback));
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Run the callback bound to `key`, if any. The table is unlocked while
    /// the callback runs.
    pub fn dispatch(&self, key: &str) -> bool {
        let callback = self.lock().get(key).cloned();
        match callback {
            Some(cb) => {
                cb();
                true
            }
            None => false,
        }
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, Arc<dyn Fn() + Send + Sync>>> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background thread that watches for hotkeys until shut down
pub(crate) struct Listener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Listener {
    pub fn spawn<F>(name: &str, body: F) -> Result<Self>
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = stop.clone();
        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(stop_clone))?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Hotkey listener panicked");
            }
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.shutdown();
    }
}
