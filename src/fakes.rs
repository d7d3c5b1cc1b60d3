//! In-memory ports for exercising the sequencer and the run loop

use anyhow::Result;
use farm_data::{Coordinates, Detection, Region};
use farm_state::RunState;
use farm_vision::{AssetNotFound, ScreenPort, Template};
use image::RgbaImage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::input::{HotkeyCallback, InputPort};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Click(Coordinates),
    Move(Coordinates),
    Key(String),
}

/// Records every action; clones share the same recording
#[derive(Clone, Default)]
pub struct FakeInput {
    events: Arc<Mutex<Vec<InputEvent>>>,
    hotkeys: Arc<Mutex<HashMap<String, HotkeyCallback>>>,
    unregister_calls: Arc<AtomicUsize>,
    failing_clicks: Arc<AtomicUsize>,
    stop_on_move: Option<Arc<RunState>>,
}

impl FakeInput {
    /// Stop `state` whenever the cursor is parked, ending the run loop after one reset
    pub fn stopping_on_move(state: Arc<RunState>) -> Self {
        Self {
            stop_on_move: Some(state),
            ..Self::default()
        }
    }

    /// Make the next `n` clicks fail
    pub fn fail_clicks(&self, n: usize) {
        self.failing_clicks.store(n, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clicks(&self) -> Vec<Coordinates> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InputEvent::Click(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn hotkeys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.hotkeys.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn unregister_calls(&self) -> usize {
        self.unregister_calls.load(Ordering::SeqCst)
    }

    /// Simulate the user pressing a hotkey
    pub fn trigger(&self, key: &str) {
        let hotkeys = self.hotkeys.lock().unwrap();
        if let Some(cb) = hotkeys.get(key) {
            cb();
        }
    }
}

impl InputPort for FakeInput {
    fn click(&mut self, at: Coordinates) -> Result<()> {
        let failing = self.failing_clicks.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_clicks.store(failing - 1, Ordering::SeqCst);
            anyhow::bail!("click at {} rejected", at);
        }
        self.events.lock().unwrap().push(InputEvent::Click(at));
        Ok(())
    }

    fn move_to(&mut self, at: Coordinates) -> Result<()> {
        self.events.lock().unwrap().push(InputEvent::Move(at));
        if let Some(state) = &self.stop_on_move {
            state.stop();
        }
        Ok(())
    }

    fn press_key(&mut self, key: &str) -> Result<()> {
        self.events.lock().unwrap().push(InputEvent::Key(key.to_string()));
        Ok(())
    }

    fn register_hotkey(&mut self, key: &str, callback: HotkeyCallback) -> Result<()> {
        self.hotkeys.lock().unwrap().insert(key.to_string(), callback);
        Ok(())
    }

    fn unregister_all_hotkeys(&mut self) {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        self.hotkeys.lock().unwrap().clear();
    }
}

/// Serves canned detections keyed by template and captured region
#[derive(Default)]
pub struct FakeScreen {
    hits: HashMap<(String, Region), Vec<Detection>>,
    last: Option<Region>,
    pub captures: usize,
}

impl FakeScreen {
    pub fn hit(mut self, template: &str, region: Region, at: Coordinates) -> Self {
        self.hits.entry((template.to_string(), region)).or_default().push(Detection {
            template_id: template.to_string(),
            position: at,
            confidence: 0.95,
            slot: 0,
        });
        self
    }
}

impl ScreenPort for FakeScreen {
    fn capture(&mut self, region: Option<&Region>) -> Result<RgbaImage> {
        self.captures += 1;
        self.last = region.copied();
        Ok(RgbaImage::new(1, 1))
    }

    fn match_template(
        &mut self,
        _image: &RgbaImage,
        template_id: &str,
        _threshold: Option<f64>,
        slot: u32,
        _offset: Option<Coordinates>,
    ) -> Vec<Detection> {
        let Some(region) = self.last else {
            return Vec::new();
        };
        self.hits
            .get(&(template_id.to_string(), region))
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|d| Detection { slot, ..d })
            .collect()
    }

    fn load_template(&mut self, template_id: &str) -> Result<&Template, AssetNotFound> {
        Err(AssetNotFound {
            template_id: template_id.to_string(),
            path: template_id.into(),
        })
    }
}
