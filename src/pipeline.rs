use anyhow::Result;
use farm_advisor::{decide, describe, Decision, DecisionContext};
use farm_data::Profile;
use farm_state::{Phase, RunSnapshot, RunState};
use farm_vision::{scan_slots, ScreenPort};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::commands::{ActionSequencer, SequenceReport, Timings};
use crate::input::InputPort;

/// Keys bound to the three control hotkeys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyBindings {
    pub start: String,
    pub pause: String,
    pub stop: String,
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self {
            start: "p".into(),
            pause: "m".into(),
            stop: "l".into(),
        }
    }
}

/// Totals logged when the session ends
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub runs: u64,
    pub souls_found: u64,
    pub elapsed_secs: f64,
    pub resets_per_hour: f64,
}

impl SessionSummary {
    pub fn new(snapshot: &RunSnapshot, elapsed: Duration) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let resets_per_hour = if elapsed_secs > 0.0 {
            snapshot.run_count as f64 * 3600.0 / elapsed_secs
        } else {
            0.0
        };
        Self {
            runs: snapshot.run_count,
            souls_found: snapshot.souls_found,
            elapsed_secs,
            resets_per_hour,
        }
    }
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} runs, {} souls found in {:.0}s ({:.1} resets/hour)",
            self.runs, self.souls_found, self.elapsed_secs, self.resets_per_hour
        )
    }
}

/// Owns the ports and drives the scan → decide → act → reset loop
pub struct Pipeline {
    input: Box<dyn InputPort>,
    screen: Box<dyn ScreenPort>,
    profile: Profile,
    timings: Timings,
    hotkeys: HotkeyBindings,
    state: Arc<RunState>,
}

impl Pipeline {
    pub fn new(
        input: Box<dyn InputPort>,
        screen: Box<dyn ScreenPort>,
        profile: Profile,
        state: Arc<RunState>,
    ) -> Self {
        Self {
            input,
            screen,
            profile,
            timings: Timings::default(),
            hotkeys: HotkeyBindings::default(),
            state,
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_hotkeys(mut self, hotkeys: HotkeyBindings) -> Self {
        self.hotkeys = hotkeys;
        self
    }

    pub fn state(&self) -> &Arc<RunState> {
        &self.state
    }

    /// Replace any existing bindings with the start/pause/stop hotkeys.
    /// Callbacks only flip the shared state; the loop reports the change.
    pub fn bind_hotkeys(&mut self) -> Result<()> {
        self.input.unregister_all_hotkeys();

        let state = self.state.clone();
        self.input.register_hotkey(
            &self.hotkeys.start,
            Box::new(move || {
                state.start();
            }),
        )?;
        let state = self.state.clone();
        self.input.register_hotkey(
            &self.hotkeys.pause,
            Box::new(move || {
                state.pause();
            }),
        )?;
        let state = self.state.clone();
        self.input.register_hotkey(
            &self.hotkeys.stop,
            Box::new(move || {
                state.stop();
            }),
        )?;
        Ok(())
    }

    /// Scan both blind slots and pick what to do about them
    pub fn scan_and_decide(&mut self) -> Decision {
        let scan = scan_slots(self.screen.as_mut(), &self.profile);
        let ctx = DecisionContext::from_detections(&scan.doubles, &scan.charms);
        let decision = decide(&ctx);
        if decision != Decision::None {
            info!("DECISION: {}", describe(decision, &ctx));
        }
        decision
    }

    /// One full farming iteration: scan, decide, act, then start a new game.
    /// A pause or stop arriving midway lets the iteration finish.
    pub fn run_iteration(&mut self) -> Result<SequenceReport> {
        self.state.enter(Phase::Scanning);
        let decision = self.scan_and_decide();

        let mut sequencer = ActionSequencer::new(
            self.input.as_mut(),
            self.screen.as_mut(),
            &self.profile,
            &self.timings,
            &self.state,
        );
        self.state.enter(Phase::Acting);
        sequencer.execute(decision)?;
        self.state.enter(Phase::Resetting);
        sequencer.new_round()?;
        Ok(sequencer.finish())
    }

    /// Farm until stopped. Iteration errors are logged and retried after a
    /// backoff; hotkeys are unregistered on the way out.
    pub fn run(&mut self) -> Result<SessionSummary> {
        info!(
            "Profile: {} - {}",
            self.profile.name, self.profile.description
        );
        self.bind_hotkeys()?;
        info!(
            "Ready. Press '{}' to start/resume, '{}' to pause, '{}' to exit",
            self.hotkeys.start, self.hotkeys.pause, self.hotkeys.stop
        );

        let started = Instant::now();
        let mut was_farming = false;

        while self.state.is_running() {
            let farming = self.state.is_farming();
            if farming != was_farming {
                if farming {
                    info!("Farming started");
                } else {
                    info!("Farming paused");
                }
                was_farming = farming;
            }

            if !farming {
                std::thread::sleep(self.timings.idle_poll);
                continue;
            }

            match self.run_iteration() {
                Ok(report) => {
                    if !report.missing_actions.is_empty() {
                        debug!(
                            "Skipped actions missing from profile '{}': {}",
                            self.profile.name,
                            report.missing_actions.join(", ")
                        );
                    }
                }
                Err(e) => {
                    error!("Error in farming loop: {:#}", e);
                    std::thread::sleep(self.timings.error_backoff);
                }
            }
        }

        info!("Stopping");
        self.input.unregister_all_hotkeys();

        let summary = SessionSummary::new(&self.state.snapshot(), started.elapsed());
        info!("Session summary: {}", summary);
        Ok(summary)
    }
}
