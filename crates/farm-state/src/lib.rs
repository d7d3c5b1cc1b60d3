use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Where the farming loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Scanning,
    Acting,
    Resetting,
}

// Control word values. Running/farming/phase are packed into one byte so
// `farming => running` and `!farming => Idle` can never be observed broken.
const STOPPED: u8 = 0;
const IDLE: u8 = 1;
const SCANNING: u8 = 2;
const ACTING: u8 = 3;
const RESETTING: u8 = 4;

fn phase_code(phase: Phase) -> u8 {
    match phase {
        Phase::Idle => IDLE,
        Phase::Scanning => SCANNING,
        Phase::Acting => ACTING,
        Phase::Resetting => RESETTING,
    }
}

/// Point-in-time copy of the automation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub is_running: bool,
    pub is_farming: bool,
    pub phase: Phase,
    pub run_count: u64,
    pub souls_found: u64,
}

/// Automation state shared between the farming loop and the hotkey thread.
///
/// Every mutator is a single lock-free atomic update, so the hotkey
/// callbacks can call `start`/`pause`/`stop` from any thread.
#[derive(Debug)]
pub struct RunState {
    control: AtomicU8,
    run_count: AtomicU64,
    souls_found: AtomicU64,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    /// Running but not farming
    pub fn new() -> Self {
        Self {
            control: AtomicU8::new(IDLE),
            run_count: AtomicU64::new(0),
            souls_found: AtomicU64::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.control.load(Ordering::Acquire) != STOPPED
    }

    pub fn is_farming(&self) -> bool {
        self.control.load(Ordering::Acquire) >= SCANNING
    }

    pub fn phase(&self) -> Phase {
        match self.control.load(Ordering::Acquire) {
            SCANNING => Phase::Scanning,
            ACTING => Phase::Acting,
            RESETTING => Phase::Resetting,
            _ => Phase::Idle,
        }
    }

    /// Resume farming. No-op unless idle. Returns whether the state changed.
    pub fn start(&self) -> bool {
        self.control
            .compare_exchange(IDLE, SCANNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Pause farming. No-op unless farming. Returns whether the state changed.
    pub fn pause(&self) -> bool {
        self.control
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
                (c >= SCANNING).then_some(IDLE)
            })
            .is_ok()
    }

    /// Stop the automation for good. Returns whether it was still running.
    pub fn stop(&self) -> bool {
        self.control.swap(STOPPED, Ordering::AcqRel) != STOPPED
    }

    /// Move the loop to `phase`, only while farming. A pause or stop that
    /// landed in between wins, and `false` is returned.
    pub fn enter(&self, phase: Phase) -> bool {
        if phase == Phase::Idle {
            return self.pause();
        }
        let code = phase_code(phase);
        self.control
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
                (c >= SCANNING).then_some(code)
            })
            .is_ok()
    }

    /// Record a finished game reset; returns the new count
    pub fn increment_run(&self) -> u64 {
        self.run_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Record a picked-up reward card; returns the new count
    pub fn record_soul_found(&self) -> u64 {
        self.souls_found.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn run_count(&self) -> u64 {
        self.run_count.load(Ordering::Acquire)
    }

    pub fn souls_found(&self) -> u64 {
        self.souls_found.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> RunSnapshot {
        let control = self.control.load(Ordering::Acquire);
        RunSnapshot {
            is_running: control != STOPPED,
            is_farming: control >= SCANNING,
            phase: self.phase(),
            run_count: self.run_count(),
            souls_found: self.souls_found(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn assert_invariants(s: &RunSnapshot) {
        if s.is_farming {
            assert!(s.is_running);
        } else {
            assert_eq!(s.phase, Phase::Idle);
        }
    }

    #[test]
    fn test_initial_state() {
        let state = RunState::new();
        let s = state.snapshot();
        assert!(s.is_running);
        assert!(!s.is_farming);
        assert_eq!(s.phase, Phase::Idle);
        assert_eq!((s.run_count, s.souls_found), (0, 0));
    }

    #[test]
    fn test_start_pause_stop_sequence() {
        let state = RunState::new();
        assert!(state.start());
        assert!(state.is_farming());
        assert_eq!(state.phase(), Phase::Scanning);

        assert!(state.pause());
        assert!(!state.is_farming());
        assert_eq!(state.phase(), Phase::Idle);

        assert!(state.stop());
        let s = state.snapshot();
        assert!(!s.is_running);
        assert!(!s.is_farming);
        assert_eq!(s.phase, Phase::Idle);
    }

    #[test]
    fn test_transitions_are_idempotent() {
        let state = RunState::new();
        let before = state.snapshot();
        assert!(!state.pause());
        assert_eq!(state.snapshot(), before);

        state.start();
        state.enter(Phase::Acting);
        assert!(!state.start());
        assert_eq!(state.phase(), Phase::Acting);

        assert!(state.stop());
        assert!(!state.stop());
    }

    #[test]
    fn test_stop_is_terminal() {
        let state = RunState::new();
        state.start();
        state.stop();
        assert!(!state.start());
        assert!(!state.enter(Phase::Scanning));
        assert!(!state.is_running());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_enter_respects_pause() {
        let state = RunState::new();
        assert!(!state.enter(Phase::Acting));
        assert_eq!(state.phase(), Phase::Idle);

        state.start();
        assert!(state.enter(Phase::Acting));
        assert!(state.enter(Phase::Resetting));
        assert_eq!(state.phase(), Phase::Resetting);
        state.pause();
        assert!(!state.enter(Phase::Scanning));
        assert_invariants(&state.snapshot());
    }

    #[test]
    fn test_counters() {
        let state = RunState::new();
        assert_eq!(state.increment_run(), 1);
        assert_eq!(state.increment_run(), 2);
        assert_eq!(state.record_soul_found(), 1);
        let s = state.snapshot();
        assert_eq!((s.run_count, s.souls_found), (2, 1));
    }

    #[test]
    fn test_concurrent_toggling_keeps_invariants() {
        let state = Arc::new(RunState::new());
        let togglers: Vec<_> = (0..4)
            .map(|i| {
                let state = state.clone();
                std::thread::spawn(move || {
                    for _ in 0..2000 {
                        if i % 2 == 0 {
                            state.start();
                        } else {
                            state.pause();
                        }
                    }
                })
            })
            .collect();

        for _ in 0..2000 {
            state.enter(Phase::Acting);
            assert_invariants(&state.snapshot());
            state.enter(Phase::Resetting);
        }
        for t in togglers {
            t.join().unwrap();
        }
        assert!(state.is_running());
    }
}
