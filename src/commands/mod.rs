mod sequencer;

pub use sequencer::{ActionSequencer, SequenceReport};

use farm_data::Coordinates;
use std::time::Duration;

/// Settle delays between UI actions, plus the fixed offsets the sequences use
#[derive(Debug, Clone, PartialEq)]
pub struct Timings {
    /// Wait before scanning the opened pack for the reward card
    pub reward_wait: Duration,
    pub action_delay: Duration,
    /// Wait after selecting a card, before pressing its "use" button
    pub click_delay: Duration,
    pub reset_delay: Duration,
    pub idle_poll: Duration,
    pub error_backoff: Duration,
    /// Vertical distance from a card's center to its "use" button
    pub use_button_offset: i32,
    /// Where the cursor is parked after a reset so it doesn't hover the UI
    pub park_position: Coordinates,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            reward_wait: Duration::from_secs(5),
            action_delay: Duration::from_millis(500),
            click_delay: Duration::from_millis(1500),
            reset_delay: Duration::from_secs(3),
            idle_poll: Duration::from_millis(100),
            error_backoff: Duration::from_secs(1),
            use_button_offset: 100,
            park_position: Coordinates::new(5, 5),
        }
    }
}

impl Timings {
    /// Same offsets, no settle delays. The idle poll stays short but nonzero.
    pub fn instant() -> Self {
        Self {
            reward_wait: Duration::ZERO,
            action_delay: Duration::ZERO,
            click_delay: Duration::ZERO,
            reset_delay: Duration::ZERO,
            idle_poll: Duration::from_millis(1),
            error_backoff: Duration::ZERO,
            ..Self::default()
        }
    }
}
