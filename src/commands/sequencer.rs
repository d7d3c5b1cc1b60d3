use anyhow::Result;
use farm_advisor::Decision;
use farm_data::profile::actions;
use farm_data::Profile;
use farm_state::RunState;
use farm_vision::{scan_for_reward, ScreenPort};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::Timings;
use crate::input::InputPort;

/// What a sequence actually did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    /// Action names the profile has no coordinates for; those steps were skipped
    pub missing_actions: Vec<String>,
    pub rewards_picked: u32,
}

/// Drives the UI through the click sequences for one iteration.
///
/// Missing profile actions are skipped with a warning and recorded in the
/// report; input failures abort the sequence with an error.
pub struct ActionSequencer<'a> {
    input: &'a mut dyn InputPort,
    screen: &'a mut dyn ScreenPort,
    profile: &'a Profile,
    timings: &'a Timings,
    state: &'a RunState,
    report: SequenceReport,
}

impl<'a> ActionSequencer<'a> {
    pub fn new(
        input: &'a mut dyn InputPort,
        screen: &'a mut dyn ScreenPort,
        profile: &'a Profile,
        timings: &'a Timings,
        state: &'a RunState,
    ) -> Self {
        Self {
            input,
            screen,
            profile,
            timings,
            state,
            report: SequenceReport::default(),
        }
    }

    /// Run the click sequence for `decision`
    pub fn execute(&mut self, decision: Decision) -> Result<()> {
        match decision {
            Decision::None => {}
            Decision::SkipSlot1 => {
                self.click_action(actions::SKIP_SLOT_1)?;
                self.pick_up_reward()?;
            }
            Decision::SkipSlot2 => {
                self.click_action(actions::SKIP_SLOT_1)?;
                self.wait(self.timings.action_delay);
                self.click_action(actions::SKIP_SLOT_2)?;
                self.pick_up_reward()?;
            }
            Decision::SkipBothSlots => {
                self.click_action(actions::SKIP_SLOT_1)?;
                self.pick_up_reward()?;

                self.click_action(actions::PACKAGE_SPECIALIZED_SKIP)?;
                self.wait(self.timings.action_delay);

                self.click_action(actions::SKIP_SLOT_2)?;
                self.pick_up_reward()?;
            }
        }
        Ok(())
    }

    /// Look for the reward card in the opened pack and use it.
    /// Returns whether a card was found.
    pub fn pick_up_reward(&mut self) -> Result<bool> {
        self.wait(self.timings.reward_wait);

        let Some(card) = scan_for_reward(&mut *self.screen, self.profile) else {
            debug!("No reward card in pack");
            return Ok(false);
        };

        info!("Selecting SOUL card at {}", card.position);
        self.state.record_soul_found();
        self.report.rewards_picked += 1;

        self.input.click(card.position)?;
        self.wait(self.timings.click_delay);

        let use_button = card.position.offset(0, self.timings.use_button_offset);
        self.input.click(use_button)?;
        self.wait(self.timings.action_delay);

        Ok(true)
    }

    /// Quit to the menu, start a fresh game and park the cursor
    pub fn new_round(&mut self) -> Result<()> {
        self.input.press_key("esc")?;
        self.wait(self.timings.action_delay);

        self.click_action(actions::NEW_GAME_TOP)?;
        self.wait(self.timings.action_delay);

        self.click_action(actions::NEW_GAME_CONFIRM)?;
        self.wait(self.timings.action_delay);

        self.input.move_to(self.timings.park_position)?;
        self.wait(self.timings.reset_delay);

        let runs = self.state.increment_run();
        info!("ACTION: New Game Started");
        debug!("Run {} started", runs);
        Ok(())
    }

    pub fn finish(self) -> SequenceReport {
        self.report
    }

    /// Click a named profile action. A missing action is skipped, not an error.
    fn click_action(&mut self, name: &str) -> Result<bool> {
        let Some(coords) = self.profile.action(name) else {
            warn!("Action '{}' not found in profile", name);
            self.report.missing_actions.push(name.to_string());
            return Ok(false);
        };
        self.input.click(coords)?;
        info!("ACTION: {}", name);
        Ok(true)
    }

    fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
