use farm_data::Detection;
use serde::{Deserialize, Serialize};

/// Which blind-slot tags are on screen this iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub double_in_slot1: bool,
    pub charm_in_slot1: bool,
    pub charm_in_slot2: bool,
}

impl DecisionContext {
    /// Collapse raw detections into the three booleans the rules look at.
    /// A double tag in slot 2 is not a signal and is ignored.
    pub fn from_detections(doubles: &[Detection], charms: &[Detection]) -> Self {
        Self {
            double_in_slot1: doubles.iter().any(|d| d.slot == 1),
            charm_in_slot1: charms.iter().any(|d| d.slot == 1),
            charm_in_slot2: charms.iter().any(|d| d.slot == 2),
        }
    }
}

/// Action sequence to run for the current blind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    None,
    SkipSlot1,
    SkipSlot2,
    SkipBothSlots,
}

/// Pick the sequence for `ctx`. Rules are checked in priority order and the
/// first match wins; a double tag on its own never triggers anything.
pub fn decide(ctx: &DecisionContext) -> Decision {
    let double_and_charm = ctx.double_in_slot1 && ctx.charm_in_slot2;
    let charm_and_charm = ctx.charm_in_slot1 && ctx.charm_in_slot2;

    if double_and_charm || charm_and_charm {
        Decision::SkipBothSlots
    } else if ctx.charm_in_slot1 {
        Decision::SkipSlot1
    } else if ctx.charm_in_slot2 {
        Decision::SkipSlot2
    } else {
        Decision::None
    }
}

/// Human-readable reason for `decision`, as written after `DECISION:` in the log.
///
/// `SkipBothSlots` is reached by two different rules; the wording tells them
/// apart so the log can be mined per rule afterwards.
pub fn describe(decision: Decision, ctx: &DecisionContext) -> &'static str {
    match decision {
        Decision::None => "No action",
        Decision::SkipSlot1 => "Skip for charm (slot 1)",
        Decision::SkipSlot2 => "Skip for charm (slot 2)",
        Decision::SkipBothSlots if ctx.double_in_slot1 && ctx.charm_in_slot2 => {
            "Skip for double and charm"
        }
        Decision::SkipBothSlots => "Skip for charm and charm",
    }
}
