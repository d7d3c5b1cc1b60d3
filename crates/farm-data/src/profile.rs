use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Coordinates, Region};

/// Action names the farming sequences click through
pub mod actions {
    pub const SKIP_SLOT_1: &str = "skip_slot_1";
    pub const SKIP_SLOT_2: &str = "skip_slot_2";
    pub const PACKAGE_SPECIALIZED_SKIP: &str = "package_specialized_skip";
    pub const NEW_GAME_TOP: &str = "new_game_top";
    pub const NEW_GAME_CONFIRM: &str = "new_game_confirm";
}

/// ROI names scanned for tags and for the reward card
pub mod rois {
    pub const SKIP_SLOTS_1: &str = "skip_slots_1";
    pub const SKIP_SLOTS_2: &str = "skip_slots_2";
    pub const THE_SOUL: &str = "the_soul";
}

/// Resolution-specific bundle of click targets and scan regions.
/// Loaded once per session and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub description: String,
    pub actions: HashMap<String, Coordinates>,
    pub rois: HashMap<String, Vec<Region>>,
}

impl Profile {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_action(mut self, name: &str, coords: Coordinates) -> Self {
        self.actions.insert(name.to_string(), coords);
        self
    }

    pub fn with_rois(mut self, name: &str, regions: Vec<Region>) -> Self {
        self.rois.insert(name.to_string(), regions);
        self
    }

    /// Click target for a named action
    pub fn action(&self, name: &str) -> Option<Coordinates> {
        self.actions.get(name).copied()
    }

    /// Regions registered under `name`, in file order. Unknown names yield an empty slice.
    pub fn rois(&self, name: &str) -> &[Region] {
        self.rois.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Standard Full HD layout, written out when no profile store exists yet
    pub fn default_1080p() -> Self {
        Self::new("1080p", "Standard Full HD (1920x1080)")
            .with_action(actions::SKIP_SLOT_1, Coordinates::new(715, 850))
            .with_action(actions::SKIP_SLOT_2, Coordinates::new(1070, 850))
            .with_action(
                actions::PACKAGE_SPECIALIZED_SKIP,
                Coordinates::new(1335, 975),
            )
            .with_action(actions::NEW_GAME_TOP, Coordinates::new(955, 355))
            .with_action(actions::NEW_GAME_CONFIRM, Coordinates::new(955, 830))
            .with_rois(rois::SKIP_SLOTS_1, vec![Region::new(543, 784, 296, 153)])
            .with_rois(rois::SKIP_SLOTS_2, vec![Region::new(910, 852, 266, 108)])
            .with_rois(
                rois::THE_SOUL,
                vec![
                    Region::new(613, 651, 174, 241),
                    Region::new(786, 657, 173, 236),
                    Region::new(958, 652, 171, 247),
                    Region::new(1130, 655, 168, 236),
                    Region::new(1303, 654, 167, 236),
                ],
            )
    }
}

/// Requested profile is absent from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileNotFound {
    pub profile_name: String,
}

impl std::fmt::Display for ProfileNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Profile '{}' not found in configuration",
            self.profile_name
        )
    }
}

impl std::error::Error for ProfileNotFound {}
