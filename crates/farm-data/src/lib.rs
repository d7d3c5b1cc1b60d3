mod geometry;
pub mod profile;
mod store;

pub use geometry::{Coordinates, Region};
pub use profile::{Profile, ProfileNotFound};
pub use store::{ConfigPort, JsonProfileStore};

use serde::{Deserialize, Serialize};

/// One accepted template match, in screen coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub template_id: String,
    /// Center of the matched area
    pub position: Coordinates,
    pub confidence: f64,
    /// 0 = unassigned, 1/2 = blind slot, 1..N = reward ROI index
    pub slot: u32,
}

impl std::fmt::Display for Detection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | Slot {} | Conf: {:.2} | Pos: {}",
            self.template_id, self.slot, self.confidence, self.position
        )
    }
}
