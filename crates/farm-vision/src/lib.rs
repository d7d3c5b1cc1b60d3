pub mod matcher;
pub mod scan;
pub mod scanner;
pub mod screen;

pub use matcher::Template;
pub use scan::{scan_for_reward, scan_region, scan_slots, SlotScan};
pub use scanner::{default_threshold, AssetNotFound, MatchScanner};
pub use screen::{DesktopScreen, FrameScreen, ScreenPort};

/// Template file names inside the assets directory
pub mod templates {
    pub const DOUBLE: &str = "double.png";
    pub const CHARM: &str = "charm.png";
    pub const THE_SOUL: &str = "the_soul.png";
}
