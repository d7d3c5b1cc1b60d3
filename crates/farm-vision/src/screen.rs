use anyhow::Result;
use farm_data::{Coordinates, Detection, Region};
use image::RgbaImage;
use std::path::PathBuf;

use crate::matcher::Template;
use crate::scanner::{AssetNotFound, MatchScanner};

/// Screen capture and template matching, as seen by the farming loop
pub trait ScreenPort: Send {
    /// Capture the whole screen, or only `region` (global pixel coordinates)
    fn capture(&mut self, region: Option<&Region>) -> Result<RgbaImage>;

    /// Capture `region` and report the global position of the image's top-left
    /// pixel. That is `region.origin()` unless part of the region is off screen.
    fn capture_roi(&mut self, region: &Region) -> Result<(RgbaImage, Coordinates)> {
        Ok((self.capture(Some(region))?, region.origin()))
    }

    /// Find `template_id` in `image`; see [`MatchScanner::find`]
    fn match_template(
        &mut self,
        image: &RgbaImage,
        template_id: &str,
        threshold: Option<f64>,
        slot: u32,
        offset: Option<Coordinates>,
    ) -> Vec<Detection>;

    fn load_template(&mut self, template_id: &str) -> Result<&Template, AssetNotFound>;
}

/// Live screen: captures the game monitor on every call
pub struct DesktopScreen {
    scanner: MatchScanner,
}

impl DesktopScreen {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            scanner: MatchScanner::new(assets_dir),
        }
    }
}

impl ScreenPort for DesktopScreen {
    fn capture(&mut self, region: Option<&Region>) -> Result<RgbaImage> {
        farm_capture::capture_screen(region)
    }

    fn capture_roi(&mut self, region: &Region) -> Result<(RgbaImage, Coordinates)> {
        let (image, covered) = farm_capture::capture_region(region)?;
        Ok((image, covered.origin()))
    }

    fn match_template(
        &mut self,
        image: &RgbaImage,
        template_id: &str,
        threshold: Option<f64>,
        slot: u32,
        offset: Option<Coordinates>,
    ) -> Vec<Detection> {
        self.scanner.find(image, template_id, threshold, slot, offset)
    }

    fn load_template(&mut self, template_id: &str) -> Result<&Template, AssetNotFound> {
        self.scanner.load_template(template_id)
    }
}

/// Still screen: serves crops of one saved screenshot.
/// Used to replay the scans offline against a known frame.
pub struct FrameScreen {
    frame: RgbaImage,
    scanner: MatchScanner,
}

impl FrameScreen {
    pub fn new(frame: RgbaImage, scanner: MatchScanner) -> Self {
        Self { frame, scanner }
    }
}

impl ScreenPort for FrameScreen {
    fn capture(&mut self, region: Option<&Region>) -> Result<RgbaImage> {
        Ok(match region {
            Some(r) => farm_capture::crop_region(&self.frame, r),
            None => self.frame.clone(),
        })
    }

    fn capture_roi(&mut self, region: &Region) -> Result<(RgbaImage, Coordinates)> {
        let covered = farm_capture::clip_region(region, self.frame.width(), self.frame.height());
        Ok((farm_capture::crop_region(&self.frame, region), covered.origin()))
    }

    fn match_template(
        &mut self,
        image: &RgbaImage,
        template_id: &str,
        threshold: Option<f64>,
        slot: u32,
        offset: Option<Coordinates>,
    ) -> Vec<Detection> {
        self.scanner.find(image, template_id, threshold, slot, offset)
    }

    fn load_template(&mut self, template_id: &str) -> Result<&Template, AssetNotFound> {
        self.scanner.load_template(template_id)
    }
}
