use farm_data::profile::rois;
use farm_data::{Detection, Profile, Region};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::screen::ScreenPort;
use crate::templates;

/// Tag detections from both blind slots, grouped by template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotScan {
    pub doubles: Vec<Detection>,
    pub charms: Vec<Detection>,
}

impl SlotScan {
    /// Labels of the signals present, e.g. `["Double(Slot1)", "Charm(Slot2)"]`
    pub fn summary(&self) -> Vec<&'static str> {
        let mut found = Vec::new();
        if self.doubles.iter().any(|d| d.slot == 1) {
            found.push("Double(Slot1)");
        }
        if self.charms.iter().any(|d| d.slot == 1) {
            found.push("Charm(Slot1)");
        }
        if self.charms.iter().any(|d| d.slot == 2) {
            found.push("Charm(Slot2)");
        }
        found
    }
}

/// Capture `region` and match one template in it.
/// Capture failures are logged and treated as "nothing found".
pub fn scan_region(
    screen: &mut dyn ScreenPort,
    template_id: &str,
    region: &Region,
    slot: u32,
) -> Vec<Detection> {
    match screen.capture_roi(region) {
        Ok((image, origin)) => screen.match_template(&image, template_id, None, slot, Some(origin)),
        Err(e) => {
            warn!("Capture of {} failed: {:#}", region, e);
            Vec::new()
        }
    }
}

/// Scan the blind-slot ROIs for the double and charm tags
pub fn scan_slots(screen: &mut dyn ScreenPort, profile: &Profile) -> SlotScan {
    let mut scan = SlotScan::default();

    for (slot, roi_name) in [(1, rois::SKIP_SLOTS_1), (2, rois::SKIP_SLOTS_2)] {
        for roi in profile.rois(roi_name) {
            debug!("Scanning Slot {} ROI: {}", slot, roi);
            let (image, origin) = match screen.capture_roi(roi) {
                Ok(captured) => captured,
                Err(e) => {
                    warn!("Capture of slot {} ROI {} failed: {:#}", slot, roi, e);
                    continue;
                }
            };
            let offset = Some(origin);
            scan.doubles
                .extend(screen.match_template(&image, templates::DOUBLE, None, slot, offset));
            scan.charms
                .extend(screen.match_template(&image, templates::CHARM, None, slot, offset));
        }
    }

    let summary = scan.summary();
    if !summary.is_empty() {
        info!("SCAN_RESULT: detected {}", summary.join(", "));
    }

    scan
}

/// Look for the reward card in the pack, one card position at a time.
/// The first position with any match wins; its strongest detection is returned.
pub fn scan_for_reward(screen: &mut dyn ScreenPort, profile: &Profile) -> Option<Detection> {
    for (i, roi) in profile.rois(rois::THE_SOUL).iter().enumerate() {
        debug!("Scanning Soul ROI {}: {}", i + 1, roi);
        let matches = scan_region(screen, templates::THE_SOUL, roi, i as u32 + 1);
        if let Some(best) = matches
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        {
            return Some(best);
        }
    }
    None
}
