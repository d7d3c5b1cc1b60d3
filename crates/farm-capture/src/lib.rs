use anyhow::{Context, Result};
use farm_data::Region;
use image::RgbaImage;
use tracing::{debug, warn};
use xcap::Monitor;

/// Find the monitor the game is displayed on (primary, else the first one reported)
fn find_game_monitor() -> Result<Monitor> {
    let monitors = Monitor::all().context("Failed to enumerate monitors")?;

    let mut fallback = None;
    for monitor in monitors {
        match monitor.is_primary() {
            Ok(true) => return Ok(monitor),
            Ok(false) => {}
            Err(e) => debug!("Could not query monitor: {}", e),
        }
        if fallback.is_none() {
            fallback = Some(monitor);
        }
    }

    if fallback.is_some() {
        warn!("No primary monitor reported, using the first one");
    }
    fallback.context("No monitor available for capture")
}

/// Capture the game monitor, or only `region` of it.
/// `region` is in global screen pixels, the same space profile coordinates use.
pub fn capture_screen(region: Option<&Region>) -> Result<RgbaImage> {
    match region {
        Some(region) => capture_region(region).map(|(image, _)| image),
        None => {
            let monitor = find_game_monitor()?;
            monitor
                .capture_image()
                .context("Failed to capture monitor image")
        }
    }
}

/// Capture `region` of the game monitor.
///
/// Returns the pixels together with the global region they actually cover.
/// Where `region` runs off the monitor the covered region is smaller, and its
/// origin is where pixel (0, 0) of the image sits on screen.
pub fn capture_region(region: &Region) -> Result<(RgbaImage, Region)> {
    let monitor = find_game_monitor()?;
    let frame = monitor
        .capture_image()
        .context("Failed to capture monitor image")?;

    // Profiles use global coordinates; the frame starts at the monitor origin
    let origin_x = monitor.x().unwrap_or(0);
    let origin_y = monitor.y().unwrap_or(0);
    let local = Region::new(
        region.left - origin_x,
        region.top - origin_y,
        region.width,
        region.height,
    );
    let clipped = clip_region(&local, frame.width(), frame.height());
    let covered = Region::new(
        clipped.left + origin_x,
        clipped.top + origin_y,
        clipped.width,
        clipped.height,
    );
    Ok((crop_clipped(&frame, &clipped), covered))
}

/// The part of `region` inside a `width` x `height` frame. Empty when they don't overlap.
pub fn clip_region(region: &Region, width: u32, height: u32) -> Region {
    let (w, h) = (width as i32, height as i32);
    let x0 = region.left.clamp(0, w);
    let y0 = region.top.clamp(0, h);
    let x1 = region.left.saturating_add(region.width).clamp(x0, w);
    let y1 = region.top.saturating_add(region.height).clamp(y0, h);
    Region::new(x0, y0, x1 - x0, y1 - y0)
}

/// Crop a pixel region from a captured frame, clamped to the frame bounds.
/// Use [`clip_region`] to learn where the returned pixels start.
pub fn crop_region(frame: &RgbaImage, region: &Region) -> RgbaImage {
    let clipped = clip_region(region, frame.width(), frame.height());
    crop_clipped(frame, &clipped)
}

fn crop_clipped(frame: &RgbaImage, clipped: &Region) -> RgbaImage {
    image::imageops::crop_imm(
        frame,
        clipped.left as u32,
        clipped.top as u32,
        clipped.width as u32,
        clipped.height as u32,
    )
    .to_image()
}
