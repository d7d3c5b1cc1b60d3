use farm_data::{Coordinates, Detection};
use image::RgbaImage;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::matcher::{self, Candidate, Template};
use crate::templates;

/// Two accepted matches are never closer than this in both axes
pub const NMS_RADIUS: u32 = 10;

/// Threshold used when the caller does not override it
pub fn default_threshold(template_id: &str) -> f64 {
    match template_id {
        templates::THE_SOUL => 0.65,
        templates::DOUBLE | templates::CHARM => 0.90,
        _ => 0.80,
    }
}

/// Template image could not be read from the assets directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNotFound {
    pub template_id: String,
    pub path: PathBuf,
}

impl std::fmt::Display for AssetNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Asset '{}' not found at path: {}",
            self.template_id,
            self.path.display()
        )
    }
}

impl std::error::Error for AssetNotFound {}

/// Finds template occurrences in captured images.
/// Owns the template cache: each template is read from disk on first use and kept
/// for the scanner's lifetime.
pub struct MatchScanner {
    assets_dir: PathBuf,
    cache: HashMap<String, Template>,
}

impl MatchScanner {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            cache: HashMap::new(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Register an already decoded template under its id
    pub fn insert_template(&mut self, template: Template) {
        self.cache.insert(template.id.clone(), template);
    }

    /// Cached template for `template_id`, loading `<assets_dir>/<template_id>` on first use
    pub fn load_template(&mut self, template_id: &str) -> Result<&Template, AssetNotFound> {
        match self.cache.entry(template_id.to_string()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let path = self.assets_dir.join(template_id);
                let img = image::open(&path).map_err(|err| {
                    debug!("Failed to open {}: {}", path.display(), err);
                    AssetNotFound {
                        template_id: template_id.to_string(),
                        path: path.clone(),
                    }
                })?;
                let template = Template::from_gray(template_id, &img.to_luma8());
                debug!(
                    "Loaded and cached asset: {} ({}x{})",
                    template_id,
                    template.width(),
                    template.height()
                );
                Ok(e.insert(template))
            }
        }
    }

    /// Find every occurrence of a template in `image`.
    ///
    /// Results are stamped with `slot`, translated by `offset` (the origin of the
    /// captured sub-region) and ordered by descending confidence. Near-duplicates
    /// are suppressed. A template that cannot be loaded yields no detections.
    pub fn find(
        &mut self,
        image: &RgbaImage,
        template_id: &str,
        threshold: Option<f64>,
        slot: u32,
        offset: Option<Coordinates>,
    ) -> Vec<Detection> {
        let template = match self.load_template(template_id) {
            Ok(t) => t,
            Err(e) => {
                error!("Could not load asset: {} ({})", template_id, e);
                return Vec::new();
            }
        };

        let threshold = threshold.unwrap_or_else(|| default_threshold(template_id));
        let gray = image::imageops::grayscale(image);
        let Some(scores) = matcher::match_template(&gray, template) else {
            debug!(
                "Image {}x{} is smaller than template {}",
                gray.width(),
                gray.height(),
                template_id
            );
            return Vec::new();
        };

        let half_w = (template.width() / 2) as i32;
        let half_h = (template.height() / 2) as i32;
        let offset = offset.unwrap_or_default();

        suppress_near_duplicates(scores.candidates(threshold))
            .into_iter()
            .map(|c| {
                let position = Coordinates::new(c.x as i32 + half_w, c.y as i32 + half_h)
                    .offset(offset.x, offset.y);
                let detection = Detection {
                    template_id: template_id.to_string(),
                    position,
                    confidence: c.score as f64,
                    slot,
                };
                info!("Found {}", detection);
                detection
            })
            .collect()
    }
}

/// Greedy proximity suppression: strongest candidates first, and a candidate is
/// dropped when it lies within [`NMS_RADIUS`] on both axes of one already kept.
pub fn suppress_near_duplicates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Candidate> = Vec::new();
    for c in candidates {
        let near = kept
            .iter()
            .any(|k| c.x.abs_diff(k.x) < NMS_RADIUS && c.y.abs_diff(k.y) < NMS_RADIUS);
        if !near {
            kept.push(c);
        }
    }
    kept
}
