use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{Coordinates, Profile, ProfileNotFound, Region};

/// Source of resolution profiles
pub trait ConfigPort {
    /// Name of the profile selected in the store
    fn current_profile_name(&self) -> String;

    /// Load a profile by name. Fails with [`ProfileNotFound`] for unknown names.
    fn load_profile(&self, name: &str) -> Result<Profile>;

    fn list_profiles(&self) -> Vec<String>;

    /// Insert or replace a profile and persist the store
    fn save_profile(&mut self, profile: &Profile) -> Result<()>;
}

const DEFAULT_PROFILE: &str = "1080p";

/// Raw config.json file format. Profiles stay as raw JSON until loaded so
/// one malformed entry doesn't take the others down with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default = "default_profile_name")]
    current_profile: String,
    #[serde(default)]
    profiles: BTreeMap<String, serde_json::Value>,
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfileEntry {
    #[serde(default)]
    desc: String,
    #[serde(default)]
    actions: BTreeMap<String, [i32; 2]>,
    #[serde(default)]
    rois: BTreeMap<String, RoiEntry>,
}

/// A ROI is stored either as one `[l, t, w, h]` rectangle or a list of them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RoiEntry {
    One([i32; 4]),
    Many(Vec<[i32; 4]>),
}

impl RoiEntry {
    fn into_regions(self) -> Vec<Region> {
        match self {
            RoiEntry::One(r) => vec![rect_to_region(r)],
            RoiEntry::Many(rs) => rs.into_iter().map(rect_to_region).collect(),
        }
    }

    fn from_regions(regions: &[Region]) -> Self {
        match regions {
            [single] => RoiEntry::One(region_to_rect(single)),
            many => RoiEntry::Many(many.iter().map(region_to_rect).collect()),
        }
    }
}

fn rect_to_region(r: [i32; 4]) -> Region {
    Region::new(r[0], r[1], r[2], r[3])
}

fn region_to_rect(r: &Region) -> [i32; 4] {
    [r.left, r.top, r.width, r.height]
}

impl ProfileEntry {
    fn to_profile(&self, name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            description: self.desc.clone(),
            actions: self
                .actions
                .iter()
                .map(|(k, [x, y])| (k.clone(), Coordinates::new(*x, *y)))
                .collect(),
            rois: self
                .rois
                .iter()
                .map(|(k, v)| (k.clone(), v.clone().into_regions()))
                .collect(),
        }
    }

    fn from_profile(profile: &Profile) -> Self {
        Self {
            desc: profile.description.clone(),
            actions: profile
                .actions
                .iter()
                .map(|(k, c)| (k.clone(), [c.x, c.y]))
                .collect(),
            rois: profile
                .rois
                .iter()
                .map(|(k, v)| (k.clone(), RoiEntry::from_regions(v)))
                .collect(),
        }
    }
}

impl ProfileEntry {
    fn parse(name: &str, value: &serde_json::Value) -> Result<Self> {
        ProfileEntry::deserialize(value).with_context(|| format!("Profile '{}' is malformed", name))
    }

    fn to_value(profile: &Profile) -> Result<serde_json::Value> {
        serde_json::to_value(Self::from_profile(profile))
            .with_context(|| format!("Failed to serialize profile '{}'", profile.name))
    }
}

impl ConfigFile {
    fn with_default_profile() -> Result<Self> {
        let profile = Profile::default_1080p();
        let mut profiles = BTreeMap::new();
        profiles.insert(profile.name.clone(), ProfileEntry::to_value(&profile)?);
        Ok(Self {
            current_profile: profile.name,
            profiles,
        })
    }
}

/// Profile store backed by a single JSON file
#[derive(Debug)]
pub struct JsonProfileStore {
    path: PathBuf,
    config: ConfigFile,
}

impl JsonProfileStore {
    /// Open the store at `path`, writing a default 1080p profile if the file does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Creating default config at {}", path.display());
            let store = Self {
                path: path.to_path_buf(),
                config: ConfigFile::with_default_profile()?,
            };
            store.persist()?;
            return Ok(store);
        }

        let config = match read_config(path) {
            Ok(c) => {
                tracing::info!("Loaded configuration from {}", path.display());
                c
            }
            Err(e) => {
                tracing::error!("Failed to load config: {:#}", e);
                ConfigFile::with_default_profile()?
            }
        };
        for (name, value) in &config.profiles {
            if let Err(e) = ProfileEntry::parse(name, value) {
                tracing::warn!("{:#}; it cannot be loaded", e);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let content =
            serde_json::to_string_pretty(&self.config).context("Failed to serialize config")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

fn read_config(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

impl ConfigPort for JsonProfileStore {
    fn current_profile_name(&self) -> String {
        self.config.current_profile.clone()
    }

    fn load_profile(&self, name: &str) -> Result<Profile> {
        let value = self.config.profiles.get(name).ok_or_else(|| ProfileNotFound {
            profile_name: name.to_string(),
        })?;
        Ok(ProfileEntry::parse(name, value)?.to_profile(name))
    }

    fn list_profiles(&self) -> Vec<String> {
        self.config.profiles.keys().cloned().collect()
    }

    fn save_profile(&mut self, profile: &Profile) -> Result<()> {
        let value = ProfileEntry::to_value(profile)?;
        self.config.profiles.insert(profile.name.clone(), value);
        self.persist()?;
        tracing::info!("Saved profile: {}", profile.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{actions, rois};

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("farm_data_test_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_open_creates_default() {
        let path = scratch_path("fresh/config.json");
        let _ = std::fs::remove_file(&path);

        let store = JsonProfileStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.current_profile_name(), "1080p");
        assert_eq!(store.list_profiles(), vec!["1080p".to_string()]);

        let profile = store.load_profile("1080p").unwrap();
        assert_eq!(profile, Profile::default_1080p());
    }

    #[test]
    fn test_unknown_profile_is_typed_error() {
        let path = scratch_path("unknown/config.json");
        let _ = std::fs::remove_file(&path);
        let store = JsonProfileStore::open(&path).unwrap();

        let err = store.load_profile("4k").unwrap_err();
        let not_found = err.downcast_ref::<ProfileNotFound>().unwrap();
        assert_eq!(not_found.profile_name, "4k");
    }

    #[test]
    fn test_single_and_list_rois_parse() {
        let path = scratch_path("mixed/config.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{
                "current_profile": "laptop",
                "profiles": {
                    "laptop": {
                        "desc": "1366x768",
                        "actions": { "skip_slot_1": [500, 600] },
                        "rois": {
                            "skip_slots_1": [1, 2, 3, 4],
                            "the_soul": [[10, 20, 30, 40], [50, 60, 70, 80]],
                            "unused": []
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let store = JsonProfileStore::open(&path).unwrap();
        let profile = store.load_profile(&store.current_profile_name()).unwrap();
        assert_eq!(profile.description, "1366x768");
        assert_eq!(
            profile.action(actions::SKIP_SLOT_1),
            Some(Coordinates::new(500, 600))
        );
        assert_eq!(profile.rois(rois::SKIP_SLOTS_1), &[Region::new(1, 2, 3, 4)]);
        assert_eq!(profile.rois(rois::THE_SOUL).len(), 2);
        assert_eq!(profile.rois(rois::THE_SOUL)[1], Region::new(50, 60, 70, 80));
        assert!(profile.rois("unused").is_empty());
    }

    #[test]
    fn test_save_profile_persists() {
        let path = scratch_path("save/config.json");
        let _ = std::fs::remove_file(&path);
        let mut store = JsonProfileStore::open(&path).unwrap();

        let custom = Profile::new("1440p", "QHD")
            .with_action(actions::SKIP_SLOT_2, Coordinates::new(1420, 1130))
            .with_rois(rois::SKIP_SLOTS_2, vec![Region::new(1210, 1136, 354, 144)]);
        store.save_profile(&custom).unwrap();

        let reopened = JsonProfileStore::open(&path).unwrap();
        assert_eq!(reopened.list_profiles().len(), 2);
        assert_eq!(reopened.load_profile("1440p").unwrap(), custom);

        // Single-region ROIs are written back as a flat rectangle
        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            json["profiles"]["1440p"]["rois"]["skip_slots_2"],
            serde_json::json!([1210, 1136, 354, 144])
        );
    }

    #[test]
    fn test_malformed_profile_leaves_others_loadable() {
        let path = scratch_path("partial/config.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{
                "current_profile": "good",
                "profiles": {
                    "good": { "desc": "ok", "actions": { "skip_slot_1": [715, 850] } },
                    "bad": { "desc": "floats", "actions": { "skip_slot_1": [715.5, 850.0] } }
                }
            }"#,
        )
        .unwrap();

        let mut store = JsonProfileStore::open(&path).unwrap();
        assert_eq!(store.list_profiles(), vec!["bad".to_string(), "good".to_string()]);
        let good = store.load_profile("good").unwrap();
        assert_eq!(good.action(actions::SKIP_SLOT_1), Some(Coordinates::new(715, 850)));

        let err = store.load_profile("bad").unwrap_err();
        assert!(err.downcast_ref::<ProfileNotFound>().is_none());
        assert!(format!("{:#}", err).contains("Profile 'bad' is malformed"));

        // Saving another profile keeps the malformed entry on disk untouched
        store.save_profile(&Profile::new("extra", "")).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["profiles"]["bad"]["actions"]["skip_slot_1"][0], 715.5);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let path = scratch_path("corrupt/config.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonProfileStore::open(&path).unwrap();
        assert!(store.load_profile("1080p").is_ok());
    }
}
