/// Persisted watermark profiles
///
/// Profiles are stored as a flat JSON object mapping profile names to
/// their parameters, in a fixed per-user location. Loading is forgiving
/// (a missing or unreadable file yields an empty collection); saving is
/// strict and reports failures to the caller.
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::WatermarkError;
use crate::state::data::WatermarkProfile;

/// Smallest accepted scale input, in percent of the source width.
pub const MIN_SCALE_PERCENT: u32 = 5;
/// Largest accepted scale input, in percent of the source width.
pub const MAX_SCALE_PERCENT: u32 = 100;
/// Largest accepted margin, in pixels.
pub const MAX_MARGIN: u32 = 500;

/// Check profile parameters before they are persisted or applied.
pub fn validate_params(scale_percent: u32, margin: u32) -> Result<(), WatermarkError> {
    if !(MIN_SCALE_PERCENT..=MAX_SCALE_PERCENT).contains(&scale_percent) {
        return Err(WatermarkError::Config(format!(
            "scale must be between {MIN_SCALE_PERCENT} and {MAX_SCALE_PERCENT} percent, got {scale_percent}"
        )));
    }
    if margin > MAX_MARGIN {
        return Err(WatermarkError::Config(format!(
            "margin must be at most {MAX_MARGIN} pixels, got {margin}"
        )));
    }
    Ok(())
}

/// The named profile collection, backed by a JSON file.
#[derive(Debug)]
pub struct ProfileStore {
    profiles: BTreeMap<String, WatermarkProfile>,
    path: PathBuf,
}

impl ProfileStore {
    /// Load the per-user profile collection from its default location.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load a profile collection from an explicit file path.
    pub fn load_from(path: PathBuf) -> Self {
        let profiles = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(profiles) => profiles,
                Err(e) => {
                    warn!("Ignoring unreadable profile file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Cannot read profile file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self { profiles, path }
    }

    /// Default per-user location of the profile file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .expect("no config or home directory available")
            .join("watermarkable")
            .join("profiles.json")
    }

    /// Names of all stored profiles, sorted.
    pub fn names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&WatermarkProfile> {
        self.profiles.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Add a new profile. Returns `Ok(false)` without persisting when the
    /// name is empty or already taken.
    pub fn create(&mut self, name: &str, profile: WatermarkProfile) -> Result<bool, WatermarkError> {
        let name = name.trim();
        if name.is_empty() || self.profiles.contains_key(name) {
            return Ok(false);
        }
        self.profiles.insert(name.to_owned(), profile);
        self.save()?;
        info!("Created profile '{}'", name);
        Ok(true)
    }

    /// Replace the parameters of an existing profile.
    pub fn update(&mut self, name: &str, profile: WatermarkProfile) -> Result<(), WatermarkError> {
        if let Some(existing) = self.profiles.get_mut(name) {
            *existing = profile;
            self.save()?;
            info!("Updated profile '{}'", name);
        }
        Ok(())
    }

    /// Remove a profile. Removing a name that does not exist is a no-op.
    pub fn delete(&mut self, name: &str) -> Result<(), WatermarkError> {
        if self.profiles.remove(name).is_some() {
            self.save()?;
            info!("Deleted profile '{}'", name);
        }
        Ok(())
    }

    fn save(&self) -> Result<(), WatermarkError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(WatermarkError::Persistence)?;
        }
        let json = serde_json::to_string_pretty(&self.profiles)
            .map_err(|e| WatermarkError::Persistence(e.into()))?;
        fs::write(&self.path, json).map_err(WatermarkError::Persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> WatermarkProfile {
        WatermarkProfile {
            watermark_file: PathBuf::from("/tmp/logo.png"),
            scale: 0.2,
            margin: 10,
        }
    }

    #[test]
    fn round_trips_through_the_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");

        let mut store = ProfileStore::load_from(path.clone());
        assert!(store.create("default", sample_profile()).unwrap());

        let reloaded = ProfileStore::load_from(path);
        assert_eq!(reloaded.get("default"), Some(&sample_profile()));
        assert_eq!(reloaded.names(), vec!["default".to_owned()]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::load_from(dir.path().join("absent.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(&path, "{ not json").unwrap();
        let store = ProfileStore::load_from(path);
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ProfileStore::load_from(dir.path().join("profiles.json"));
        assert!(store.create("default", sample_profile()).unwrap());
        assert!(!store.create("default", sample_profile()).unwrap());
        assert!(!store.create("  default  ", sample_profile()).unwrap());
        assert!(!store.create("", sample_profile()).unwrap());
    }

    #[test]
    fn deleting_a_missing_profile_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ProfileStore::load_from(dir.path().join("profiles.json"));
        store.delete("absent").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn update_replaces_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        let mut store = ProfileStore::load_from(path.clone());
        store.create("default", sample_profile()).unwrap();

        let changed = WatermarkProfile {
            margin: 25,
            ..sample_profile()
        };
        store.update("default", changed.clone()).unwrap();

        let reloaded = ProfileStore::load_from(path);
        assert_eq!(reloaded.get("default"), Some(&changed));
    }

    #[test]
    fn scale_bounds_are_enforced() {
        assert!(validate_params(5, 0).is_ok());
        assert!(validate_params(100, 500).is_ok());
        assert!(validate_params(4, 0).is_err());
        assert!(validate_params(150, 0).is_err());
        assert!(validate_params(0, 0).is_err());
    }

    #[test]
    fn margin_bound_is_enforced() {
        assert!(validate_params(20, 500).is_ok());
        assert!(validate_params(20, 501).is_err());
    }
}
