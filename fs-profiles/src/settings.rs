//! Settings provider used by [`crate::holder::TeamHolder`] to locate
//! the files it persists. Callers inject an implementation instead of
//! the layer reading ambient process-wide configuration.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use data_error::{Result, TeambuilderError};

/// Path of the active team file.
pub const TEAM_LOCATION: &str = "team_location";
/// Directory holding the profile files.
pub const PROFILES_PATH: &str = "profiles_path";
/// Path of the profile to load on startup.
pub const CURRENT_PROFILE: &str = "current_profile";

pub trait Settings {
    fn get(&self, key: &str) -> Option<String>;
}

impl Settings for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// Look up a key the persistence layer cannot do without.
pub fn required(settings: &impl Settings, key: &str) -> Result<String> {
    settings
        .get(key)
        .ok_or_else(|| TeambuilderError::Settings(key.to_owned()))
}

const SETTINGS_VERSION: i32 = 1;

#[derive(Serialize, Deserialize)]
struct FileSettingsData {
    version: i32,
    entries: BTreeMap<String, String>,
}

/// Settings backed by a JSON file with a version-tagged envelope.
pub struct FileSettings {
    path: PathBuf,
    data: FileSettingsData,
}

impl FileSettings {
    pub fn new(path: &Path) -> Self {
        Self {
            path: PathBuf::from(path),
            data: FileSettingsData {
                version: SETTINGS_VERSION,
                entries: BTreeMap::new(),
            },
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.entries.insert(key.into(), value.into());
    }

    /// Load the entries from disk, replacing the in-memory ones.
    pub fn read_fs(&mut self) -> Result<()> {
        let file = File::open(&self.path)?;
        let data: FileSettingsData = serde_json::from_reader(file)?;
        if data.version > SETTINGS_VERSION {
            return Err(TeambuilderError::Version {
                found: data.version,
                supported: SETTINGS_VERSION,
            });
        }
        self.data = data;
        Ok(())
    }

    /// Persist the entries to disk.
    pub fn write_fs(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.data)?;
        writer.flush()?;
        log::info!(
            "{} settings entries written to {}",
            self.data.entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl Settings for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.data.entries.get(key).cloned()
    }
}
