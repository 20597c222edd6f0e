//! Configuration loaded from a TOML file.
//!
//! ```toml
//! state_path = "timers.json"
//! warning_minutes = [10, 5]
//!
//! [bosses]
//! venatus = 10
//! lady_daliah = 18
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{BossRoster, LeadTime, warning_plan};

/// Ten years. Keeps `now + interval` far from chrono's range limits.
pub const MAX_INTERVAL_HOURS: u32 = 10 * 365 * 24;

const DEFAULT_BOSSES: &[(&str, u32)] = &[
    ("venatus", 10),
    ("viorent", 10),
    ("undomiel", 24),
    ("lady_daliah", 18),
    ("livera", 24),
    ("ego", 21),
    ("araneo", 24),
    ("general_aqueleus", 29),
    ("amentis", 29),
    ("shuliar", 35),
    ("larba", 35),
    ("catena", 35),
    ("baron_braudmore", 32),
    ("wannitas", 48),
    ("gareth", 32),
    ("duplican", 48),
    ("metus", 48),
    ("titore", 37),
    ("supore", 62),
    ("asta", 62),
    ("ordo", 62),
    ("guild_boss", 1),
    ("secreta", 62),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespawnConfig {
    /// Where the timer snapshot is persisted.
    pub state_path: PathBuf,
    /// Lead times (minutes before respawn) for warnings.
    pub warning_minutes: Vec<u32>,
    /// Boss name -> respawn interval in hours.
    pub bosses: BTreeMap<String, u32>,
}

impl Default for RespawnConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("timers.json"),
            warning_minutes: vec![10, 5],
            bosses: DEFAULT_BOSSES
                .iter()
                .map(|&(name, hours)| (name.to_string(), hours))
                .collect(),
        }
    }
}

impl RespawnConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bosses.is_empty() {
            return Err(ConfigError::Invalid("no bosses configured".to_string()));
        }
        if let Some((name, _)) = self.bosses.iter().find(|(_, hours)| **hours == 0) {
            return Err(ConfigError::Invalid(format!(
                "boss {name} has a zero respawn interval"
            )));
        }
        if let Some((name, hours)) = self
            .bosses
            .iter()
            .find(|(_, hours)| **hours > MAX_INTERVAL_HOURS)
        {
            return Err(ConfigError::Invalid(format!(
                "boss {name} respawn interval {hours}h exceeds {MAX_INTERVAL_HOURS}h"
            )));
        }
        if self.warning_minutes.contains(&0) {
            return Err(ConfigError::Invalid(
                "warning lead time must be at least one minute".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.warning_minutes.iter().find(|m| !seen.insert(**m)) {
            return Err(ConfigError::Invalid(format!(
                "duplicate warning lead time: {dup} minutes"
            )));
        }
        let roster = self.roster();
        if roster.iter().map(|s| &s.id).collect::<HashSet<_>>().len() != roster.len() {
            return Err(ConfigError::Invalid(
                "two boss names normalize to the same id".to_string(),
            ));
        }
        Ok(())
    }

    pub fn roster(&self) -> BossRoster {
        BossRoster::from_hours(
            self.bosses
                .iter()
                .map(|(name, hours)| (name.as_str(), *hours)),
        )
    }

    pub fn warning_plan(&self) -> Vec<LeadTime> {
        warning_plan(&self.warning_minutes)
    }
}
