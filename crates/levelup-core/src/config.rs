use crate::channel;
use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
}

/// Optional catalog overrides, relative to the store root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quests: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    16
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    channel::DEFAULT_CAPACITY
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub player: PlayerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub invites: InviteConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            player: PlayerConfig {
                name: player_name.into(),
            },
            catalog: CatalogConfig::default(),
            invites: InviteConfig::default(),
            channel: ChannelConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        crate::io::read_store_yaml(&paths::config_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::config_path(root), self)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.player.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "player.name is empty".to_string(),
            });
        }

        if self.invites.max_attempts == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "invites.max_attempts is 0; no invite code can ever be issued"
                    .to_string(),
            });
        }

        if self.channel.capacity == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "channel.capacity is 0; using 1".to_string(),
            });
        }

        for (key, path) in [
            ("catalog.achievements", &self.catalog.achievements),
            ("catalog.quests", &self.catalog.quests),
        ] {
            if let Some(p) = path {
                if !root.join(p).exists() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!("{key} points at '{}', which does not exist", p.display()),
                    });
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LevelupError;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("sam");
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.player.name, "sam");
        assert_eq!(loaded.invites.max_attempts, 16);
        assert_eq!(loaded.channel.capacity, 64);
        assert!(loaded.catalog.achievements.is_none());
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("player:\n  name: kim\n").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.invites.max_attempts, 16);
    }

    #[test]
    fn clean_config_has_no_warnings() {
        let dir = TempDir::new().unwrap();
        assert!(Config::new("sam").validate(dir.path()).is_empty());
    }

    #[test]
    fn validate_flags_bad_values() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("sam");
        cfg.invites.max_attempts = 0;
        cfg.channel.capacity = 0;
        cfg.catalog.quests = Some(PathBuf::from("missing.yaml"));

        let warnings = cfg.validate(dir.path());
        assert_eq!(warnings.len(), 3);
        let errors = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .count();
        assert_eq!(errors, 2);
    }

    #[test]
    fn load_before_init() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(LevelupError::NotInitialized)
        ));
    }
}
