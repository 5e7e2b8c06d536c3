use crate::error::{LevelupError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const LEVELUP_DIR: &str = ".levelup";
pub const CATALOG_DIR: &str = ".levelup/catalog";
pub const QUESTS_DIR: &str = ".levelup/quests";

pub const CONFIG_FILE: &str = ".levelup/config.yaml";
pub const ACHIEVEMENTS_FILE: &str = ".levelup/catalog/achievements.yaml";
pub const QUEST_CATALOG_FILE: &str = ".levelup/catalog/quests.yaml";
pub const UNLOCKS_FILE: &str = ".levelup/unlocks.yaml";
pub const PLAYER_FILE: &str = ".levelup/player.yaml";
pub const INVITES_FILE: &str = ".levelup/invites.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn achievements_path(root: &Path) -> PathBuf {
    root.join(ACHIEVEMENTS_FILE)
}

pub fn quest_catalog_path(root: &Path) -> PathBuf {
    root.join(QUEST_CATALOG_FILE)
}

pub fn unlocks_path(root: &Path) -> PathBuf {
    root.join(UNLOCKS_FILE)
}

pub fn player_path(root: &Path) -> PathBuf {
    root.join(PLAYER_FILE)
}

pub fn invites_path(root: &Path) -> PathBuf {
    root.join(INVITES_FILE)
}

pub fn quest_instance_path(root: &Path, instance_id: &str) -> PathBuf {
    root.join(QUESTS_DIR).join(format!("{instance_id}.yaml"))
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").expect("slug regex is valid")
    })
}

/// Catalog ids (achievements, quests, skills) share the slug format.
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(LevelupError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs() {
        for slug in ["first-commit", "a", "streak-30", "x1"] {
            validate_slug(slug).unwrap_or_else(|_| panic!("expected valid: {slug}"));
        }
    }

    #[test]
    fn invalid_slugs() {
        for slug in [
            "",
            "-starts-with-dash",
            "ends-with-dash-",
            "has spaces",
            "UPPER",
            "a_b",
        ] {
            assert!(validate_slug(slug).is_err(), "expected invalid: {slug}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/me");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/me/.levelup/config.yaml")
        );
        assert_eq!(
            quest_instance_path(root, "abc"),
            PathBuf::from("/tmp/me/.levelup/quests/abc.yaml")
        );
        assert_eq!(
            achievements_path(root),
            PathBuf::from("/tmp/me/.levelup/catalog/achievements.yaml")
        );
    }
}
