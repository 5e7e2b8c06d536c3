use crate::error::Result;
use crate::paths;
use crate::reward::RewardGrant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Level {
    pub level: u32,
    pub xp_required: u64,
    pub title: &'static str,
}

/// Sorted by `xp_required`.
pub static LEVELS: &[Level] = &[
    Level {
        level: 1,
        xp_required: 0,
        title: "Newcomer",
    },
    Level {
        level: 2,
        xp_required: 100,
        title: "Beginner",
    },
    Level {
        level: 3,
        xp_required: 250,
        title: "Regular",
    },
    Level {
        level: 4,
        xp_required: 500,
        title: "Regular",
    },
    Level {
        level: 5,
        xp_required: 900,
        title: "Committed",
    },
    Level {
        level: 6,
        xp_required: 1_400,
        title: "Committed",
    },
    Level {
        level: 7,
        xp_required: 2_000,
        title: "Seasoned",
    },
    Level {
        level: 8,
        xp_required: 3_000,
        title: "Seasoned",
    },
    Level {
        level: 9,
        xp_required: 4_500,
        title: "Expert",
    },
    Level {
        level: 10,
        xp_required: 6_500,
        title: "Master",
    },
];

pub fn level_for(xp: u64) -> &'static Level {
    LEVELS
        .iter()
        .rev()
        .find(|l| xp >= l.xp_required)
        .unwrap_or(&LEVELS[0])
}

/// XP still needed for the next level, or `None` at the top.
pub fn xp_to_next(xp: u64) -> Option<u64> {
    LEVELS
        .iter()
        .find(|l| l.xp_required > xp)
        .map(|l| l.xp_required - xp)
}

// ---------------------------------------------------------------------------
// PlayerRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
    pub title: String,
}

/// The player-state store: the only place grants are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub skills: BTreeMap<String, u64>,
    /// Number of grants applied so far.
    #[serde(default)]
    pub applied: u64,
    pub updated_at: DateTime<Utc>,
}

impl PlayerRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xp: 0,
            skills: BTreeMap::new(),
            applied: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn level(&self) -> &'static Level {
        level_for(self.xp)
    }

    pub fn skill(&self, skill: &str) -> u64 {
        self.skills.get(skill).copied().unwrap_or(0)
    }

    /// Credit one grant. Returns the level change, if any.
    pub fn apply(&mut self, grant: &RewardGrant) -> Option<LevelUp> {
        let before = self.level().level;
        self.xp = self.xp.saturating_add(u64::from(grant.xp_delta));
        for (skill, &amount) in &grant.skill_deltas {
            let points = self.skills.entry(skill.clone()).or_insert(0);
            *points = points.saturating_add(u64::from(amount));
        }
        self.applied += 1;
        self.updated_at = Utc::now();

        let after = self.level();
        (after.level > before).then(|| {
            tracing::info!(player = %self.name, level = after.level, "level up");
            LevelUp {
                from: before,
                to: after.level,
                title: after.title.to_string(),
            }
        })
    }

    pub fn apply_all(&mut self, grants: &[RewardGrant]) -> Option<LevelUp> {
        let from = self.level().level;
        for grant in grants {
            self.apply(grant);
        }
        let to = self.level();
        (to.level > from).then(|| LevelUp {
            from,
            to: to.level,
            title: to.title.to_string(),
        })
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        crate::io::read_store_yaml(&paths::player_path(root))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::player_path(root), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn levels_are_sorted() {
        for pair in LEVELS.windows(2) {
            assert!(pair[0].xp_required < pair[1].xp_required);
            assert_eq!(pair[0].level + 1, pair[1].level);
        }
    }

    #[test]
    fn level_lookup() {
        assert_eq!(level_for(0).level, 1);
        assert_eq!(level_for(99).level, 1);
        assert_eq!(level_for(100).level, 2);
        assert_eq!(level_for(1_000_000).level, 10);
        assert_eq!(xp_to_next(90), Some(10));
        assert_eq!(xp_to_next(6_500), None);
    }

    #[test]
    fn applying_quest_grants() {
        let mut player = PlayerRecord::new("sam");
        let grants = vec![
            RewardGrant::xp("ship-a-feature", 300),
            RewardGrant::skill("ship-a-feature", "development", 150),
            RewardGrant::skill("ship-a-feature", "teamwork", 50),
        ];
        let up = player.apply_all(&grants).unwrap();
        assert_eq!(player.xp, 300);
        assert_eq!(player.skill("development"), 150);
        assert_eq!(player.skill("teamwork"), 50);
        assert_eq!(player.applied, 3);
        assert_eq!((up.from, up.to), (1, 3));
    }

    #[test]
    fn single_grant_reports_level_change_only_when_crossing() {
        let mut player = PlayerRecord::new("sam");
        assert!(player.apply(&RewardGrant::xp("a", 50)).is_none());
        let up = player.apply(&RewardGrant::xp("b", 50)).unwrap();
        assert_eq!(up.to, 2);
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut player = PlayerRecord::new("sam");
        player.apply(&RewardGrant::skill("q", "health", 20));
        player.save(dir.path()).unwrap();
        assert_eq!(PlayerRecord::load(dir.path()).unwrap(), player);
    }
}
