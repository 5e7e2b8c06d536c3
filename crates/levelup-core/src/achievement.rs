use crate::error::{LevelupError, Result};
use crate::paths;
use crate::snapshot::ProgressSnapshot;
use crate::types::Metric;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Unlock predicate. Evaluation reads only the snapshot, so it is total and
/// returns the same answer for the same input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    AtLeast { metric: Metric, value: u64 },
    SkillAtLeast { skill: String, level: u32 },
    All { of: Vec<Condition> },
    Any { of: Vec<Condition> },
}

impl Condition {
    pub fn holds(&self, snapshot: &ProgressSnapshot) -> bool {
        match self {
            Condition::AtLeast { metric, value } => snapshot.metric(*metric) >= *value,
            Condition::SkillAtLeast { skill, level } => snapshot.skill_level(skill) >= *level,
            Condition::All { of } => of.iter().all(|c| c.holds(snapshot)),
            Condition::Any { of } => of.iter().any(|c| c.holds(snapshot)),
        }
    }

    fn validate(&self, achievement: &str) -> Result<()> {
        match self {
            Condition::AtLeast { .. } => Ok(()),
            Condition::SkillAtLeast { skill, .. } => paths::validate_slug(skill).map_err(|_| {
                LevelupError::validation(
                    format!("achievements.{achievement}.condition"),
                    format!("skill id '{skill}' is not a valid slug"),
                )
            }),
            Condition::All { of } | Condition::Any { of } => {
                of.iter().try_for_each(|c| c.validate(achievement))
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::AtLeast { metric, value } => write!(f, "{metric} >= {value}"),
            Condition::SkillAtLeast { skill, level } => write!(f, "skill {skill} >= {level}"),
            Condition::All { of } | Condition::Any { of } => {
                let joiner = if matches!(self, Condition::All { .. }) {
                    " and "
                } else {
                    " or "
                };
                let parts: Vec<String> = of.iter().map(|c| c.to_string()).collect();
                write!(f, "({})", parts.join(joiner))
            }
        }
    }
}

pub fn at_least(metric: Metric, value: u64) -> Condition {
    Condition::AtLeast { metric, value }
}

pub fn skill_at_least(skill: &str, level: u32) -> Condition {
    Condition::SkillAtLeast {
        skill: skill.to_string(),
        level,
    }
}

// ---------------------------------------------------------------------------
// AchievementDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub xp_reward: u32,
    pub condition: Condition,
}

macro_rules! achievement {
    (
        id: $id:expr,
        title: $title:expr,
        description: $desc:expr,
        xp: $xp:expr,
        when: $cond:expr
    ) => {
        AchievementDefinition {
            id: $id.to_string(),
            title: $title.to_string(),
            description: $desc.to_string(),
            xp_reward: $xp,
            condition: $cond,
        }
    };
}

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

pub fn default_achievements() -> Vec<AchievementDefinition> {
    vec![
        // Commits
        achievement! {
            id: "first-commit",
            title: "First Commit",
            description: "Push your very first commit",
            xp: 100,
            when: at_least(Metric::Commits, 1)
        },
        achievement! {
            id: "ten-commits",
            title: "Getting Warm",
            description: "Reach 10 commits",
            xp: 150,
            when: at_least(Metric::Commits, 10)
        },
        achievement! {
            id: "century",
            title: "Century",
            description: "Reach 100 commits",
            xp: 500,
            when: at_least(Metric::Commits, 100)
        },
        // Lines changed
        achievement! {
            id: "thousand-lines",
            title: "Wordsmith",
            description: "Change 1,000 lines",
            xp: 200,
            when: at_least(Metric::LinesChanged, 1_000)
        },
        achievement! {
            id: "ten-thousand-lines",
            title: "Prolific",
            description: "Change 10,000 lines",
            xp: 750,
            when: at_least(Metric::LinesChanged, 10_000)
        },
        // Streaks
        achievement! {
            id: "streak-3",
            title: "On a Roll",
            description: "Contribute three days in a row",
            xp: 75,
            when: at_least(Metric::StreakDays, 3)
        },
        achievement! {
            id: "streak-7",
            title: "Week Warrior",
            description: "Contribute seven days in a row",
            xp: 200,
            when: at_least(Metric::StreakDays, 7)
        },
        achievement! {
            id: "streak-30",
            title: "Unstoppable",
            description: "Contribute thirty days in a row",
            xp: 1_000,
            when: at_least(Metric::StreakDays, 30)
        },
        // Quests
        achievement! {
            id: "first-quest",
            title: "Adventurer",
            description: "Complete your first quest",
            xp: 100,
            when: at_least(Metric::QuestsCompleted, 1)
        },
        achievement! {
            id: "quest-veteran",
            title: "Veteran",
            description: "Complete ten quests",
            xp: 400,
            when: at_least(Metric::QuestsCompleted, 10)
        },
        // Skills
        achievement! {
            id: "team-player",
            title: "Team Player",
            description: "Reach teamwork level 5",
            xp: 250,
            when: skill_at_least("teamwork", 5)
        },
        achievement! {
            id: "polymath",
            title: "Polymath",
            description: "Reach level 5 in development and teamwork while keeping a week-long streak",
            xp: 600,
            when: Condition::All {
                of: vec![
                    skill_at_least("development", 5),
                    skill_at_least("teamwork", 5),
                    at_least(Metric::StreakDays, 7),
                ],
            }
        },
    ]
}

// ---------------------------------------------------------------------------
// AchievementCatalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    achievements: Vec<AchievementDefinition>,
}

/// Ordered, immutable set of achievement definitions with unique ids.
#[derive(Debug, Clone)]
pub struct AchievementCatalog {
    achievements: Vec<AchievementDefinition>,
}

impl AchievementCatalog {
    pub fn new(achievements: Vec<AchievementDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for a in &achievements {
            paths::validate_slug(&a.id)?;
            if !seen.insert(a.id.as_str()) {
                return Err(LevelupError::DuplicateId(a.id.clone()));
            }
            if a.title.trim().is_empty() {
                return Err(LevelupError::validation(
                    format!("achievements.{}.title", a.id),
                    "title must not be empty",
                ));
            }
            a.condition.validate(&a.id)?;
        }
        Ok(Self { achievements })
    }

    pub fn builtin() -> Self {
        Self {
            achievements: default_achievements(),
        }
    }

    pub fn get(&self, id: &str) -> Result<&AchievementDefinition> {
        self.achievements
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| LevelupError::AchievementNotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AchievementDefinition> {
        self.achievements.iter()
    }

    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn parse(text: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(text)?;
        Self::new(file.achievements)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    /// Load the store's catalog, or the file named by `override_path`.
    pub fn load(root: &Path, override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(p) => root.join(p),
            None => paths::achievements_path(root),
        };
        if !path.exists() {
            return Err(LevelupError::NotInitialized);
        }
        Self::load_from(&path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = CatalogFile {
            achievements: self.achievements.clone(),
        };
        crate::io::write_yaml(path, &file)
    }
}
