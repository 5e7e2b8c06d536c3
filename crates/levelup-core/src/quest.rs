use crate::error::{LevelupError, Result};
use crate::paths;
use crate::reward::{RewardGrant, RewardTable};
use crate::types::{QuestOutcome, QuestStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// QuestDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub rewards: RewardTable,
}

fn objective(id: &str, description: &str) -> Objective {
    Objective {
        id: id.to_string(),
        description: description.to_string(),
    }
}

pub fn default_quests() -> Vec<QuestDefinition> {
    vec![
        QuestDefinition {
            id: "ship-a-feature".to_string(),
            title: "Ship a Feature".to_string(),
            description: "Take one feature from idea to merged pull request".to_string(),
            objectives: vec![
                objective("plan", "Write down what the feature does"),
                objective("build", "Implement it"),
                objective("review", "Get a teammate to review it"),
            ],
            rewards: RewardTable::new(300)
                .with_skill("development", 150)
                .with_skill("teamwork", 50),
        },
        QuestDefinition {
            id: "morning-walk".to_string(),
            title: "Morning Walk".to_string(),
            description: "Walk for thirty minutes before noon".to_string(),
            objectives: vec![objective("walk", "Thirty minutes on foot")],
            rewards: RewardTable::new(50).with_skill("health", 20),
        },
        QuestDefinition {
            id: "family-dinner".to_string(),
            title: "Family Dinner".to_string(),
            description: "Cook and share a meal with your household".to_string(),
            objectives: vec![
                objective("cook", "Cook the meal"),
                objective("share", "Eat together, screens away"),
            ],
            rewards: RewardTable::new(80).with_skill("family", 40),
        },
        QuestDefinition {
            id: "deep-work".to_string(),
            title: "Deep Work".to_string(),
            description: "Two uninterrupted hours on one problem".to_string(),
            objectives: vec![objective("focus", "Two hours, notifications off")],
            rewards: RewardTable::new(120).with_skill("focus", 60),
        },
    ]
}

// ---------------------------------------------------------------------------
// QuestCatalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    quests: Vec<QuestDefinition>,
}

#[derive(Debug, Clone)]
pub struct QuestCatalog {
    quests: Vec<QuestDefinition>,
}

impl QuestCatalog {
    pub fn new(quests: Vec<QuestDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for q in &quests {
            paths::validate_slug(&q.id)?;
            if !seen.insert(q.id.as_str()) {
                return Err(LevelupError::DuplicateId(q.id.clone()));
            }
            let mut objective_ids = HashSet::new();
            for o in &q.objectives {
                paths::validate_slug(&o.id)?;
                if !objective_ids.insert(o.id.as_str()) {
                    return Err(LevelupError::DuplicateId(format!("{}/{}", q.id, o.id)));
                }
            }
            for skill in q.rewards.skills.keys() {
                paths::validate_slug(skill)?;
            }
        }
        Ok(Self { quests })
    }

    pub fn builtin() -> Self {
        Self {
            quests: default_quests(),
        }
    }

    pub fn get(&self, id: &str) -> Result<&QuestDefinition> {
        self.quests
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| LevelupError::QuestNotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestDefinition> {
        self.quests.iter()
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    pub fn parse(text: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(text)?;
        Self::new(file.quests)
    }

    pub fn load(root: &Path, override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(p) => root.join(p),
            None => paths::quest_catalog_path(root),
        };
        if !path.exists() {
            return Err(LevelupError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        Self::parse(&data)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = CatalogFile {
            quests: self.quests.clone(),
        };
        crate::io::write_yaml(path, &file)
    }
}

// ---------------------------------------------------------------------------
// QuestInstance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveProgress {
    pub id: String,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_at: Option<DateTime<Utc>>,
}

/// One attempt at a quest. Rewards are copied from the definition when the
/// attempt starts so later catalog edits do not change what it pays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestInstance {
    pub id: String,
    pub quest_id: String,
    pub title: String,
    pub status: QuestStatus,
    pub rewards: RewardTable,
    #[serde(default)]
    pub objectives: Vec<ObjectiveProgress>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl QuestInstance {
    pub fn start(def: &QuestDefinition) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            quest_id: def.id.clone(),
            title: def.title.clone(),
            status: QuestStatus::Active,
            rewards: def.rewards.clone(),
            objectives: def
                .objectives
                .iter()
                .map(|o| ObjectiveProgress {
                    id: o.id.clone(),
                    done: false,
                    done_at: None,
                })
                .collect(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Short form of the instance id for display and lookup.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    pub fn is_active(&self) -> bool {
        self.status == QuestStatus::Active
    }

    fn ensure_active(&self, action: &str) -> Result<()> {
        if self.status.is_terminal() {
            return Err(LevelupError::InvalidState {
                id: self.id.clone(),
                status: self.status.to_string(),
                reason: format!("cannot {action} a quest that has already ended"),
            });
        }
        Ok(())
    }

    /// Mark an objective done. Marking it twice is a no-op.
    pub fn complete_objective(&mut self, objective_id: &str) -> Result<()> {
        self.ensure_active("update")?;
        let progress = self
            .objectives
            .iter_mut()
            .find(|o| o.id == objective_id)
            .ok_or_else(|| LevelupError::ObjectiveNotFound {
                quest: self.quest_id.clone(),
                objective: objective_id.to_string(),
            })?;
        if !progress.done {
            progress.done = true;
            progress.done_at = Some(Utc::now());
        }
        Ok(())
    }

    /// "2/3 objectives done"
    pub fn summarize(&self) -> String {
        let done = self.objectives.iter().filter(|o| o.done).count();
        format!("{done}/{} objectives done", self.objectives.len())
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path, instance_id: &str) -> Result<Self> {
        check_instance_ref(instance_id)?;
        let path = paths::quest_instance_path(root, instance_id);
        if !path.exists() {
            return Err(LevelupError::QuestInstanceNotFound(instance_id.to_string()));
        }
        crate::io::read_yaml(&path)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::quest_instance_path(root, &self.id), self)
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = root.join(paths::QUESTS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut quests = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                quests.push(crate::io::read_yaml::<QuestInstance>(&path)?);
            }
        }
        quests.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        Ok(quests)
    }

    /// Resolve a full id or an unambiguous prefix of one.
    pub fn find(root: &Path, id_or_prefix: &str) -> Result<Self> {
        check_instance_ref(id_or_prefix)?;
        if paths::quest_instance_path(root, id_or_prefix).exists() {
            return Self::load(root, id_or_prefix);
        }
        let mut matches: Vec<Self> = Self::list(root)?
            .into_iter()
            .filter(|q| q.id.starts_with(id_or_prefix))
            .collect();
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(LevelupError::QuestInstanceNotFound(id_or_prefix.to_string())),
            n => Err(LevelupError::validation(
                "quest instance",
                format!("'{id_or_prefix}' matches {n} instances; use more characters"),
            )),
        }
    }
}

/// Instance ids are lowercase hex, so anything else never names a file
/// under the quests directory.
fn check_instance_ref(id: &str) -> Result<()> {
    if id.is_empty() || !id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(LevelupError::validation(
            "quest instance",
            format!("'{id}' is not an instance id"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Close an active quest. `Completed` pays out the reward table, `Failed`
/// pays nothing. A quest that has already ended is left as it is.
pub fn complete_quest(
    quest: &mut QuestInstance,
    outcome: QuestOutcome,
) -> Result<Vec<RewardGrant>> {
    quest.ensure_active(outcome.verb())?;

    quest.status = outcome.status();
    quest.ended_at = Some(Utc::now());

    let grants = match outcome {
        QuestOutcome::Completed => quest.rewards.grants_for(&quest.quest_id),
        QuestOutcome::Failed => Vec::new(),
    };
    tracing::info!(
        quest = %quest.quest_id,
        instance = %quest.short_id(),
        outcome = %outcome,
        grants = grants.len(),
        "quest closed"
    );
    Ok(grants)
}
