use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// A counter carried by every progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Commits,
    LinesChanged,
    StreakDays,
    QuestsCompleted,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Commits => "commits",
            Metric::LinesChanged => "lines_changed",
            Metric::StreakDays => "streak_days",
            Metric::QuestsCompleted => "quests_completed",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// QuestStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Active,
    Completed,
    Failed,
}

impl QuestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestStatus::Active => "active",
            QuestStatus::Completed => "completed",
            QuestStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, QuestStatus::Completed | QuestStatus::Failed)
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// QuestOutcome
// ---------------------------------------------------------------------------

/// The reason passed when closing a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestOutcome {
    Completed,
    Failed,
}

impl QuestOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestOutcome::Completed => "completed",
            QuestOutcome::Failed => "failed",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            QuestOutcome::Completed => "complete",
            QuestOutcome::Failed => "fail",
        }
    }

    pub fn status(self) -> QuestStatus {
        match self {
            QuestOutcome::Completed => QuestStatus::Completed,
            QuestOutcome::Failed => QuestStatus::Failed,
        }
    }
}

impl fmt::Display for QuestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GrantSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantSource {
    Achievement,
    Quest,
}

impl fmt::Display for GrantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GrantSource::Achievement => "achievement",
            GrantSource::Quest => "quest",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!QuestStatus::Active.is_terminal());
        assert!(QuestStatus::Completed.is_terminal());
        assert!(QuestStatus::Failed.is_terminal());
    }

    #[test]
    fn outcome_maps_to_terminal_status() {
        for outcome in [QuestOutcome::Completed, QuestOutcome::Failed] {
            assert!(outcome.status().is_terminal());
            assert_eq!(outcome.as_str(), outcome.status().as_str());
        }
        assert_eq!(QuestOutcome::Failed.verb(), "fail");
    }

    #[test]
    fn metric_serializes_snake_case() {
        let yaml = serde_yaml::to_string(&Metric::LinesChanged).unwrap();
        assert_eq!(yaml.trim(), "lines_changed");
    }
}
