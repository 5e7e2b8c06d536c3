use crate::error::{LevelupError, Result};
use crate::types::Metric;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ProgressReport (wire form)
// ---------------------------------------------------------------------------

/// Progress as delivered by a tracking collaborator. Every field is optional
/// on the wire; [`ProgressSnapshot::from_report`] decides what is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_changed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak_days: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quests_completed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_levels: Option<BTreeMap<String, u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl ProgressReport {
    /// Parse a report from YAML. JSON is a YAML subset, so both are accepted.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }
}

// ---------------------------------------------------------------------------
// ProgressSnapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub commits: u64,
    pub lines_changed: u64,
    pub streak_days: u64,
    pub quests_completed: u64,
    #[serde(default)]
    pub skill_levels: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl ProgressSnapshot {
    /// A snapshot with every counter at zero.
    pub fn empty() -> Self {
        Self {
            commits: 0,
            lines_changed: 0,
            streak_days: 0,
            quests_completed: 0,
            skill_levels: BTreeMap::new(),
            captured_at: None,
        }
    }

    pub fn from_report(report: &ProgressReport) -> Result<Self> {
        let commits = require(report.commits, Metric::Commits)?;
        let lines_changed = require(report.lines_changed, Metric::LinesChanged)?;
        let streak_days = require(report.streak_days, Metric::StreakDays)?;
        let quests_completed = require(report.quests_completed, Metric::QuestsCompleted)?;

        let skill_levels = report.skill_levels.clone().unwrap_or_default();
        if skill_levels.keys().any(|k| k.trim().is_empty()) {
            return Err(LevelupError::validation(
                "skill_levels",
                "skill ids must not be empty",
            ));
        }

        Ok(Self {
            commits,
            lines_changed,
            streak_days,
            quests_completed,
            skill_levels,
            captured_at: report.captured_at,
        })
    }

    pub fn metric(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Commits => self.commits,
            Metric::LinesChanged => self.lines_changed,
            Metric::StreakDays => self.streak_days,
            Metric::QuestsCompleted => self.quests_completed,
        }
    }

    /// Unknown skills are level 0.
    pub fn skill_level(&self, skill: &str) -> u32 {
        self.skill_levels.get(skill).copied().unwrap_or(0)
    }
}

fn require(value: Option<u64>, metric: Metric) -> Result<u64> {
    value.ok_or_else(|| {
        LevelupError::validation(metric.as_str(), "required field is missing")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_report() -> ProgressReport {
        ProgressReport {
            commits: Some(12),
            lines_changed: Some(340),
            streak_days: Some(4),
            quests_completed: Some(1),
            skill_levels: None,
            captured_at: None,
        }
    }

    #[test]
    fn complete_report_validates() {
        let snap = ProgressSnapshot::from_report(&full_report()).unwrap();
        assert_eq!(snap.commits, 12);
        assert_eq!(snap.metric(Metric::LinesChanged), 340);
        assert!(snap.skill_levels.is_empty());
    }

    #[test]
    fn missing_counter_names_the_field() {
        let mut report = full_report();
        report.streak_days = None;
        let err = ProgressSnapshot::from_report(&report).unwrap_err();
        match err {
            LevelupError::Validation { field, .. } => assert_eq!(field, "streak_days"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blank_skill_id_is_rejected() {
        let mut report = full_report();
        let mut skills = BTreeMap::new();
        skills.insert("  ".to_string(), 3);
        report.skill_levels = Some(skills);
        assert!(ProgressSnapshot::from_report(&report).is_err());
    }

    #[test]
    fn parses_yaml_and_json() {
        let yaml = "commits: 1\nlines_changed: 20\nstreak_days: 0\nquests_completed: 0\n";
        let json = r#"{"commits": 1, "lines_changed": 20, "streak_days": 0, "quests_completed": 0,
                      "skill_levels": {"development": 3}}"#;
        let a = ProgressReport::parse(yaml).unwrap();
        let b = ProgressReport::parse(json).unwrap();
        let a = ProgressSnapshot::from_report(&a).unwrap();
        let b = ProgressSnapshot::from_report(&b).unwrap();
        assert_eq!(a.commits, b.commits);
        assert_eq!(b.skill_level("development"), 3);
        assert_eq!(b.skill_level("teamwork"), 0);
    }
}
