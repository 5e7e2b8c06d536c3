use crate::achievement::AchievementCatalog;
use crate::error::Result;
use crate::reward::{total_xp, RewardGrant};
use crate::snapshot::{ProgressReport, ProgressSnapshot};
use crate::unlock::UnlockRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Evaluation (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub unlocks: UnlockRecord,
    pub grants: Vec<RewardGrant>,
    /// Ids unlocked by this call, in catalog order.
    pub newly_unlocked: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn total_xp(&self) -> u64 {
        total_xp(&self.grants)
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Checks every still-locked achievement against a snapshot.
///
/// The evaluator never touches storage: it takes the current unlock record by
/// reference and returns the next one alongside the grants to apply. Callers
/// that share a record between threads must serialise calls per player, or two
/// evaluations of the same snapshot will both grant.
pub struct Evaluator<'a> {
    catalog: &'a AchievementCatalog,
}

impl<'a> Evaluator<'a> {
    pub fn new(catalog: &'a AchievementCatalog) -> Self {
        Self { catalog }
    }

    pub fn evaluate(&self, report: &ProgressReport, unlocks: &UnlockRecord) -> Result<Evaluation> {
        self.evaluate_at(report, unlocks, Utc::now())
    }

    /// Validation happens before any state is copied, so a malformed report
    /// leaves the caller with exactly the record it passed in.
    pub fn evaluate_at(
        &self,
        report: &ProgressReport,
        unlocks: &UnlockRecord,
        now: DateTime<Utc>,
    ) -> Result<Evaluation> {
        let snapshot = ProgressSnapshot::from_report(report)?;
        Ok(self.evaluate_snapshot(&snapshot, unlocks, now))
    }

    pub fn evaluate_snapshot(
        &self,
        snapshot: &ProgressSnapshot,
        unlocks: &UnlockRecord,
        now: DateTime<Utc>,
    ) -> Evaluation {
        let mut next = unlocks.clone();
        let mut grants = Vec::new();
        let mut newly_unlocked = Vec::new();

        for def in self.catalog.iter() {
            if next.is_unlocked(&def.id) || !def.condition.holds(snapshot) {
                continue;
            }
            if next.mark_unlocked(&def.id, now) {
                tracing::info!(achievement = %def.id, xp = def.xp_reward, "achievement unlocked");
                grants.push(RewardGrant::xp(&def.id, def.xp_reward));
                newly_unlocked.push(def.id.clone());
            }
        }

        tracing::debug!(
            checked = self.catalog.len(),
            unlocked = newly_unlocked.len(),
            xp = total_xp(&grants),
            "evaluated progress snapshot"
        );

        Evaluation {
            unlocks: next,
            grants,
            newly_unlocked,
            evaluated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievement::{at_least, default_achievements, AchievementDefinition};
    use crate::error::LevelupError;
    use crate::types::Metric;
    use std::collections::BTreeSet;

    fn report(commits: u64, lines: u64, streak: u64, quests: u64) -> ProgressReport {
        ProgressReport {
            commits: Some(commits),
            lines_changed: Some(lines),
            streak_days: Some(streak),
            quests_completed: Some(quests),
            skill_levels: None,
            captured_at: None,
        }
    }

    fn first_commit_only() -> AchievementCatalog {
        AchievementCatalog::new(vec![AchievementDefinition {
            id: "first-commit".to_string(),
            title: "First Commit".to_string(),
            description: String::new(),
            xp_reward: 100,
            condition: at_least(Metric::Commits, 1),
        }])
        .unwrap()
    }

    fn unlocked_set(record: &UnlockRecord) -> BTreeSet<String> {
        record
            .unlocked_ids()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn first_commit_unlocks_once() {
        let catalog = first_commit_only();
        let evaluator = Evaluator::new(&catalog);
        let snap = report(1, 0, 0, 0);

        let first = evaluator.evaluate(&snap, &UnlockRecord::new()).unwrap();
        assert_eq!(first.grants, vec![RewardGrant::xp("first-commit", 100)]);
        assert!(first.unlocks.is_unlocked("first-commit"));

        let second = evaluator.evaluate(&snap, &first.unlocks).unwrap();
        assert!(second.grants.is_empty());
        assert!(second.newly_unlocked.is_empty());
    }

    #[test]
    fn unlocked_at_is_the_evaluation_time() {
        let catalog = first_commit_only();
        let evaluator = Evaluator::new(&catalog);
        let now = Utc::now();
        let eval = evaluator
            .evaluate_at(&report(3, 0, 0, 0), &UnlockRecord::new(), now)
            .unwrap();
        assert_eq!(eval.unlocks.unlocked_at("first-commit"), Some(now));

        let later = now + chrono::Duration::days(1);
        let again = evaluator
            .evaluate_at(&report(5, 0, 0, 0), &eval.unlocks, later)
            .unwrap();
        assert_eq!(again.unlocks.unlocked_at("first-commit"), Some(now));
    }

    #[test]
    fn false_predicate_changes_nothing() {
        let catalog = first_commit_only();
        let eval = Evaluator::new(&catalog)
            .evaluate(&report(0, 0, 0, 0), &UnlockRecord::new())
            .unwrap();
        assert!(eval.is_empty());
        assert_eq!(eval.unlocks, UnlockRecord::new());
    }

    #[test]
    fn idempotent_across_many_snapshots() {
        let catalog = AchievementCatalog::builtin();
        let evaluator = Evaluator::new(&catalog);
        let snapshots = [
            report(0, 0, 0, 0),
            report(1, 10, 1, 0),
            report(12, 1_500, 3, 1),
            report(150, 20_000, 40, 12),
        ];
        let mut state = UnlockRecord::new();
        for snap in &snapshots {
            let first = evaluator.evaluate(snap, &state).unwrap();
            let second = evaluator.evaluate(snap, &first.unlocks).unwrap();
            assert!(second.grants.is_empty(), "second run granted again");
            state = second.unlocks;
        }
    }

    #[test]
    fn unlocked_set_only_grows() {
        let catalog = AchievementCatalog::builtin();
        let evaluator = Evaluator::new(&catalog);
        let high = evaluator
            .evaluate(&report(150, 20_000, 40, 12), &UnlockRecord::new())
            .unwrap();
        let before = unlocked_set(&high.unlocks);

        // A lower snapshot (e.g. a reset tracker) must not revoke anything.
        let low = evaluator.evaluate(&report(0, 0, 0, 0), &high.unlocks).unwrap();
        let after = unlocked_set(&low.unlocks);
        assert!(after.is_superset(&before));
        assert_eq!(after, before);
    }

    #[test]
    fn catalog_order_does_not_matter() {
        let forward = AchievementCatalog::builtin();
        let mut reversed_defs = default_achievements();
        reversed_defs.reverse();
        let reversed = AchievementCatalog::new(reversed_defs).unwrap();

        let mut skills = std::collections::BTreeMap::new();
        skills.insert("teamwork".to_string(), 6);
        skills.insert("development".to_string(), 5);
        let mut snap = report(120, 2_000, 8, 1);
        snap.skill_levels = Some(skills);

        let now = Utc::now();
        let a = Evaluator::new(&forward)
            .evaluate_at(&snap, &UnlockRecord::new(), now)
            .unwrap();
        let b = Evaluator::new(&reversed)
            .evaluate_at(&snap, &UnlockRecord::new(), now)
            .unwrap();

        assert_eq!(unlocked_set(&a.unlocks), unlocked_set(&b.unlocks));
        assert_eq!(a.total_xp(), b.total_xp());
        assert!(a.unlocks.is_unlocked("polymath"));
    }

    #[test]
    fn malformed_report_fails_and_leaves_state_alone() {
        let catalog = AchievementCatalog::builtin();
        let evaluator = Evaluator::new(&catalog);
        let seeded = evaluator
            .evaluate(&report(1, 0, 0, 0), &UnlockRecord::new())
            .unwrap()
            .unlocks;
        let before = seeded.clone();

        let mut bad = report(500, 50_000, 60, 20);
        bad.commits = None;
        let err = evaluator.evaluate(&bad, &seeded).unwrap_err();
        assert!(matches!(err, LevelupError::Validation { ref field, .. } if field == "commits"));
        assert!(err.is_recoverable());
        assert_eq!(seeded, before);
    }

    #[test]
    fn grants_follow_catalog_order() {
        let catalog = AchievementCatalog::builtin();
        let eval = Evaluator::new(&catalog)
            .evaluate(&report(10, 0, 0, 0), &UnlockRecord::new())
            .unwrap();
        assert_eq!(eval.newly_unlocked, vec!["first-commit", "ten-commits"]);
        assert_eq!(eval.total_xp(), 250);
    }
}
