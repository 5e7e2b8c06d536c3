use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// RewardTable
// ---------------------------------------------------------------------------

/// What a quest pays out on completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTable {
    #[serde(default)]
    pub xp: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skills: BTreeMap<String, u32>,
}

impl RewardTable {
    pub fn new(xp: u32) -> Self {
        Self {
            xp,
            skills: BTreeMap::new(),
        }
    }

    pub fn with_skill(mut self, skill: impl Into<String>, amount: u32) -> Self {
        self.skills.insert(skill.into(), amount);
        self
    }

    /// One grant for the XP entry plus one per skill entry, zero amounts
    /// included.
    pub fn grants_for(&self, target_id: &str) -> Vec<RewardGrant> {
        let mut grants = Vec::with_capacity(1 + self.skills.len());
        grants.push(RewardGrant::xp(target_id, self.xp));
        for (skill, &amount) in &self.skills {
            grants.push(RewardGrant::skill(target_id, skill, amount));
        }
        grants
    }
}

// ---------------------------------------------------------------------------
// RewardGrant
// ---------------------------------------------------------------------------

/// An instruction to credit XP and/or skill points. Emitted by the engine,
/// applied by whoever owns the player record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    pub target_id: String,
    #[serde(default)]
    pub xp_delta: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skill_deltas: BTreeMap<String, u32>,
}

impl RewardGrant {
    pub fn xp(target_id: impl Into<String>, amount: u32) -> Self {
        Self {
            target_id: target_id.into(),
            xp_delta: amount,
            skill_deltas: BTreeMap::new(),
        }
    }

    pub fn skill(target_id: impl Into<String>, skill: impl Into<String>, amount: u32) -> Self {
        let mut skill_deltas = BTreeMap::new();
        skill_deltas.insert(skill.into(), amount);
        Self {
            target_id: target_id.into(),
            xp_delta: 0,
            skill_deltas,
        }
    }
}

pub fn total_xp(grants: &[RewardGrant]) -> u64 {
    grants.iter().map(|g| u64::from(g.xp_delta)).sum()
}
