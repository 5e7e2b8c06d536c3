use crate::output::{print_json, print_table};
use anyhow::Context;
use levelup_core::{
    config::Config,
    player::{xp_to_next, PlayerRecord},
    quest::QuestInstance,
    types::QuestStatus,
    unlock::UnlockRecord,
};
use std::collections::BTreeMap;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let player = PlayerRecord::load(root).context("failed to load player record")?;
    let unlocks = UnlockRecord::load(root).context("failed to load unlock record")?;
    let achievements = super::load_achievements(root, &config)?;
    let quests = QuestInstance::list(root).context("failed to list quests")?;

    let level = player.level();
    let mut quest_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for q in &quests {
        *quest_counts.entry(q.status.as_str()).or_insert(0) += 1;
    }

    if json {
        #[derive(serde::Serialize)]
        struct StatusOutput<'a> {
            player: &'a str,
            level: u32,
            title: &'a str,
            xp: u64,
            xp_to_next: Option<u64>,
            skills: &'a BTreeMap<String, u64>,
            unlocked: usize,
            achievements: usize,
            quests: &'a BTreeMap<&'a str, usize>,
        }

        return print_json(&StatusOutput {
            player: &player.name,
            level: level.level,
            title: level.title,
            xp: player.xp,
            xp_to_next: xp_to_next(player.xp),
            skills: &player.skills,
            unlocked: unlocks.unlocked_count(),
            achievements: achievements.len(),
            quests: &quest_counts,
        });
    }

    println!("Player:  {}", player.name);
    match xp_to_next(player.xp) {
        Some(n) => println!(
            "Level:   {} ({}) - {} XP, {n} to next",
            level.level, level.title, player.xp
        ),
        None => println!(
            "Level:   {} ({}) - {} XP, max level",
            level.level, level.title, player.xp
        ),
    }
    println!(
        "Unlocked: {}/{} achievements",
        unlocks.unlocked_count(),
        achievements.len()
    );

    let active = quest_counts
        .get(QuestStatus::Active.as_str())
        .copied()
        .unwrap_or(0);
    let completed = quest_counts
        .get(QuestStatus::Completed.as_str())
        .copied()
        .unwrap_or(0);
    println!("Quests:  {active} active, {completed} completed");

    if !player.skills.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = player
            .skills
            .iter()
            .map(|(skill, points)| vec![skill.clone(), points.to_string()])
            .collect();
        print_table(&["SKILL", "POINTS"], rows);
    }

    Ok(())
}
