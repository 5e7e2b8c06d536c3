use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use levelup_core::{config::Config, unlock::UnlockRecord};
use std::path::Path;

#[derive(Subcommand)]
pub enum AchievementSubcommand {
    /// List every achievement and whether it is unlocked
    List {
        /// Only show unlocked achievements
        #[arg(long)]
        unlocked: bool,
    },
    /// Show one achievement
    Show { id: String },
}

pub fn run(root: &Path, subcmd: AchievementSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        AchievementSubcommand::List { unlocked } => list(root, unlocked, json),
        AchievementSubcommand::Show { id } => show(root, &id, json),
    }
}

#[derive(serde::Serialize)]
struct AchievementView<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    xp_reward: u32,
    condition: String,
    unlocked: bool,
    unlocked_at: Option<String>,
}

fn list(root: &Path, only_unlocked: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let catalog = super::load_achievements(root, &config)?;
    let unlocks = UnlockRecord::load(root).context("failed to load unlock record")?;

    let views: Vec<AchievementView> = catalog
        .iter()
        .filter(|a| !only_unlocked || unlocks.is_unlocked(&a.id))
        .map(|a| AchievementView {
            id: &a.id,
            title: &a.title,
            description: &a.description,
            xp_reward: a.xp_reward,
            condition: a.condition.to_string(),
            unlocked: unlocks.is_unlocked(&a.id),
            unlocked_at: unlocks.unlocked_at(&a.id).map(|t| t.to_rfc3339()),
        })
        .collect();

    if json {
        return print_json(&views);
    }

    if views.is_empty() {
        println!("No achievements to show.");
        return Ok(());
    }

    let rows = views
        .iter()
        .map(|v| {
            vec![
                if v.unlocked { "x" } else { " " }.to_string(),
                v.id.to_string(),
                v.xp_reward.to_string(),
                v.title.to_string(),
            ]
        })
        .collect();
    print_table(&["", "ID", "XP", "TITLE"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let catalog = super::load_achievements(root, &config)?;
    let unlocks = UnlockRecord::load(root).context("failed to load unlock record")?;
    let a = catalog.get(id)?;

    let view = AchievementView {
        id: &a.id,
        title: &a.title,
        description: &a.description,
        xp_reward: a.xp_reward,
        condition: a.condition.to_string(),
        unlocked: unlocks.is_unlocked(&a.id),
        unlocked_at: unlocks.unlocked_at(&a.id).map(|t| t.to_rfc3339()),
    };

    if json {
        return print_json(&view);
    }

    println!("{} [{}]", view.title, view.id);
    if !view.description.is_empty() {
        println!("  {}", view.description);
    }
    println!("Reward:    {} XP", view.xp_reward);
    println!("Condition: {}", view.condition);
    match view.unlocked_at {
        Some(at) => println!("Unlocked:  {at}"),
        None => println!("Unlocked:  no"),
    }
    Ok(())
}
