use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use levelup_core::{
    config::Config,
    quest::{complete_quest, QuestInstance},
    types::{GrantSource, QuestOutcome},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum QuestSubcommand {
    /// List quests available to start
    List,
    /// Start a new attempt at a quest
    Start { quest_id: String },
    /// Mark one objective of an active quest done
    Objective {
        /// Instance id or unambiguous prefix
        instance: String,
        objective: String,
    },
    /// Complete an active quest and collect its rewards
    Complete { instance: String },
    /// Fail an active quest (no rewards)
    Fail { instance: String },
    /// List quest attempts
    Active {
        /// Include completed and failed attempts
        #[arg(long)]
        all: bool,
    },
    /// Show one quest attempt
    Show { instance: String },
}

pub fn run(root: &Path, subcmd: QuestSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        QuestSubcommand::List => list(root, json),
        QuestSubcommand::Start { quest_id } => start(root, &quest_id, json),
        QuestSubcommand::Objective {
            instance,
            objective,
        } => objective_done(root, &instance, &objective, json),
        QuestSubcommand::Complete { instance } => {
            close(root, &instance, QuestOutcome::Completed, json)
        }
        QuestSubcommand::Fail { instance } => close(root, &instance, QuestOutcome::Failed, json),
        QuestSubcommand::Active { all } => active(root, all, json),
        QuestSubcommand::Show { instance } => show(root, &instance, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let catalog = super::load_quests(root, &config)?;

    if json {
        let defs: Vec<_> = catalog.iter().collect();
        return print_json(&defs);
    }

    let rows = catalog
        .iter()
        .map(|q| {
            let skills = q
                .rewards
                .skills
                .iter()
                .map(|(s, n)| format!("{s}+{n}"))
                .collect::<Vec<_>>()
                .join(" ");
            vec![
                q.id.clone(),
                q.rewards.xp.to_string(),
                skills,
                q.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "XP", "SKILLS", "TITLE"], rows);
    Ok(())
}

fn start(root: &Path, quest_id: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let catalog = super::load_quests(root, &config)?;
    let def = catalog.get(quest_id)?;

    let instance = QuestInstance::start(def);
    instance
        .save(root)
        .with_context(|| format!("failed to save quest '{quest_id}'"))?;
    tracing::info!(quest = %quest_id, instance = %instance.short_id(), "quest started");

    if json {
        return print_json(&instance);
    }
    println!("Started: {} [{}]", instance.title, instance.short_id());
    Ok(())
}

fn objective_done(root: &Path, id: &str, objective: &str, json: bool) -> anyhow::Result<()> {
    let mut instance = QuestInstance::find(root, id)?;
    instance.complete_objective(objective)?;
    instance
        .save(root)
        .with_context(|| format!("failed to save quest instance '{id}'"))?;

    if json {
        return print_json(&instance);
    }
    println!(
        "{} [{}]: {} ({})",
        instance.title,
        instance.short_id(),
        objective,
        instance.summarize()
    );
    Ok(())
}

fn close(root: &Path, id: &str, outcome: QuestOutcome, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut instance = QuestInstance::find(root, id)?;

    let grants = complete_quest(&mut instance, outcome)?;
    instance
        .save(root)
        .with_context(|| format!("failed to save quest instance '{id}'"))?;
    let (player, level_up) = super::settle_grants(root, &config, GrantSource::Quest, &grants)?;

    if json {
        return print_json(&serde_json::json!({
            "instance": instance.id,
            "quest": instance.quest_id,
            "status": instance.status,
            "grants": grants,
            "xp": player.xp,
            "level": player.level().level,
            "level_up": level_up,
        }));
    }

    match outcome {
        QuestOutcome::Completed => {
            println!("Completed: {} [{}]", instance.title, instance.short_id());
            for grant in &grants {
                if grant.xp_delta > 0 {
                    println!("  +{} XP", grant.xp_delta);
                }
                for (skill, n) in &grant.skill_deltas {
                    println!("  +{n} {skill}");
                }
            }
            println!("XP: {}", player.xp);
        }
        QuestOutcome::Failed => {
            println!("Failed: {} [{}]", instance.title, instance.short_id());
        }
    }
    super::print_level_up(&level_up);
    Ok(())
}

fn active(root: &Path, all: bool, json: bool) -> anyhow::Result<()> {
    let quests: Vec<QuestInstance> = QuestInstance::list(root)
        .context("failed to list quests")?
        .into_iter()
        .filter(|q| all || q.is_active())
        .collect();

    if json {
        return print_json(&quests);
    }

    if quests.is_empty() {
        println!("No active quests.");
        return Ok(());
    }

    let rows = quests
        .iter()
        .map(|q| {
            vec![
                q.short_id().to_string(),
                q.quest_id.clone(),
                q.status.to_string(),
                q.summarize(),
                q.started_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "QUEST", "STATUS", "PROGRESS", "STARTED"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let instance = QuestInstance::find(root, id)?;

    if json {
        return print_json(&instance);
    }

    println!("{} [{}]", instance.title, instance.id);
    println!("Quest:   {}", instance.quest_id);
    println!("Status:  {}", instance.status);
    println!("Started: {}", instance.started_at.to_rfc3339());
    if let Some(ended) = instance.ended_at {
        println!("Ended:   {}", ended.to_rfc3339());
    }
    if !instance.objectives.is_empty() {
        println!("\nObjectives ({}):", instance.summarize());
        for o in &instance.objectives {
            println!("  [{}] {}", if o.done { "x" } else { " " }, o.id);
        }
    }
    Ok(())
}
