use crate::output::print_json;
use anyhow::Context;
use levelup_core::{
    config::Config, evaluator::Evaluator, snapshot::ProgressReport, types::GrantSource,
    unlock::UnlockRecord,
};
use std::io::Read;
use std::path::Path;

pub fn run(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let catalog = super::load_achievements(root, &config)?;
    let unlocks = UnlockRecord::load(root).context("failed to load unlock record")?;

    let report = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read snapshot from stdin")?;
        ProgressReport::parse(&buf)
    } else {
        ProgressReport::load(file)
    }
    .with_context(|| format!("failed to read snapshot {}", file.display()))?;

    let evaluation = Evaluator::new(&catalog)
        .evaluate(&report, &unlocks)
        .context("snapshot rejected")?;

    // Unlocks are written before grants are applied: a crash in between loses
    // a reward rather than paying it twice on the next run.
    if !evaluation.is_empty() {
        evaluation
            .unlocks
            .save(root)
            .context("failed to save unlock record")?;
    }
    let (player, level_up) =
        super::settle_grants(root, &config, GrantSource::Achievement, &evaluation.grants)?;

    if json {
        return print_json(&serde_json::json!({
            "unlocked": evaluation.newly_unlocked,
            "grants": evaluation.grants,
            "xp_gained": evaluation.total_xp(),
            "xp": player.xp,
            "level": player.level().level,
            "level_up": level_up,
        }));
    }

    if evaluation.newly_unlocked.is_empty() {
        println!("No new achievements.");
    } else {
        for id in &evaluation.newly_unlocked {
            let def = catalog.get(id)?;
            println!("Unlocked: {} (+{} XP)", def.title, def.xp_reward);
        }
        println!("XP: {} (+{})", player.xp, evaluation.total_xp());
    }
    super::print_level_up(&level_up);
    Ok(())
}
