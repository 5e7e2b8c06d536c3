use anyhow::Context;
use levelup_core::{
    achievement::AchievementCatalog, config::Config, io, paths, player::PlayerRecord,
    quest::QuestCatalog, unlock::UnlockRecord,
};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let player_name = name
        .map(str::to_string)
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "player".to_string());

    println!("Initializing levelup in: {}", root.display());

    for dir in [paths::LEVELUP_DIR, paths::CATALOG_DIR, paths::QUESTS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    if !paths::config_path(root).exists() {
        Config::new(&player_name)
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    if !paths::achievements_path(root).exists() {
        AchievementCatalog::builtin()
            .save(&paths::achievements_path(root))
            .context("failed to write achievement catalog")?;
        println!("  created: {}", paths::ACHIEVEMENTS_FILE);
    } else {
        println!("  exists:  {}", paths::ACHIEVEMENTS_FILE);
    }

    if !paths::quest_catalog_path(root).exists() {
        QuestCatalog::builtin()
            .save(&paths::quest_catalog_path(root))
            .context("failed to write quest catalog")?;
        println!("  created: {}", paths::QUEST_CATALOG_FILE);
    } else {
        println!("  exists:  {}", paths::QUEST_CATALOG_FILE);
    }

    if !paths::unlocks_path(root).exists() {
        UnlockRecord::new()
            .save(root)
            .context("failed to write unlocks.yaml")?;
        println!("  created: {}", paths::UNLOCKS_FILE);
    } else {
        println!("  exists:  {}", paths::UNLOCKS_FILE);
    }

    if !paths::player_path(root).exists() {
        PlayerRecord::new(&player_name)
            .save(root)
            .context("failed to write player.yaml")?;
        println!("  created: {}", paths::PLAYER_FILE);
    } else {
        println!("  exists:  {}", paths::PLAYER_FILE);
    }

    println!("\nNext: levelup evaluate <snapshot.yaml>  or  levelup quest list");
    Ok(())
}
