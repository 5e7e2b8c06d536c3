pub mod achievement;
pub mod config;
pub mod evaluate;
pub mod init;
pub mod invite;
pub mod quest;
pub mod status;

use anyhow::Context;
use levelup_core::{
    achievement::AchievementCatalog,
    channel::{drain, GrantChannel},
    config::Config,
    player::{LevelUp, PlayerRecord},
    quest::QuestCatalog,
    reward::RewardGrant,
    types::GrantSource,
};
use std::path::Path;

pub(crate) fn load_achievements(
    root: &Path,
    config: &Config,
) -> anyhow::Result<AchievementCatalog> {
    AchievementCatalog::load(root, config.catalog.achievements.as_deref())
        .context("failed to load achievement catalog")
}

pub(crate) fn load_quests(root: &Path, config: &Config) -> anyhow::Result<QuestCatalog> {
    QuestCatalog::load(root, config.catalog.quests.as_deref())
        .context("failed to load quest catalog")
}

/// Publish `grants` on a fresh channel and credit whatever the player
/// subscription receives. Returns the saved player and any level change.
pub(crate) fn settle_grants(
    root: &Path,
    config: &Config,
    source: GrantSource,
    grants: &[RewardGrant],
) -> anyhow::Result<(PlayerRecord, Option<LevelUp>)> {
    let mut player = PlayerRecord::load(root).context("failed to load player record")?;
    if grants.is_empty() {
        return Ok((player, None));
    }

    let channel = GrantChannel::new(config.channel.capacity);
    let mut inbox = channel.subscribe();

    let mut received = Vec::with_capacity(grants.len());
    for grant in grants {
        channel.publish(source, grant.clone());
        received.extend(drain(&mut inbox).into_iter().map(|event| event.grant));
    }
    let level_up = player.apply_all(&received);

    player.save(root).context("failed to save player record")?;
    Ok((player, level_up))
}

pub(crate) fn print_level_up(level_up: &Option<LevelUp>) {
    if let Some(up) = level_up {
        println!("Level up! {} -> {} ({})", up.from, up.to, up.title);
    }
}
