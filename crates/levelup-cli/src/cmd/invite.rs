use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use levelup_core::{
    config::Config,
    invite::{is_valid_invite_code, InviteBook},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum InviteSubcommand {
    /// Issue a new invite code
    New {
        /// Who the code is for
        #[arg(long)]
        note: Option<String>,
    },
    /// List issued invite codes
    List,
    /// Check whether a code is well-formed and was issued here
    Check { code: String },
}

pub fn run(root: &Path, subcmd: InviteSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        InviteSubcommand::New { note } => issue(root, note, json),
        InviteSubcommand::List => list(root, json),
        InviteSubcommand::Check { code } => check(root, &code, json),
    }
}

fn issue(root: &Path, note: Option<String>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut book = InviteBook::load(root).context("failed to load invites")?;

    let invite = book
        .issue(note, config.invites.max_attempts)
        .context("failed to issue invite code")?
        .clone();
    book.save(root).context("failed to save invites")?;

    if json {
        return print_json(&invite);
    }
    println!("{}", invite.code);
    Ok(())
}

fn check(root: &Path, code: &str, json: bool) -> anyhow::Result<()> {
    let well_formed = is_valid_invite_code(code);
    let issued = well_formed
        && InviteBook::load(root)
            .context("failed to load invites")?
            .contains(code);

    if json {
        print_json(&serde_json::json!({
            "code": code,
            "well_formed": well_formed,
            "issued": issued,
        }))?;
    } else if !well_formed {
        println!("{code}: not a valid invite code");
    } else if !issued {
        println!("{code}: well-formed but never issued");
    } else {
        println!("{code}: issued");
    }

    if !issued {
        anyhow::bail!("invite code '{code}' is not usable");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let book = InviteBook::load(root).context("failed to load invites")?;

    if json {
        return print_json(&book.invites);
    }

    if book.invites.is_empty() {
        println!("No invites issued.");
        return Ok(());
    }

    let rows = book
        .invites
        .iter()
        .map(|i| {
            vec![
                i.code.clone(),
                i.created_at.format("%Y-%m-%d %H:%M").to_string(),
                i.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["CODE", "ISSUED", "NOTE"], rows);
    Ok(())
}
