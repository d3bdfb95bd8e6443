//! Command implementations
//!
//! Each invocation opens the file-backed store, runs one engine session,
//! performs its operation and shuts the session down. Human output goes to
//! stdout, logs to stderr.

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tally_common::{Item, List};
use tally_config::Config;
use tally_core::{EngineHandle, ListEngine};
use tally_store::FileStore;

struct Session {
    engine: EngineHandle,
}

impl Session {
    async fn open() -> Result<Self> {
        let root = std::env::current_dir()?;
        let config = Config::load(&root)?;
        let user_id = config.require_user()?.to_string();

        let store = Arc::new(
            FileStore::open(config.store_path())
                .await
                .context("could not open store")?,
        );
        let engine = ListEngine::spawn(store, user_id).await?;
        Ok(Self { engine })
    }

    async fn close(self) -> Result<()> {
        self.engine.shutdown().await?;
        Ok(())
    }
}

fn resolve_list<'a>(lists: &'a [List], needle: &str) -> Result<&'a List> {
    lists
        .iter()
        .find(|l| l.id == needle)
        .or_else(|| lists.iter().find(|l| l.name.eq_ignore_ascii_case(needle)))
        .ok_or_else(|| anyhow!("no list matching '{}'", needle))
}

fn resolve_item<'a>(list: &'a List, needle: &str) -> Result<&'a Item> {
    list.items
        .iter()
        .find(|i| i.id == needle)
        .or_else(|| list.items.iter().find(|i| i.text.eq_ignore_ascii_case(needle)))
        .ok_or_else(|| anyhow!("no item matching '{}' in '{}'", needle, list.name))
}

pub async fn cmd_init(name: &str) -> Result<()> {
    let root = std::env::current_dir()?;
    let config = Config::init(&root, name)?;
    println!("Session initialized");
    println!("User id: {}", config.session.user_id);
    Ok(())
}

pub async fn cmd_create(name: &str) -> Result<()> {
    let session = Session::open().await?;
    let list = session.engine.create_list(name).await?;

    println!("Created '{}'", list.name);
    println!("Share code: {}", list.id);
    println!("Invite link: /join/{}", list.id);

    session.close().await
}

pub async fn cmd_join(code: &str) -> Result<()> {
    // accept both a bare share code and a /join/{code} invite link
    let code = code.rsplit('/').next().unwrap_or(code);

    let session = Session::open().await?;
    let list = session.engine.join_list(code).await?;

    println!("Joined '{}' ({} members)", list.name, list.users.len());

    session.close().await
}

pub async fn cmd_lists(json: bool) -> Result<()> {
    let session = Session::open().await?;
    let lists = session.engine.lists().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&lists)?);
    } else if lists.is_empty() {
        println!("No lists yet. Try 'tally create <name>'.");
    } else {
        for list in &lists {
            let done = list.items.iter().filter(|i| i.done).count();
            let emoji = list.emoji.as_deref().unwrap_or("");
            println!(
                "{}{} ({}/{} done)  [{}]",
                if emoji.is_empty() {
                    String::new()
                } else {
                    format!("{} ", emoji)
                },
                list.name,
                done,
                list.items.len(),
                list.id
            );
            for item in &list.items {
                let mark = if item.done { "x" } else { " " };
                println!("  [{}] {}  {}", mark, item.id, item.text);
            }
        }
    }

    session.close().await
}

pub async fn cmd_add(list: &str, text: &str) -> Result<()> {
    let session = Session::open().await?;
    let lists = session.engine.lists().await?;
    let list = resolve_list(&lists, list)?;

    let item = session.engine.add_item(&list.id, text).await?;
    println!("Added '{}' to '{}'", item.text, list.name);

    session.close().await
}

pub async fn cmd_set_done(list: &str, item: &str, done: bool) -> Result<()> {
    let session = Session::open().await?;
    let lists = session.engine.lists().await?;
    let list = resolve_list(&lists, list)?;
    let item = resolve_item(list, item)?;

    session.engine.set_done(&list.id, &item.id, done).await?;
    println!(
        "{} '{}'",
        if done { "Completed" } else { "Reopened" },
        item.text
    );

    session.close().await
}

pub async fn cmd_move(list: &str, item: &str, position: usize) -> Result<()> {
    let session = Session::open().await?;
    let lists = session.engine.lists().await?;
    let list = resolve_list(&lists, list)?;
    let item_id = resolve_item(list, item)?.id.clone();

    let mut items = list.items.clone();
    let from = items
        .iter()
        .position(|i| i.id == item_id)
        .ok_or_else(|| anyhow!("no item matching '{}'", item))?;
    let moved = items.remove(from);
    let position = position.min(items.len());
    items.insert(position, moved);
    for (pos, entry) in items.iter_mut().enumerate() {
        entry.order = pos as i64;
    }

    session.engine.update_items(&list.id, items).await?;
    println!("Moved item to position {}", position);

    session.close().await
}

pub async fn cmd_rm(list: &str, item: &str) -> Result<()> {
    let session = Session::open().await?;
    let lists = session.engine.lists().await?;
    let list = resolve_list(&lists, list)?;
    let item = resolve_item(list, item)?;

    session.engine.delete_item(&list.id, &item.id).await?;
    println!("Removed '{}'", item.text);

    session.close().await
}

pub async fn cmd_rename(list: &str, name: &str) -> Result<()> {
    let session = Session::open().await?;
    let lists = session.engine.lists().await?;
    let list = resolve_list(&lists, list)?;

    session.engine.rename_list(&list.id, name).await?;
    println!("Renamed '{}' to '{}'", list.name, name.trim());

    session.close().await
}

pub async fn cmd_theme(list: &str, emoji: Option<String>, color: Option<String>) -> Result<()> {
    let session = Session::open().await?;
    let lists = session.engine.lists().await?;
    let list = resolve_list(&lists, list)?;

    if let Some(color) = &color {
        let rewards = session.engine.reward_status().await?;
        if !rewards.unlocked_colors.iter().any(|c| *c == color.as_str()) {
            return Err(anyhow!(
                "color '{}' is not unlocked yet (unlocked: {})",
                color,
                rewards.unlocked_colors.join(", ")
            ));
        }
    }

    session.engine.set_theme(&list.id, emoji, color).await?;
    println!("Updated theme of '{}'", list.name);

    session.close().await
}

pub async fn cmd_drop(list: &str) -> Result<()> {
    let session = Session::open().await?;
    let lists = session.engine.lists().await?;
    let list = resolve_list(&lists, list)?;

    session.engine.delete_list(&list.id).await?;
    println!("Deleted '{}'", list.name);

    session.close().await
}

pub async fn cmd_leave(list: &str) -> Result<()> {
    let session = Session::open().await?;
    let lists = session.engine.lists().await?;
    let list = resolve_list(&lists, list)?;

    session.engine.leave_list(&list.id).await?;
    println!("Left '{}'", list.name);

    session.close().await
}

pub async fn cmd_rewards() -> Result<()> {
    let session = Session::open().await?;
    let status = session.engine.reward_status().await?;

    println!(
        "Current tier: {} ({} items created)",
        status.current.title, status.counter
    );
    match status.next {
        Some(next) => {
            let percent = (status.progress * 100.0).round() as u32;
            println!(
                "Next tier: {} at {} items ({}%)",
                next.title, next.threshold, percent
            );
        }
        None => println!("All tiers unlocked"),
    }
    println!("Unlocked colors: {}", status.unlocked_colors.join(", "));

    session.close().await
}

pub async fn cmd_feedback(kind: &str, message: &str) -> Result<()> {
    let session = Session::open().await?;
    session.engine.submit_feedback(kind, message).await?;
    println!("Thanks, feedback sent!");
    session.close().await
}
