//! Sync engine orchestration
//!
//! One task per session owns the observed list collection. Snapshot pushes
//! from the store subscription and mutation commands from [`EngineHandle`]s
//! are merged onto that task, snapshots first, so there is no locking over
//! the collection and a push always beats an in-flight command.

use crate::events::{EngineCommand, EngineEvent, EngineStatus, SessionState};
use crate::mapping;
use crate::ordering;
use crate::profile::ProfileCache;
use crate::rewards::{RewardStatus, RewardTracker};
use rand::Rng;
use serde_json::json;
use std::sync::Arc;
use tally_common::{Feedback, Item, List, Result, TallyError};
use tally_common::validate;
use tally_store::{collections, DocumentStore, Query, Snapshot};
use tokio::sync::{broadcast, mpsc, oneshot};

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 64;
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cloneable API surface of a running engine session
#[derive(Clone, Debug)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    events: broadcast::Sender<EngineEvent>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> EngineCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| TallyError::EngineClosed)?;
        rx.await.map_err(|_| TallyError::EngineClosed)
    }

    /// Create a new list owned by the session user
    pub async fn create_list(&self, name: &str) -> Result<List> {
        let name = name.to_string();
        self.request(|reply| EngineCommand::CreateList { name, reply })
            .await?
    }

    /// Join a list by its share code (the list id)
    pub async fn join_list(&self, code: &str) -> Result<List> {
        let code = code.to_string();
        self.request(|reply| EngineCommand::JoinList { code, reply })
            .await?
    }

    pub async fn rename_list(&self, list_id: &str, name: &str) -> Result<()> {
        let (list_id, name) = (list_id.to_string(), name.to_string());
        self.request(|reply| EngineCommand::RenameList {
            list_id,
            name,
            reply,
        })
        .await?
    }

    pub async fn set_theme(
        &self,
        list_id: &str,
        emoji: Option<String>,
        color: Option<String>,
    ) -> Result<()> {
        let list_id = list_id.to_string();
        self.request(|reply| EngineCommand::SetTheme {
            list_id,
            emoji,
            color,
            reply,
        })
        .await?
    }

    /// Append a new item and bump the items-created counter
    pub async fn add_item(&self, list_id: &str, text: &str) -> Result<Item> {
        let (list_id, text) = (list_id.to_string(), text.to_string());
        self.request(|reply| EngineCommand::AddItem {
            list_id,
            text,
            reply,
        })
        .await?
    }

    /// Replace a list's items wholesale, in the given order (manual reorder)
    pub async fn update_items(&self, list_id: &str, items: Vec<Item>) -> Result<()> {
        let list_id = list_id.to_string();
        self.request(|reply| EngineCommand::UpdateItems {
            list_id,
            items,
            reply,
        })
        .await?
    }

    pub async fn set_done(&self, list_id: &str, item_id: &str, done: bool) -> Result<()> {
        let (list_id, item_id) = (list_id.to_string(), item_id.to_string());
        self.request(|reply| EngineCommand::SetDone {
            list_id,
            item_id,
            done,
            reply,
        })
        .await?
    }

    pub async fn delete_item(&self, list_id: &str, item_id: &str) -> Result<()> {
        let (list_id, item_id) = (list_id.to_string(), item_id.to_string());
        self.request(|reply| EngineCommand::DeleteItem {
            list_id,
            item_id,
            reply,
        })
        .await?
    }

    pub async fn delete_list(&self, list_id: &str) -> Result<()> {
        let list_id = list_id.to_string();
        self.request(|reply| EngineCommand::DeleteList { list_id, reply })
            .await?
    }

    /// Remove the session user from a list's member set
    pub async fn leave_list(&self, list_id: &str) -> Result<()> {
        let list_id = list_id.to_string();
        self.request(|reply| EngineCommand::LeaveList { list_id, reply })
            .await?
    }

    pub async fn submit_feedback(&self, kind: &str, message: &str) -> Result<()> {
        let (kind, message) = (kind.to_string(), message.to_string());
        self.request(|reply| EngineCommand::SubmitFeedback {
            kind,
            message,
            reply,
        })
        .await?
    }

    /// The currently observed lists, sorted items included
    pub async fn lists(&self) -> Result<Vec<List>> {
        self.request(|reply| EngineCommand::Lists { reply }).await
    }

    pub async fn status(&self) -> Result<EngineStatus> {
        self.request(|reply| EngineCommand::Status { reply }).await
    }

    pub async fn reward_status(&self) -> Result<RewardStatus> {
        self.request(|reply| EngineCommand::RewardStatus { reply })
            .await
    }

    /// Subscribe to engine events (sync pushes, remote errors, reward unlocks)
    pub fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Tear the session down: unsubscribes from the store and ends the task.
    /// Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        if self
            .commands
            .send(EngineCommand::Shutdown { reply })
            .await
            .is_err()
        {
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }
}

/// The engine task state. Constructed through [`ListEngine::spawn`].
pub struct ListEngine {
    store: Arc<dyn DocumentStore>,
    user_id: String,
    lists: Vec<List>,
    state: SessionState,
    loading: bool,
    profile: ProfileCache,
    rewards: RewardTracker,
    events: broadcast::Sender<EngineEvent>,
    commands: mpsc::Receiver<EngineCommand>,
    snapshots: broadcast::Receiver<Snapshot>,
    subscription_open: bool,
}

impl ListEngine {
    /// Start a session for `user_id`: fetch the profile counter once, open
    /// the membership live query and spawn the reducer task.
    pub async fn spawn(
        store: Arc<dyn DocumentStore>,
        user_id: impl Into<String>,
    ) -> Result<EngineHandle> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(TallyError::Auth("user id is empty".to_string()));
        }

        // Counter source of truth: one profile fetch at session start
        let profile = match store.get(collections::USERS, &user_id).await {
            Ok(Some(doc)) => ProfileCache::from_document(&user_id, &doc),
            Ok(None) => {
                // First session for this user: seed the profile document
                if let Err(e) = store
                    .merge(
                        collections::USERS,
                        &user_id,
                        json!({"userId": user_id.clone()}),
                    )
                    .await
                {
                    tracing::warn!("could not seed profile document: {}", e);
                }
                ProfileCache::empty(&user_id)
            }
            Err(e) => {
                tracing::warn!("profile fetch failed, starting with empty cache: {}", e);
                ProfileCache::empty(&user_id)
            }
        };
        let rewards = RewardTracker::new(profile.items_created());

        let query = Query::array_contains(collections::LISTS, "users", &user_id);
        let snapshots = store
            .subscribe(query)
            .await
            .map_err(|e| TallyError::Remote(e.to_string()))?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let engine = ListEngine {
            store,
            user_id,
            lists: Vec::new(),
            state: SessionState::Subscribing,
            loading: true,
            profile,
            rewards,
            events: event_tx.clone(),
            commands: command_rx,
            snapshots,
            subscription_open: true,
        };

        tokio::spawn(engine.run());

        Ok(EngineHandle {
            commands: command_tx,
            events: event_tx,
        })
    }

    /// Reducer loop. Snapshots are polled first so a pending push always
    /// lands before the next mutation is processed.
    async fn run(mut self) {
        tracing::info!("session started for {}", self.user_id);
        loop {
            tokio::select! {
                biased;

                snapshot = self.snapshots.recv(), if self.subscription_open => {
                    match snapshot {
                        Ok(snapshot) => self.apply_snapshot(snapshot),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Only the latest full-replace snapshot matters
                            tracing::warn!("snapshot stream lagged, skipped {}", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::warn!("store subscription ended");
                            self.subscription_open = false;
                            self.loading = false;
                        }
                    }
                }

                command = self.commands.recv() => {
                    match command {
                        Some(command) => {
                            if self.handle_command(command).await {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }
        tracing::info!("session ended for {}", self.user_id);
        let _ = self.events.send(EngineEvent::Closed);
    }

    /// Full-replace: every push rebuilds the observed collection from the
    /// raw documents. Optimistic edits not yet visible server-side may be
    /// transiently overwritten and corrected by the next push.
    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.lists = snapshot.documents.iter().map(mapping::map_list).collect();
        self.loading = false;
        self.state = SessionState::Synced;
        tracing::debug!("snapshot applied: {} lists", self.lists.len());
        let _ = self.events.send(EngineEvent::Synced {
            lists: self.lists.len(),
        });
    }

    /// Returns true when the engine should shut down
    async fn handle_command(&mut self, command: EngineCommand) -> bool {
        match command {
            EngineCommand::CreateList { name, reply } => {
                let _ = reply.send(self.create_list(&name).await);
            }
            EngineCommand::JoinList { code, reply } => {
                let _ = reply.send(self.join_list(&code).await);
            }
            EngineCommand::RenameList {
                list_id,
                name,
                reply,
            } => {
                let _ = reply.send(self.rename_list(&list_id, &name).await);
            }
            EngineCommand::SetTheme {
                list_id,
                emoji,
                color,
                reply,
            } => {
                let _ = reply.send(self.set_theme(&list_id, emoji, color).await);
            }
            EngineCommand::AddItem {
                list_id,
                text,
                reply,
            } => {
                let _ = reply.send(self.add_item(&list_id, &text).await);
            }
            EngineCommand::UpdateItems {
                list_id,
                items,
                reply,
            } => {
                let _ = reply.send(self.update_items(&list_id, items).await);
            }
            EngineCommand::SetDone {
                list_id,
                item_id,
                done,
                reply,
            } => {
                let _ = reply.send(self.set_done(&list_id, &item_id, done).await);
            }
            EngineCommand::DeleteItem {
                list_id,
                item_id,
                reply,
            } => {
                let _ = reply.send(self.delete_item(&list_id, &item_id).await);
            }
            EngineCommand::DeleteList { list_id, reply } => {
                let _ = reply.send(self.delete_list(&list_id).await);
            }
            EngineCommand::LeaveList { list_id, reply } => {
                let _ = reply.send(self.leave_list(&list_id).await);
            }
            EngineCommand::SubmitFeedback {
                kind,
                message,
                reply,
            } => {
                let _ = reply.send(self.submit_feedback(&kind, &message).await);
            }
            EngineCommand::Lists { reply } => {
                let _ = reply.send(self.lists.clone());
            }
            EngineCommand::Status { reply } => {
                let _ = reply.send(EngineStatus {
                    state: self.state,
                    loading: self.loading,
                });
            }
            EngineCommand::RewardStatus { reply } => {
                let _ = reply.send(self.rewards.status());
            }
            EngineCommand::Shutdown { reply } => {
                let _ = reply.send(());
                return true;
            }
        }
        false
    }

    /// Log a failed remote operation, broadcast it on the event channel and
    /// convert it into the engine error type.
    fn report_remote<T>(
        &self,
        op: &'static str,
        result: tally_store::Result<T>,
    ) -> Result<T> {
        result.map_err(|e| {
            tracing::error!("{} failed: {}", op, e);
            let _ = self.events.send(EngineEvent::RemoteError {
                op,
                message: e.to_string(),
            });
            TallyError::Remote(e.to_string())
        })
    }

    fn list_index(&self, list_id: &str) -> Result<usize> {
        self.lists
            .iter()
            .position(|l| l.id == list_id)
            .ok_or_else(|| TallyError::NotFound {
                list_id: list_id.to_string(),
            })
    }

    async fn persist_items(&mut self, op: &'static str, idx: usize) -> Result<()> {
        let list_id = self.lists[idx].id.clone();
        let items = mapping::items_field(&self.lists[idx].items);
        let result = self
            .store
            .merge(collections::LISTS, &list_id, json!({ "items": items }))
            .await;
        self.report_remote(op, result)
    }

    async fn create_list(&mut self, name: &str) -> Result<List> {
        let name = validate::validate_list_name(name)?;
        let list = List {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            items: Vec::new(),
            users: vec![self.user_id.clone()],
            emoji: None,
            color: None,
        };
        tracing::info!("creating list '{}' ({})", list.name, list.id);
        let result = self
            .store
            .set(collections::LISTS, &list.id, mapping::list_fields(&list))
            .await;
        self.report_remote("create list", result)?;
        Ok(list)
    }

    async fn join_list(&mut self, code: &str) -> Result<List> {
        let list_id = validate::validate_join_code(code)?;

        if self.lists.iter().any(|l| l.id == list_id) {
            return Err(TallyError::AlreadyMember { list_id });
        }

        let result = self.store.get(collections::LISTS, &list_id).await;
        let Some(doc) = self.report_remote("join list", result)? else {
            return Err(TallyError::NotFound { list_id });
        };

        let mut list = mapping::map_list(&doc);
        if !list.has_member(&self.user_id) {
            list.users.push(self.user_id.clone());
        }

        // Optimistic: the joined list shows up locally before the write lands
        self.lists.push(list.clone());
        tracing::info!("joined list '{}' ({})", list.name, list.id);

        // Whole-array write: concurrent joins race on this field and the
        // last writer wins. Accepted limitation, not merged.
        let result = self
            .store
            .merge(
                collections::LISTS,
                &list_id,
                json!({ "users": list.users }),
            )
            .await;
        self.report_remote("join list", result)?;
        Ok(list)
    }

    async fn rename_list(&mut self, list_id: &str, name: &str) -> Result<()> {
        let name = validate::validate_list_name(name)?;
        let idx = self.list_index(list_id)?;
        self.lists[idx].name = name.clone();
        let result = self
            .store
            .merge(collections::LISTS, list_id, json!({ "name": name }))
            .await;
        self.report_remote("rename list", result)
    }

    async fn set_theme(
        &mut self,
        list_id: &str,
        emoji: Option<String>,
        color: Option<String>,
    ) -> Result<()> {
        let idx = self.list_index(list_id)?;

        let mut patch = serde_json::Map::new();
        if let Some(emoji) = emoji {
            self.lists[idx].emoji = Some(emoji.clone());
            patch.insert("emoji".to_string(), json!(emoji));
        }
        if let Some(color) = color {
            self.lists[idx].color = Some(color.clone());
            patch.insert("color".to_string(), json!(color));
        }
        if patch.is_empty() {
            return Ok(());
        }

        let result = self
            .store
            .merge(collections::LISTS, list_id, serde_json::Value::Object(patch))
            .await;
        self.report_remote("set theme", result)
    }

    async fn add_item(&mut self, list_id: &str, text: &str) -> Result<Item> {
        let text = validate::validate_item_name(text)?;
        let idx = self.list_index(list_id)?;

        let item = Item {
            id: new_item_id(),
            text,
            done: false,
            order: ordering::next_order(&self.lists[idx].items),
        };
        self.lists[idx].items.push(item.clone());
        self.persist_items("add item", idx).await?;

        // Optimistic bump ahead of the authoritative server-side increment
        let optimistic = self.profile.record_item_created();
        self.check_rewards(optimistic);

        let result = self
            .store
            .increment(collections::USERS, &self.user_id, "totalItemsCreated", 1)
            .await;
        match result {
            Ok(total) => {
                self.profile.set_items_created(total as u64);
                self.check_rewards(total as u64);
            }
            Err(e) => {
                // The item was created; the counter catches up on the next
                // successful increment. Reported, not fatal.
                tracing::error!("counter increment failed: {}", e);
                let _ = self.events.send(EngineEvent::RemoteError {
                    op: "increment counter",
                    message: e.to_string(),
                });
            }
        }

        Ok(item)
    }

    async fn update_items(&mut self, list_id: &str, items: Vec<Item>) -> Result<()> {
        let idx = self.list_index(list_id)?;
        self.lists[idx].items = items;
        self.persist_items("update items", idx).await
    }

    async fn set_done(&mut self, list_id: &str, item_id: &str, done: bool) -> Result<()> {
        let idx = self.list_index(list_id)?;

        let moved = if done {
            ordering::complete(&mut self.lists[idx].items, item_id)
        } else {
            ordering::uncomplete(&mut self.lists[idx].items, item_id)
        };
        if moved.is_none() {
            return Err(TallyError::ItemNotFound {
                list_id: list_id.to_string(),
                item_id: item_id.to_string(),
            });
        }

        let op = if done { "mark done" } else { "mark not done" };
        self.persist_items(op, idx).await
    }

    async fn delete_item(&mut self, list_id: &str, item_id: &str) -> Result<()> {
        let idx = self.list_index(list_id)?;

        let before = self.lists[idx].items.len();
        self.lists[idx].items.retain(|i| i.id != item_id);
        if self.lists[idx].items.len() == before {
            return Err(TallyError::ItemNotFound {
                list_id: list_id.to_string(),
                item_id: item_id.to_string(),
            });
        }

        // Remaining orders keep their gaps; ordering is relative
        self.persist_items("delete item", idx).await
    }

    async fn delete_list(&mut self, list_id: &str) -> Result<()> {
        let idx = self.list_index(list_id)?;
        let list = self.lists.remove(idx);
        tracing::info!("deleting list '{}' ({})", list.name, list.id);

        let result = self.store.delete(collections::LISTS, list_id).await;
        self.report_remote("delete list", result)
    }

    async fn leave_list(&mut self, list_id: &str) -> Result<()> {
        let idx = self.list_index(list_id)?;

        let mut users = self.lists[idx].users.clone();
        users.retain(|u| u != &self.user_id);
        self.lists.remove(idx);
        tracing::info!("leaving list {}", list_id);

        let result = self
            .store
            .merge(collections::LISTS, list_id, json!({ "users": users }))
            .await;
        self.report_remote("leave list", result)
    }

    async fn submit_feedback(&mut self, kind: &str, message: &str) -> Result<()> {
        let feedback = Feedback {
            user_id: self.user_id.clone(),
            kind: kind.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            app_version: APP_VERSION.to_string(),
            status: "new".to_string(),
        };
        let id = uuid::Uuid::new_v4().to_string();
        let fields = serde_json::to_value(&feedback)?;
        let result = self.store.set(collections::FEEDBACK, &id, fields).await;
        self.report_remote("submit feedback", result)
    }

    fn check_rewards(&mut self, counter: u64) {
        if let Some(tier) = self.rewards.set_counter(counter) {
            tracing::info!("reward unlocked: {} ({})", tier.title, tier.id);
            let tier_id = tier.id.to_string();
            let _ = self.events.send(EngineEvent::RewardUnlocked { tier_id });
        }
    }
}

/// Item ids only need to be unique within their parent list
fn new_item_id() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::MemoryStore;

    #[tokio::test]
    async fn test_spawn_rejects_empty_user() {
        let store = Arc::new(MemoryStore::new());
        let err = ListEngine::spawn(store, "").await.unwrap_err();
        assert!(matches!(err, TallyError::Auth(_)));
    }

    #[tokio::test]
    async fn test_item_id_shape() {
        let id = new_item_id();
        assert_eq!(id.len(), 6);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let engine = ListEngine::spawn(store, "u1").await.unwrap();

        engine.shutdown().await.unwrap();
        engine.shutdown().await.unwrap();

        let err = engine.lists().await.unwrap_err();
        assert!(matches!(err, TallyError::EngineClosed));
    }
}
