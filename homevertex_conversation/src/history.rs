//! In-memory conversation histories keyed by conversation id.
//!
//! Each id has its own slot lock, held for the whole turn: turns on the same
//! id run one after another while different ids proceed concurrently. A slot
//! for a brand-new id only becomes visible once its first turn commits.

use std::collections::HashMap;
use std::sync::Arc;

use homevertex_config::HistoryConfig;
use homevertex_core::{Content, new_conversation_id};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::debug;

use crate::session::ConversationSession;

struct Slot {
    session: Arc<Mutex<ConversationSession>>,
    last_used: Instant,
}

/// Exclusive access to one conversation for the duration of a turn.
pub struct Lease {
    id: String,
    is_new: bool,
    slot: Arc<Mutex<ConversationSession>>,
    guard: OwnedMutexGuard<ConversationSession>,
}

impl Lease {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.is_new
    }

    #[must_use]
    pub fn session(&self) -> &ConversationSession {
        &self.guard
    }
}

pub struct HistoryStore {
    config: HistoryConfig,
    slots: Mutex<HashMap<String, Slot>>,
}

impl HistoryStore {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the history for `requested`, or start a new conversation under a
    /// freshly generated id when `requested` is absent or unknown.
    pub async fn acquire(&self, requested: Option<&str>) -> Lease {
        let existing = {
            let mut slots = self.slots.lock().await;
            self.prune_idle(&mut slots);
            requested.and_then(|id| {
                slots.get_mut(id).map(|slot| {
                    slot.last_used = Instant::now();
                    (id.to_string(), Arc::clone(&slot.session))
                })
            })
        };

        if let Some((id, session)) = existing {
            let guard = Arc::clone(&session).lock_owned().await;
            return Lease {
                id,
                is_new: false,
                slot: session,
                guard,
            };
        }

        let id = new_conversation_id();
        if let Some(requested) = requested {
            debug!("Unknown conversation id {requested}, starting {id}");
        }
        let session = Arc::new(Mutex::new(ConversationSession::new(id.clone())));
        let guard = Arc::clone(&session).lock_owned().await;
        Lease {
            id,
            is_new: true,
            slot: session,
            guard,
        }
    }

    /// Store the history produced by a successful turn and release the lease.
    pub async fn commit(&self, lease: Lease, contents: Vec<Content>) {
        let Lease {
            id,
            slot,
            mut guard,
            ..
        } = lease;
        guard.replace_history(contents, self.config.max_exchange_turns);

        let mut slots = self.slots.lock().await;
        slots.insert(
            id,
            Slot {
                session: slot,
                last_used: Instant::now(),
            },
        );
        self.evict_over_capacity(&mut slots);
        drop(guard);
    }

    #[must_use]
    pub async fn contains(&self, id: &str) -> bool {
        self.slots.lock().await.contains_key(id)
    }

    #[must_use]
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    #[must_use]
    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    /// Copy of the stored turns for `id`, waiting for any running turn.
    pub async fn history(&self, id: &str) -> Option<Vec<Content>> {
        let session = {
            let slots = self.slots.lock().await;
            Arc::clone(&slots.get(id)?.session)
        };
        let contents = session.lock().await.contents.clone();
        Some(contents)
    }

    /// Drop conversations idle past the timeout; a zero timeout keeps them.
    fn prune_idle(&self, slots: &mut HashMap<String, Slot>) {
        let timeout = self.config.idle_timeout();
        if timeout.is_zero() {
            return;
        }
        let before = slots.len();
        slots.retain(|_, slot| slot.last_used.elapsed() < timeout);
        let pruned = before - slots.len();
        if pruned > 0 {
            debug!("Pruned {pruned} idle conversations");
        }
    }

    fn evict_over_capacity(&self, slots: &mut HashMap<String, Slot>) {
        let capacity = self.config.max_conversations.max(1);
        while slots.len() > capacity {
            let Some(oldest) = slots
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            debug!("Evicting least recently used conversation {oldest}");
            slots.remove(&oldest);
        }
    }
}
