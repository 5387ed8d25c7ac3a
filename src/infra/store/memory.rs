//! In-memory participant store with atomic conditional transitions.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use uuid::Uuid;

use crate::core::{
    EngineError, NewParticipant, Participant, ParticipantId, ParticipantState, ParticipantStore,
    Transition,
};

#[derive(Default)]
struct Inner {
    next_id: ParticipantId,
    /// Keyed by id, which increases with insertion order.
    records: BTreeMap<ParticipantId, Participant>,
    by_token: HashMap<String, ParticipantId>,
}

/// Participant store held in process memory.
///
/// A single `RwLock` guards all records, so each trait method observes and
/// mutates a consistent view.
#[derive(Default)]
pub struct InMemoryParticipantStore {
    inner: RwLock<Inner>,
}

impl InMemoryParticipantStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records held, including terminal and deleted ones.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }
}

fn fifo(a: &Participant, b: &Participant) -> std::cmp::Ordering {
    a.created_at_ms
        .cmp(&b.created_at_ms)
        .then_with(|| a.id.cmp(&b.id))
}

impl ParticipantStore for InMemoryParticipantStore {
    fn insert(&self, participant: NewParticipant) -> Result<Participant, EngineError> {
        let mut inner = self.inner.write();
        if inner.by_token.contains_key(&participant.token) {
            return Err(EngineError::DuplicateToken);
        }
        inner.next_id += 1;
        let id = inner.next_id;
        let record = Participant {
            id,
            queue_id: participant.queue_id,
            visitor_id: participant.visitor_id,
            token: participant.token,
            state: ParticipantState::Waiting,
            created_at_ms: participant.created_at_ms,
            expires_at_ms: participant.expires_at_ms,
            wait_ms: None,
            redirect_url: participant.redirect_url,
            is_deleted: false,
        };
        inner.by_token.insert(record.token.clone(), id);
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    fn get(&self, id: ParticipantId) -> Result<Option<Participant>, EngineError> {
        Ok(self.inner.read().records.get(&id).cloned())
    }

    fn find_by_token(&self, token: &str) -> Result<Option<Participant>, EngineError> {
        let inner = self.inner.read();
        Ok(inner
            .by_token
            .get(token)
            .and_then(|id| inner.records.get(id))
            .filter(|p| !p.is_deleted)
            .cloned())
    }

    fn select_waiting(
        &self,
        queue_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Participant>, EngineError> {
        let inner = self.inner.read();
        let mut waiting: Vec<Participant> = inner
            .records
            .values()
            .filter(|p| {
                p.queue_id == queue_id && p.state == ParticipantState::Waiting && !p.is_deleted
            })
            .cloned()
            .collect();
        waiting.sort_by(fifo);
        waiting.truncate(limit);
        Ok(waiting)
    }

    fn count_waiting(&self, queue_id: Uuid) -> Result<usize, EngineError> {
        Ok(self
            .inner
            .read()
            .records
            .values()
            .filter(|p| {
                p.queue_id == queue_id && p.state == ParticipantState::Waiting && !p.is_deleted
            })
            .count())
    }

    fn select_expired(&self, now_ms: u128) -> Result<Vec<Participant>, EngineError> {
        Ok(self
            .inner
            .read()
            .records
            .values()
            .filter(|p| {
                p.state == ParticipantState::Waiting && !p.is_deleted && p.expires_at_ms < now_ms
            })
            .cloned()
            .collect())
    }

    fn transition(
        &self,
        id: ParticipantId,
        transition: Transition,
    ) -> Result<Participant, EngineError> {
        let mut inner = self.inner.write();
        let record = inner
            .records
            .get_mut(&id)
            .ok_or(EngineError::TokenNotFound)?;
        if record.state != ParticipantState::Waiting || record.is_deleted {
            return Err(EngineError::StoreConflict);
        }
        record.state = transition.target();
        match transition {
            Transition::Release { wait_ms } => record.wait_ms = Some(wait_ms),
            Transition::Cancel => record.is_deleted = true,
            Transition::Expire => {}
        }
        Ok(record.clone())
    }

    fn list(
        &self,
        queue_id: Uuid,
        state: Option<ParticipantState>,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Participant>, EngineError> {
        Ok(self
            .inner
            .read()
            .records
            .values()
            .filter(|p| p.queue_id == queue_id && !p.is_deleted)
            .filter(|p| state.is_none_or(|s| p.state == s))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }
}
