//! ConversationStateStore - façade over the `ConversationStore` port.
//!
//! Adds per-conversation mutual exclusion on top of the durable medium.
//! A turn takes a `ConversationLease` before loading history and keeps it
//! until its messages are persisted; appends require the lease.
//!
//! Locks are FIFO (tokio's mutex is fair), scoped to one conversation, and
//! never nested. The lock table only holds entries for conversations with a
//! holder or waiters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::conversation::Message;
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StorageError};

type LockTable = Arc<Mutex<HashMap<ConversationId, Arc<AsyncMutex<()>>>>>;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone)]
pub struct ConversationStateStore {
    store: Arc<dyn ConversationStore>,
    locks: LockTable,
}

/// Exclusive right to mutate one conversation. Released on drop.
pub struct ConversationLease {
    conversation_id: ConversationId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: LockTable,
}

impl ConversationLease {
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }
}

impl Drop for ConversationLease {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut table = locked(&self.locks);
        let idle = table
            .get(&self.conversation_id)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1);
        if idle {
            table.remove(&self.conversation_id);
        }
    }
}

impl ConversationStateStore {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Waits for exclusive access to `conversation_id`.
    ///
    /// Waiters are served in arrival order. Dropping the returned future
    /// abandons the wait without taking the lock.
    pub async fn lock(&self, conversation_id: &ConversationId) -> ConversationLease {
        let mutex = {
            let mut table = locked(&self.locks);
            table
                .entry(conversation_id.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        let guard = mutex.lock_owned().await;

        ConversationLease {
            conversation_id: conversation_id.clone(),
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }

    /// Authoritative history for a leased conversation.
    pub async fn load_locked(
        &self,
        lease: &ConversationLease,
    ) -> Result<Vec<Message>, StorageError> {
        self.store.load(&lease.conversation_id).await
    }

    /// Read-through without locking. May miss a turn that is being written.
    pub async fn load(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, StorageError> {
        self.store.load(conversation_id).await
    }

    /// Appends one turn's messages atomically, in order.
    pub async fn append(
        &self,
        lease: &ConversationLease,
        messages: &[Message],
    ) -> Result<(), StorageError> {
        self.store.append(&lease.conversation_id, messages).await
    }

    /// Removes every message. Waits for any in-flight turn to finish first.
    pub async fn clear(&self, conversation_id: &ConversationId) -> Result<(), StorageError> {
        let lease = self.lock(conversation_id).await;
        self.store.clear(&lease.conversation_id).await
    }

    /// Number of conversations currently locked or awaited.
    pub fn active_locks(&self) -> usize {
        locked(&self.locks).len()
    }
}
