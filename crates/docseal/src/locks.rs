//! Per-identity async locks.
//!
//! Attestations of one submission identity run one at a time; unrelated
//! identities never contend. A table entry lives only while some task holds
//! or waits for it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OwnedMutexGuard;

use docseal_core::SubmissionId;

struct Slot {
    lock: Arc<tokio::sync::Mutex<()>>,
    /// Holders plus waiters.
    users: usize,
}

type Table = Arc<Mutex<HashMap<SubmissionId, Slot>>>;

#[derive(Default, Clone)]
pub struct IdentityLocks {
    table: Table,
}

fn lock_table(
    table: &Mutex<HashMap<SubmissionId, Slot>>,
) -> MutexGuard<'_, HashMap<SubmissionId, Slot>> {
    // The table holds no invariant a panic could break mid-update.
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    pub async fn acquire(&self, id: &SubmissionId) -> IdentityGuard {
        let lock = {
            let mut table = lock_table(&self.table);
            let slot = table.entry(id.clone()).or_insert_with(|| Slot {
                lock: Arc::new(tokio::sync::Mutex::new(())),
                users: 0,
            });
            slot.users += 1;
            Arc::clone(&slot.lock)
        };

        // Registered before waiting so a cancelled wait still releases the slot.
        let mut guard = IdentityGuard {
            id: id.clone(),
            table: Arc::clone(&self.table),
            held: None,
        };
        guard.held = Some(lock.lock_owned().await);
        guard
    }

    /// Number of identities currently held or awaited.
    pub fn len(&self) -> usize {
        lock_table(&self.table).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one identity, released on drop.
pub struct IdentityGuard {
    id: SubmissionId,
    table: Table,
    held: Option<OwnedMutexGuard<()>>,
}

impl IdentityGuard {
    pub fn id(&self) -> &SubmissionId {
        &self.id
    }
}

impl Drop for IdentityGuard {
    fn drop(&mut self) {
        drop(self.held.take());

        let mut table = lock_table(&self.table);
        if let Some(slot) = table.get_mut(&self.id) {
            slot.users -= 1;
            if slot.users == 0 {
                table.remove(&self.id);
            }
        }
    }
}
