//! Usage: Idempotency-key latch: run a one-shot async operation at most once per key.
//!
//! The first caller for a key spawns the operation onto the runtime; every caller (the
//! first one included) only awaits its published result. Dropping a caller never cancels
//! the operation, and a caller arriving later (even after every earlier caller went away)
//! joins the same dispatch. Results are retained for the lifetime of the `SingleFlight`.

use crate::shared::mutex_ext::MutexExt;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;
use tokio::sync::watch;

pub struct SingleFlight<K, V> {
    slots: Mutex<HashMap<K, watch::Receiver<Option<V>>>>,
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch `op` for `key` unless it was already dispatched, then await the shared
    /// result.
    ///
    /// Returns `None` only when the dispatched operation panicked before publishing.
    pub async fn run<F, Fut>(&self, key: K, op: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let mut result = {
            let mut slots = self.slots.lock_or_recover();
            match slots.entry(key) {
                Entry::Occupied(slot) => slot.get().clone(),
                Entry::Vacant(slot) => {
                    let (tx, rx) = watch::channel(None);
                    let task = op();
                    tokio::spawn(async move {
                        let value = task.await;
                        // The slot map keeps a receiver alive, so the send cannot fail.
                        let _ = tx.send(Some(value));
                    });
                    slot.insert(rx).clone()
                }
            }
        };

        let outcome = match result.wait_for(Option::is_some).await {
            Ok(value) => (*value).clone(),
            Err(_) => {
                tracing::error!("single-flight operation ended without a result");
                None
            }
        };
        outcome
    }

    /// Whether `key` has been claimed by a caller (in flight or completed).
    pub fn is_claimed(&self, key: &K) -> bool {
        self.slots.lock_or_recover().contains_key(key)
    }

    /// Completed result for `key`, if any.
    pub fn completed(&self, key: &K) -> Option<V> {
        let slots = self.slots.lock_or_recover();
        slots.get(key).and_then(|slot| (*slot.borrow()).clone())
    }
}
