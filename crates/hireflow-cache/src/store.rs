//! The query cache store.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use hireflow_core::{Error, Result};

use crate::key::QueryKey;

/// Tracing target for cache store operations.
pub const TRACING_TARGET: &str = "hireflow_cache::store";

/// Mutation state of one application's cache entries.
///
/// A second mutation on an application whose state is not idle is rejected
/// until the first settles; this serializes the cancel-snapshot-write
/// sequence of optimistic updates against concurrent mutations on the same
/// entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationState {
    /// No mutation in flight.
    #[default]
    Idle,
    /// A mutation with the given correlation id is awaiting the server.
    Pending(Uuid),
    /// A failed mutation is restoring the pre-mutation snapshot.
    RollingBack,
}

#[derive(Debug, Default)]
struct Slot {
    value: Option<Value>,
    generation: u64,
    stale: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    slots: HashMap<QueryKey, Slot>,
    mutations: HashMap<Uuid, MutationState>,
}

/// Process-wide query cache for server responses.
///
/// An explicit service object: holders share one store through cheap
/// clones, and every key follows the scheme documented on [`QueryKey`].
/// Values are stored as `serde_json::Value` projections of server
/// responses; writes are last-write-wins.
///
/// Each slot carries a generation counter. Refetches capture the generation
/// when they start and only write back if it is unchanged, so invalidation
/// and optimistic writes cancel stale in-flight reads without cancelling
/// mutations.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    state: Arc<Mutex<CacheState>>,
}

/// Exact copy of a set of cache slots, taken before an optimistic write.
///
/// Restoring puts back precisely what was captured — including the absence
/// of a value — never a merge.
#[derive(Debug)]
pub struct CacheSnapshot {
    entries: Vec<(QueryKey, Option<Value>)>,
}

impl QueryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fresh server response under a key.
    pub async fn put(&self, key: QueryKey, value: Value) {
        let mut state = self.state.lock().await;
        let slot = state.slots.entry(key).or_default();
        slot.value = Some(value);
        slot.generation += 1;
        slot.stale = false;
    }

    /// Returns the cached value for a key, if any.
    pub async fn get(&self, key: &QueryKey) -> Option<Value> {
        self.state
            .lock()
            .await
            .slots
            .get(key)
            .and_then(|slot| slot.value.clone())
    }

    /// Returns the cached value deserialized into a typed projection.
    ///
    /// A value that no longer matches the expected shape yields `None`, the
    /// same as a miss; the next refetch will repair it.
    pub async fn get_as<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let value = self.get(key).await?;
        serde_json::from_value(value).ok()
    }

    /// Whether a key is marked stale and due for a refetch.
    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        self.state
            .lock()
            .await
            .slots
            .get(key)
            .is_some_and(|slot| slot.stale)
    }

    /// Marks keys stale and cancels their in-flight refetches.
    ///
    /// This is the reconciliation signal: the cached value stays readable
    /// until a refetch replaces it.
    pub async fn invalidate(&self, keys: &[QueryKey]) {
        let mut state = self.state.lock().await;
        for key in keys {
            let slot = state.slots.entry(key.clone()).or_default();
            slot.stale = true;
            slot.generation += 1;
        }
        tracing::debug!(
            target: TRACING_TARGET,
            count = keys.len(),
            "Invalidated cache keys"
        );
    }

    /// Cancels in-flight refetches for keys without marking them stale.
    ///
    /// Used by the optimistic path before writing, so a racing read that
    /// started earlier cannot clobber the optimistic value when it lands.
    pub async fn cancel_refetches(&self, keys: &[QueryKey]) {
        let mut state = self.state.lock().await;
        for key in keys {
            state.slots.entry(key.clone()).or_default().generation += 1;
        }
    }

    /// Starts a refetch for a key, capturing its current generation.
    pub async fn begin_refetch(&self, key: &QueryKey) -> u64 {
        self.state
            .lock()
            .await
            .slots
            .get(key)
            .map(|slot| slot.generation)
            .unwrap_or_default()
    }

    /// Completes a refetch. The value is written only when the captured
    /// generation is still current; returns whether the write happened.
    pub async fn complete_refetch(&self, key: QueryKey, generation: u64, value: Value) -> bool {
        let mut state = self.state.lock().await;
        let slot = state.slots.entry(key).or_default();
        if slot.generation != generation {
            tracing::debug!(
                target: TRACING_TARGET,
                "Discarded refetch result for superseded generation"
            );
            return false;
        }
        slot.value = Some(value);
        slot.stale = false;
        true
    }

    /// Captures the exact current values of a set of keys.
    pub async fn snapshot(&self, keys: &[QueryKey]) -> CacheSnapshot {
        let state = self.state.lock().await;
        let entries = keys
            .iter()
            .map(|key| {
                let value = state.slots.get(key).and_then(|slot| slot.value.clone());
                (key.clone(), value)
            })
            .collect();
        CacheSnapshot { entries }
    }

    /// Restores a snapshot taken with [`QueryCache::snapshot`].
    ///
    /// Slots return to exactly the captured values; keys captured without a
    /// value lose whatever was written since.
    pub async fn restore(&self, snapshot: CacheSnapshot) {
        let mut state = self.state.lock().await;
        for (key, value) in snapshot.entries {
            let slot = state.slots.entry(key).or_default();
            slot.value = value;
            slot.generation += 1;
        }
    }

    /// Applies an in-place edit to a cached value, if present.
    ///
    /// Bumps the generation so concurrent refetch completions are
    /// discarded. Returns whether a value was present to edit.
    pub async fn update<F>(&self, key: &QueryKey, edit: F) -> bool
    where
        F: FnOnce(&mut Value),
    {
        let mut state = self.state.lock().await;
        let Some(slot) = state.slots.get_mut(key) else {
            return false;
        };
        let Some(value) = slot.value.as_mut() else {
            return false;
        };
        edit(value);
        slot.generation += 1;
        true
    }

    /// Begins a mutation for an application, returning the correlation id.
    ///
    /// # Errors
    ///
    /// Fails with a [`Conflict`](hireflow_core::ErrorKind::Conflict) error
    /// when another mutation for the same application has not settled.
    pub async fn begin_mutation(&self, application_id: Uuid) -> Result<Uuid> {
        let mut state = self.state.lock().await;
        match state.mutations.get(&application_id) {
            None | Some(MutationState::Idle) => {}
            Some(_) => {
                return Err(Error::conflict().with_message(format!(
                    "a mutation is already pending for application {application_id}"
                )));
            }
        }
        let correlation_id = Uuid::now_v7();
        state
            .mutations
            .insert(application_id, MutationState::Pending(correlation_id));
        Ok(correlation_id)
    }

    /// Transitions a pending mutation into rollback.
    pub async fn begin_rollback(&self, application_id: Uuid, correlation_id: Uuid) {
        let mut state = self.state.lock().await;
        if state.mutations.get(&application_id) == Some(&MutationState::Pending(correlation_id)) {
            state
                .mutations
                .insert(application_id, MutationState::RollingBack);
        }
    }

    /// Settles a mutation, returning the application to the idle state.
    pub async fn settle_mutation(&self, application_id: Uuid) {
        self.state.lock().await.mutations.remove(&application_id);
    }

    /// Returns the mutation state of an application.
    pub async fn mutation_state(&self, application_id: Uuid) -> MutationState {
        self.state
            .lock()
            .await
            .mutations
            .get(&application_id)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let cache = QueryCache::new();
        let key = QueryKey::JobApplications;
        cache.put(key.clone(), json!([{ "id": "a" }])).await;
        assert_eq!(cache.get(&key).await.unwrap()[0]["id"], "a");
        assert!(!cache.is_stale(&key).await);
    }

    #[tokio::test]
    async fn test_invalidate_marks_stale_but_keeps_value() {
        let cache = QueryCache::new();
        let key = QueryKey::JobApplications;
        cache.put(key.clone(), json!([])).await;
        cache.invalidate(std::slice::from_ref(&key)).await;
        assert!(cache.is_stale(&key).await);
        assert!(cache.get(&key).await.is_some());
    }

    #[tokio::test]
    async fn test_refetch_discarded_after_cancel() {
        let cache = QueryCache::new();
        let key = QueryKey::JobApplications;
        cache.put(key.clone(), json!(["old"])).await;

        let generation = cache.begin_refetch(&key).await;
        cache.cancel_refetches(std::slice::from_ref(&key)).await;

        let written = cache
            .complete_refetch(key.clone(), generation, json!(["from-refetch"]))
            .await;
        assert!(!written);
        assert_eq!(cache.get(&key).await.unwrap(), json!(["old"]));
    }

    #[tokio::test]
    async fn test_refetch_lands_when_uncancelled() {
        let cache = QueryCache::new();
        let key = QueryKey::JobApplications;
        cache.put(key.clone(), json!(["old"])).await;
        cache.invalidate(std::slice::from_ref(&key)).await;

        let generation = cache.begin_refetch(&key).await;
        let written = cache
            .complete_refetch(key.clone(), generation, json!(["fresh"]))
            .await;
        assert!(written);
        assert!(!cache.is_stale(&key).await);
        assert_eq!(cache.get(&key).await.unwrap(), json!(["fresh"]));
    }

    #[tokio::test]
    async fn test_snapshot_restore_is_exact() {
        let cache = QueryCache::new();
        let present = QueryKey::JobApplications;
        let absent = QueryKey::StageHistory(Uuid::new_v4());
        cache.put(present.clone(), json!([{ "id": "a", "stage": "x" }])).await;

        let snapshot = cache.snapshot(&[present.clone(), absent.clone()]).await;
        cache
            .update(&present, |value| value[0]["stage"] = json!("y"))
            .await;
        cache.put(absent.clone(), json!(["speculative"])).await;

        cache.restore(snapshot).await;
        assert_eq!(cache.get(&present).await.unwrap()[0]["stage"], "x");
        assert!(cache.get(&absent).await.is_none());
    }

    #[tokio::test]
    async fn test_second_mutation_conflicts_until_settled() {
        let cache = QueryCache::new();
        let application_id = Uuid::new_v4();

        let correlation = cache.begin_mutation(application_id).await.unwrap();
        assert_eq!(
            cache.mutation_state(application_id).await,
            MutationState::Pending(correlation)
        );

        let error = cache.begin_mutation(application_id).await.unwrap_err();
        assert_eq!(error.kind(), hireflow_core::ErrorKind::Conflict);

        cache.settle_mutation(application_id).await;
        assert!(cache.begin_mutation(application_id).await.is_ok());
    }
}
