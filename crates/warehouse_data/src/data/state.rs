use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

use super::registry;
use crate::shared::records::Record;

/// Cached state of one collection
#[derive(Debug, Clone, Default)]
pub struct ResourceState {
    /// Last successfully loaded collection; read-only for consumers
    pub data: Arc<Vec<Record>>,
    pub loading: bool,
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Counts for dashboard badges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub total: usize,
    pub loaded: usize,
    pub loading: usize,
    pub failed: usize,
}

/// In-memory cache of every registered collection plus the landed cost
/// detail lines keyed by cost id
///
/// Each mutation happens under one write lock, so a commit of
/// `data`/`loading`/`error` is never observed half-applied.
pub struct StateStore {
    resources: RwLock<HashMap<&'static str, ResourceState>>,
    landed_cost_lines: RwLock<HashMap<i64, Arc<Vec<Record>>>>,
    revision: watch::Sender<u64>,
}

impl StateStore {
    pub fn new() -> Self {
        let resources = registry::all()
            .iter()
            .map(|d| (d.key, ResourceState::default()))
            .collect();
        let (revision, _) = watch::channel(0);
        Self {
            resources: RwLock::new(resources),
            landed_cost_lines: RwLock::new(HashMap::new()),
            revision,
        }
    }

    /// State of a collection; `None` for unregistered keys
    pub fn get(&self, key: &str) -> Option<ResourceState> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Current collection, empty for unregistered keys
    pub fn data(&self, key: &str) -> Arc<Vec<Record>> {
        self.get(key).map(|s| s.data).unwrap_or_default()
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.get(key).map(|s| s.loading).unwrap_or(false)
    }

    pub fn error(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|s| s.error)
    }

    pub fn landed_cost_lines(&self, cost_id: i64) -> Option<Arc<Vec<Record>>> {
        self.landed_cost_lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cost_id)
            .cloned()
    }

    pub fn summary(&self) -> StoreSummary {
        let resources = self.resources.read().unwrap_or_else(PoisonError::into_inner);
        resources.values().fold(
            StoreSummary {
                total: resources.len(),
                ..StoreSummary::default()
            },
            |mut acc, s| {
                if s.loaded_at.is_some() {
                    acc.loaded += 1;
                }
                if s.loading {
                    acc.loading += 1;
                }
                if s.error.is_some() {
                    acc.failed += 1;
                }
                acc
            },
        )
    }

    /// Receiver bumped after every mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Write handle for a collection; unregistered keys get a no-op slot
    pub fn slot(&self, key: &str) -> ResourceSlot<'_> {
        ResourceSlot {
            store: self,
            key: registry::resolve_setter(key),
        }
    }

    /// Empty every collection and clear every error; `loading` is left as is
    ///
    /// In-flight fetches are not cancelled and still commit when they resolve.
    pub fn reset_all(&self) {
        {
            let mut resources = self.resources.write().unwrap_or_else(PoisonError::into_inner);
            for state in resources.values_mut() {
                state.data = Arc::default();
                state.error = None;
                state.loaded_at = None;
            }
        }
        self.landed_cost_lines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.bump();
    }

    pub(crate) fn set_landed_cost_lines(&self, cost_id: i64, lines: Vec<Record>) {
        self.landed_cost_lines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cost_id, Arc::new(lines));
        self.bump();
    }

    fn update(&self, key: &'static str, f: impl FnOnce(&mut ResourceState)) {
        {
            let mut resources = self.resources.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(state) = resources.get_mut(key) {
                f(state);
            }
        }
        self.bump();
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutator bound to one collection
pub struct ResourceSlot<'a> {
    store: &'a StateStore,
    key: Option<&'static str>,
}

impl ResourceSlot<'_> {
    pub fn is_noop(&self) -> bool {
        self.key.is_none()
    }

    /// Request dispatched
    pub fn begin(&self) {
        self.with(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    /// Replace the collection wholesale
    pub fn succeed(&self, data: Vec<Record>) {
        self.with(|s| {
            s.data = Arc::new(data);
            s.error = None;
            s.loading = false;
            s.loaded_at = Some(Utc::now());
        });
    }

    /// Record a failure; the previous collection stays in place
    pub fn fail(&self, message: String) {
        self.with(|s| {
            s.error = Some(message);
            s.loading = false;
        });
    }

    /// Overwrite the error message only
    pub fn set_error(&self, message: String) {
        self.with(|s| s.error = Some(message));
    }

    fn with(&self, f: impl FnOnce(&mut ResourceState)) {
        if let Some(key) = self.key {
            self.store.update(key, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(n: i64) -> Vec<Record> {
        (0..n)
            .map(|id| json!({ "id": id }).as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_new_store_has_every_resource_empty() {
        let store = StateStore::new();
        for d in registry::all() {
            let state = store.get(d.key).unwrap();
            assert!(state.data.is_empty());
            assert!(!state.loading);
            assert!(state.error.is_none());
        }
        assert!(store.get("unknown").is_none());
    }

    #[test]
    fn test_slot_lifecycle() {
        let store = StateStore::new();
        let slot = store.slot("lots");

        slot.begin();
        assert!(store.is_loading("lots"));

        slot.succeed(records(2));
        let state = store.get("lots").unwrap();
        assert!(!state.loading);
        assert_eq!(state.data.len(), 2);
        assert!(state.loaded_at.is_some());

        let before = store.data("lots");
        slot.begin();
        slot.fail("boom".to_string());
        let state = store.get("lots").unwrap();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert!(Arc::ptr_eq(&before, &state.data));
    }

    #[test]
    fn test_unknown_slot_is_noop() {
        let store = StateStore::new();
        let slot = store.slot("unknown");
        assert!(slot.is_noop());
        slot.begin();
        slot.succeed(records(1));
        slot.fail("x".to_string());
        assert!(store.get("unknown").is_none());
        assert_eq!(store.data("unknown").len(), 0);
    }

    #[test]
    fn test_reset_keeps_loading_flags() {
        let store = StateStore::new();
        store.slot("lots").succeed(records(3));
        store.slot("packages").fail("down".to_string());
        store.slot("quants").begin();
        store.set_landed_cost_lines(7, records(2));

        store.reset_all();

        assert!(store.data("lots").is_empty());
        assert!(store.error("packages").is_none());
        assert!(store.is_loading("quants"));
        assert!(store.landed_cost_lines(7).is_none());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let store = StateStore::new();
        store.slot("lots").succeed(records(3));
        store.slot("packages").fail("down".to_string());

        store.reset_all();
        let once: Vec<_> = registry::all()
            .iter()
            .map(|d| (d.key, store.data(d.key).len(), store.error(d.key)))
            .collect();
        store.reset_all();
        let twice: Vec<_> = registry::all()
            .iter()
            .map(|d| (d.key, store.data(d.key).len(), store.error(d.key)))
            .collect();

        assert_eq!(once, twice);
        assert!(twice.iter().all(|(_, len, err)| *len == 0 && err.is_none()));
    }

    #[test]
    fn test_summary_counts() {
        let store = StateStore::new();
        store.slot("lots").succeed(records(1));
        store.slot("packages").fail("down".to_string());
        store.slot("quants").begin();

        let summary = store.summary();
        assert_eq!(summary.total, registry::all().len());
        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.loading, 1);
    }

    #[test]
    fn test_subscribe_sees_revisions() {
        let store = StateStore::new();
        let rx = store.subscribe();
        let start = *rx.borrow();
        store.slot("lots").begin();
        store.slot("lots").succeed(records(1));
        assert_eq!(*rx.borrow(), start + 2);
    }
}
