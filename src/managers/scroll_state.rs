//! Process-wide persistence of scroll offsets.
//!
//! Scroll containers remember their offset across re-mounts (switching
//! boards, collapsing a lane). Each record also tracks which drag arenas
//! touched it; a record is pruned once no arena references it anymore.
//!
//! The store is shared by every arena in the process, so it lives behind a
//! `parking_lot::Mutex` in a lazily-initialized global.

use crate::error::DndResult;
use crate::types::CoordinateShift;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

static GLOBAL: Lazy<Arc<ScrollStateManager>> = Lazy::new(|| Arc::new(ScrollStateManager::new()));

/// A remembered offset and the arenas referencing it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedScroll {
    pub offset: CoordinateShift,
    pub scopes: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct ScrollStateManager {
    states: Mutex<BTreeMap<String, PersistedScroll>>,
}

impl ScrollStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared process-wide store.
    pub fn global() -> Arc<Self> {
        GLOBAL.clone()
    }

    pub fn get_scroll_state(&self, id: &str) -> Option<CoordinateShift> {
        self.states.lock().get(id).map(|state| state.offset)
    }

    /// Record the offset of container `id`, referenced by `scope_id`.
    pub fn set_scroll_state(&self, scope_id: &str, id: &str, offset: CoordinateShift) {
        let mut states = self.states.lock();
        let entry = states.entry(id.to_string()).or_default();
        entry.offset = offset;
        entry.scopes.insert(scope_id.to_string());
    }

    /// Drop `scope_id` from every record and prune orphaned ones.
    /// Returns the number of pruned records.
    pub fn unmount_scope(&self, scope_id: &str) -> usize {
        let mut states = self.states.lock();
        let before = states.len();
        states.retain(|_, state| {
            state.scopes.remove(scope_id);
            !state.scopes.is_empty()
        });
        let pruned = before - states.len();
        if pruned > 0 {
            debug!(scope = scope_id, pruned, "Pruned persisted scroll offsets");
        }
        pruned
    }

    pub fn snapshot(&self) -> BTreeMap<String, PersistedScroll> {
        self.states.lock().clone()
    }

    pub fn to_json(&self) -> DndResult<String> {
        Ok(serde_json::to_string(&*self.states.lock())?)
    }

    /// Replace the store's contents with a previously serialized snapshot.
    pub fn restore_json(&self, json: &str) -> DndResult<()> {
        let restored: BTreeMap<String, PersistedScroll> = serde_json::from_str(json)?;
        *self.states.lock() = restored;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.states.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.lock().is_empty()
    }

    pub fn clear(&self) {
        self.states.lock().clear();
    }
}
