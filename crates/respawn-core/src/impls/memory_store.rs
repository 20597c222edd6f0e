//! InMemoryTimerStore - テスト用の TimerStore
//!
//! Clone するとストレージを共有します（エンジンに渡した後もテストから覗ける）。

use std::sync::{Arc, Mutex};

use crate::domain::{StoreError, TimerSnapshot};
use crate::ports::TimerStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryTimerStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: Option<TimerSnapshot>,
    saves: usize,
}

impl InMemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, as if a previous process had saved `snapshot`.
    pub fn with_snapshot(snapshot: TimerSnapshot) -> Self {
        let store = Self::new();
        store.lock().snapshot = Some(snapshot);
        store
    }

    /// Last saved (or seeded) snapshot.
    pub fn snapshot(&self) -> TimerSnapshot {
        self.lock().snapshot.clone().unwrap_or_default()
    }

    /// Number of `save` calls so far.
    pub fn saves(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TimerStore for InMemoryTimerStore {
    fn load(&self) -> Result<TimerSnapshot, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, snapshot: &TimerSnapshot) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.snapshot = Some(snapshot.clone());
        inner.saves += 1;
        Ok(())
    }
}
