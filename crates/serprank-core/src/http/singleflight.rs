//! In-flight request coalescing
//!
//! Two concurrent identical calls to a paid endpoint would both fetch and
//! both bill. The registry keys in-progress calls by (endpoint, target,
//! location) so a second caller awaits the first caller's result instead
//! of issuing a duplicate call. A failed leader releases the key and the
//! next waiter issues its own call; the single-call guarantee covers the
//! success path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use crate::error::Result;

/// Identity of one coalescable provider call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoalesceKey {
    pub endpoint: String,
    pub target: String,
    pub location_code: Option<u32>,
}

impl CoalesceKey {
    pub fn new(endpoint: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            target: target.into(),
            location_code: None,
        }
    }

    pub fn with_location(mut self, location_code: u32) -> Self {
        self.location_code = Some(location_code);
        self
    }
}

/// Registry of in-progress calls, keyed by [`CoalesceKey`].
#[derive(Debug, Default)]
pub struct SingleFlight<T: Clone> {
    cells: Mutex<HashMap<CoalesceKey, Arc<OnceCell<T>>>>,
}

impl<T: Clone> SingleFlight<T> {
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Run `op` under the key, or await an identical in-progress call.
    ///
    /// The key is released once the leading call settles, so later
    /// non-overlapping calls fetch fresh data; this is in-flight
    /// deduplication, not a response cache.
    pub async fn run<F, Fut>(&self, key: CoalesceKey, op: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let cell = {
            let mut cells = self.cells.lock().expect("singleflight mutex poisoned");
            cells
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let result = cell.get_or_try_init(op).await.cloned();

        let mut cells = self.cells.lock().expect("singleflight mutex poisoned");
        if let Some(current) = cells.get(&key) {
            if Arc::ptr_eq(current, &cell) {
                cells.remove(&key);
            }
        }

        result
    }
}
