//! Memoized module loading
//!
//! [`ModuleCache`] wraps a loader so each module path is loaded at most once
//! per process. Concurrent requests for the same path wait on a single
//! in-flight load. A failed load leaves the path unloaded; the next request
//! retries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rsc_core::Component;
use tokio::sync::OnceCell;

use crate::loader::{ModuleLoadResult, ModuleLoader};

/// Memoizing wrapper around a [`ModuleLoader`]
pub struct ModuleCache<L: ModuleLoader> {
    loader: L,
    cells: Mutex<HashMap<String, Arc<OnceCell<Component>>>>,
    load_count: AtomicUsize,
}

impl<L: ModuleLoader> ModuleCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            cells: Mutex::new(HashMap::new()),
            load_count: AtomicUsize::new(0),
        }
    }

    /// Get the wrapped loader
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Number of times the wrapped loader has been invoked
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    /// Paths whose component is cached, sorted
    pub fn cached_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .cells
            .lock()
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Get a cached component without loading
    pub fn get(&self, path: &str) -> Option<Component> {
        self.cells
            .lock()
            .get(path)
            .and_then(|cell| cell.get().cloned())
    }

    /// Load `path`, reusing the cached component when present
    pub async fn load(&self, path: &str) -> ModuleLoadResult<Component> {
        let cell = {
            let mut cells = self.cells.lock();
            Arc::clone(cells.entry(path.to_string()).or_default())
        };

        let loaded = cell
            .get_or_try_init(|| async {
                self.load_count.fetch_add(1, Ordering::SeqCst);
                log::debug!("Loading client module `{}`", path);
                let loaded = self.loader.load(path).await;
                if let Err(err) = &loaded {
                    log::warn!("{}", err);
                }
                loaded
            })
            .await
            .cloned();

        if loaded.is_err() {
            self.forget(path, &cell);
        }
        loaded
    }

    /// Drop the cell for a failed path unless another caller is waiting on it
    fn forget(&self, path: &str, cell: &Arc<OnceCell<Component>>) {
        let mut cells = self.cells.lock();
        let unshared = cells
            .get(path)
            .map_or(false, |current| {
                Arc::ptr_eq(current, cell) && Arc::strong_count(cell) == 2
            });
        if unshared && !cell.initialized() {
            cells.remove(path);
        }
    }
}

#[async_trait::async_trait]
impl<L: ModuleLoader> ModuleLoader for ModuleCache<L> {
    async fn load(&self, path: &str) -> ModuleLoadResult<Component> {
        ModuleCache::load(self, path).await
    }
}
