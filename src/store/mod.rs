//! Record store: loading, cleaning, and holding the active launch dataset.
//!
//! [`MissionStore`] owns the active [`Dataset`] behind a read-write lock around
//! an `Arc`. Readers take a snapshot (`Arc` clone) and iterate it without
//! holding the lock; [`MissionStore::reload`] builds the replacement off to
//! the side and swaps the pointer in a single write, so a snapshot is never
//! observed half-updated.

pub mod dataset;
pub mod loader;

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

pub use dataset::{Dataset, LoadReport};
pub use loader::{LoadError, LoadOptions, load, load_with, read_records};

/// Process-wide holder of the active dataset.
#[derive(Debug, Default)]
pub struct MissionStore {
    active: RwLock<Arc<Dataset>>,
    options: LoadOptions,
}

impl MissionStore {
    /// Empty store; queries against it return their empty sentinels.
    pub fn new(options: LoadOptions) -> Self {
        Self {
            active: RwLock::new(Arc::new(Dataset::default())),
            options,
        }
    }

    /// Load `path` and install it as the active dataset.
    pub fn open(path: &Path, options: LoadOptions) -> Result<Self, LoadError> {
        let store = Self::new(options);
        store.reload(path)?;
        Ok(store)
    }

    /// Current dataset. The returned snapshot stays valid across reloads.
    pub fn snapshot(&self) -> Arc<Dataset> {
        self.active.read().clone()
    }

    /// Load `path` and atomically replace the active dataset.
    ///
    /// On failure the previously active dataset stays in place.
    pub fn reload(&self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let fresh = Arc::new(load_with(path, &self.options)?);
        let previous = self.install_arc(Arc::clone(&fresh));
        tracing::info!(
            path = %path.display(),
            records = fresh.len(),
            previous_records = previous.len(),
            "installed launch dataset"
        );
        Ok(fresh)
    }

    /// Replace the active dataset with an already-built one.
    pub fn install(&self, dataset: Dataset) -> Arc<Dataset> {
        let fresh = Arc::new(dataset);
        self.install_arc(Arc::clone(&fresh));
        fresh
    }

    fn install_arc(&self, fresh: Arc<Dataset>) -> Arc<Dataset> {
        std::mem::replace(&mut *self.active.write(), fresh)
    }
}
