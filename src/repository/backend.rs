use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::agent::error::PersistenceError;
use crate::repository::locator_model::Repository;

/// Where a `LocatorStore` keeps its data between runs.
pub trait StoreBackend {
    /// Read the persisted repository. `Ok(None)` means nothing has been
    /// persisted yet.
    fn load(&self) -> Result<Option<Repository>, PersistenceError>;

    /// Replace the persisted repository with `repository`.
    fn save(&self, repository: &Repository) -> Result<(), PersistenceError>;

    /// Human-readable location, for log lines.
    fn describe(&self) -> String;
}

// ============================================================================
// JSON file backend
// ============================================================================

/// One pretty-printed JSON file per repository name: `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl AsRef<Path>, repo_name: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", repo_name)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<Repository>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| PersistenceError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        let repository = serde_json::from_str(&content).map_err(|e| PersistenceError::Json {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(Some(repository))
    }

    fn save(&self, repository: &Repository) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PersistenceError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(repository).map_err(|e| PersistenceError::Json {
            path: self.path.clone(),
            source: e,
        })?;

        std::fs::write(&self.path, json).map_err(|e| PersistenceError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    saved: Option<Repository>,
    saves: usize,
}

/// Keeps the "persisted" repository in process memory.
///
/// Clones share state, so a caller can hand one clone to a store and keep
/// another to inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-persisted repository.
    pub fn with_contents(repository: Repository) -> Self {
        let backend = Self::default();
        backend.state.borrow_mut().saved = Some(repository);
        backend
    }

    /// Number of `save` calls seen so far.
    pub fn save_count(&self) -> usize {
        self.state.borrow().saves
    }

    /// Last saved repository, if any.
    pub fn saved(&self) -> Option<Repository> {
        self.state.borrow().saved.clone()
    }
}

impl StoreBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Repository>, PersistenceError> {
        Ok(self.state.borrow().saved.clone())
    }

    fn save(&self, repository: &Repository) -> Result<(), PersistenceError> {
        let mut state = self.state.borrow_mut();
        state.saved = Some(repository.clone());
        state.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
