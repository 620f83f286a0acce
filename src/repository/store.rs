use chrono::{Local, NaiveDateTime};
use tracing::{debug, warn};

use crate::action::grammar::ActionKind;
use crate::repository::backend::{MemoryBackend, StoreBackend};
use crate::repository::locator_model::{LocatorEntry, LocatorRecord, Repository};

/// Object repository: discovered locators keyed by `(page, object)`.
///
/// Every mutation is written through to the backend immediately. Backend
/// failures are logged and otherwise ignored; the in-memory map stays
/// authoritative for the rest of the run.
pub struct LocatorStore {
    pages: Repository,
    backend: Box<dyn StoreBackend>,
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl LocatorStore {
    /// Load the repository from `backend`. A missing repository starts
    /// empty, and so does an unreadable one (with a warning).
    pub fn load(backend: Box<dyn StoreBackend>) -> Self {
        let pages = match backend.load() {
            Ok(Some(pages)) => {
                debug!(location = %backend.describe(), pages = pages.len(), "loaded object repository");
                pages
            }
            Ok(None) => {
                debug!(location = %backend.describe(), "no object repository yet, starting empty");
                Repository::new()
            }
            Err(e) => {
                warn!(error = %e, "could not load object repository, starting empty");
                Repository::new()
            }
        };

        Self { pages, backend }
    }

    /// Empty store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryBackend::new()))
    }

    fn persist(&self) {
        if let Err(e) = self.backend.save(&self.pages) {
            warn!(error = %e, "failed to save object repository");
        }
    }

    /// Look up a locator and record the use.
    ///
    /// On a hit the use count is bumped, `last_used_at` is set and the
    /// repository is persisted before the updated record is returned. A miss
    /// has no side effects.
    pub fn get(&mut self, page: &str, object: &str) -> Option<LocatorRecord> {
        let entry = self.pages.get_mut(page)?.get_mut(object)?;
        entry.used_count += 1;
        entry.last_used_at = Some(now());
        let record = LocatorRecord::from_entry(page, object, entry);

        self.persist();
        Some(record)
    }

    /// Create or overwrite a locator. Returns `true` if the key was new.
    ///
    /// Overwriting refreshes `discovered_at` but keeps the use history
    /// (`used_count`, `last_used_at`).
    pub fn put(
        &mut self,
        page: &str,
        object: &str,
        selector: &str,
        kind: ActionKind,
        description: &str,
    ) -> bool {
        let objects = self.pages.entry(page.to_string()).or_default();
        let previous = objects.get(object);
        let is_new = previous.is_none();

        let entry = LocatorEntry {
            locator: selector.to_string(),
            kind,
            description: description.to_string(),
            discovered_at: now(),
            used_count: previous.map_or(0, |p| p.used_count),
            last_used_at: previous.and_then(|p| p.last_used_at),
        };
        objects.insert(object.to_string(), entry);

        self.persist();
        is_new
    }

    /// Find the first object on `page` whose name or description contains
    /// `term`, ignoring case. Does not count as a use.
    pub fn search(&self, page: &str, term: &str) -> Option<LocatorRecord> {
        let needle = term.to_lowercase();
        self.pages.get(page)?.iter().find_map(|(object, entry)| {
            let hit = object.to_lowercase().contains(&needle)
                || entry.description.to_lowercase().contains(&needle);
            hit.then(|| LocatorRecord::from_entry(page, object, entry))
        })
    }

    /// All records stored for `page`, in key order.
    pub fn page_objects(&self, page: &str) -> Vec<LocatorRecord> {
        self.pages
            .get(page)
            .map(|objects| {
                objects
                    .iter()
                    .map(|(object, entry)| LocatorRecord::from_entry(page, object, entry))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn pages(&self) -> Vec<&str> {
        self.pages.keys().map(String::as_str).collect()
    }

    /// Total number of records across all pages.
    pub fn len(&self) -> usize {
        self.pages.values().map(|objects| objects.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
