//! Durable storage for the portfolio aggregate.
//!
//! The whole aggregate lives as one JSON blob under a single key. The
//! [`PersistenceGateway`] is the only code that reads or writes that blob; the
//! store reaches it through the [`PortfolioListener`] boundary, so writes
//! happen after every accepted mutation without the store knowing about storage.
//!
//! Backends:
//! - [`MemoryStorage`] - shared in-memory map, for tests and headless use
//! - [`FileStorage`] - one file per key in the app's storage directory (native)
//! - [`LocalStorage`] - the browser's `window.localStorage` (wasm)

use crate::constants::MAX_RATING;
use crate::curriculum::Curriculum;
use crate::error::{PortfolioError, Result};
use crate::store::{refresh_derived, PortfolioListener};
use crate::types::PortfolioData;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Minimal key-value interface over durable storage.
pub trait StorageBackend {
    /// Reads the value stored under `key`, `Ok(None)` if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory backend. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw access for inspecting what was written.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Native backend storing each key as `<dir>/<key>.json`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    /// Uses the given directory, created on first write.
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The per-user directory eframe uses for this application.
    pub fn default_location() -> Option<Self> {
        eframe::storage_dir(crate::constants::APP_ID).map(Self::new)
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortfolioError::StorageRead(format!(
                "Failed to read file: {}",
                e
            ))),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| PortfolioError::StorageWrite(format!("Failed to create directory: {}", e)))?;
        // Write then rename so a crash never leaves a half-written blob
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .map_err(|e| PortfolioError::StorageWrite(format!("Failed to save file: {}", e)))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| PortfolioError::StorageWrite(format!("Failed to save file: {}", e)))
    }
}

/// Browser backend over `window.localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// Returns `None` when the page has no local storage (e.g. disabled by the user).
    pub fn new() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl StorageBackend for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| PortfolioError::StorageRead(format!("{e:?}")))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PortfolioError::StorageWrite(format!("{e:?}")))
    }
}

/// Result of [`PersistenceGateway::load`].
#[derive(Debug)]
pub struct LoadOutcome {
    /// The loaded aggregate, or curriculum defaults
    pub data: PortfolioData,
    /// Set when a saved blob existed but could not be used
    pub notice: Option<PortfolioError>,
}

/// Loads and saves the portfolio aggregate under one fixed key.
pub struct PersistenceGateway<B: StorageBackend> {
    backend: B,
    key: String,
    curriculum: Curriculum,
}

impl<B: StorageBackend> PersistenceGateway<B> {
    /// Creates a gateway using the default storage key.
    pub fn new(backend: B, curriculum: Curriculum) -> Self {
        Self::with_key(backend, curriculum, crate::constants::STORAGE_KEY)
    }

    /// Creates a gateway using a custom storage key.
    pub fn with_key(backend: B, curriculum: Curriculum, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            curriculum,
        }
    }

    /// Reads the saved aggregate.
    ///
    /// Never fails: an absent blob yields defaults silently, while an
    /// unreadable or mismatched blob yields defaults plus a notice for the UI.
    pub fn load(&self) -> LoadOutcome {
        let defaults = || self.curriculum.blank_portfolio();

        let raw = match self.backend.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("No saved portfolio under '{}', starting fresh", self.key);
                return LoadOutcome {
                    data: defaults(),
                    notice: None,
                };
            }
            Err(err) => {
                log::warn!("{err}");
                return LoadOutcome {
                    data: defaults(),
                    notice: Some(err),
                };
            }
        };

        let notice = match PortfolioData::from_json(&raw) {
            Ok(mut data)
                if self.curriculum.matches(&data)
                    && data.self_assessment.iter().all(|a| a.rating <= MAX_RATING) =>
            {
                refresh_derived(&mut data);
                log::info!("Loaded saved portfolio ({}% complete)", data.progress);
                return LoadOutcome { data, notice: None };
            }
            Ok(data) => match data.self_assessment.iter().find(|a| a.rating > MAX_RATING) {
                Some(bad) => PortfolioError::StorageRead(format!(
                    "saved rating {} for '{}' is outside 0-{MAX_RATING}",
                    bad.rating, bad.topic
                )),
                None => PortfolioError::StorageRead(
                    "saved portfolio does not match the current curriculum".to_string(),
                ),
            },
            Err(e) => PortfolioError::StorageRead(e.to_string()),
        };
        log::warn!("{notice}; falling back to a blank portfolio");
        LoadOutcome {
            data: defaults(),
            notice: Some(notice),
        }
    }

    /// Serializes the whole aggregate and writes it unconditionally.
    pub fn save(&mut self, data: &PortfolioData) -> Result<()> {
        let json = data.to_json()?;
        self.backend.set_item(&self.key, &json)?;
        log::debug!("Saved portfolio ({} bytes)", json.len());
        Ok(())
    }

    /// The storage backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: StorageBackend> PortfolioListener for PersistenceGateway<B> {
    fn portfolio_changed(&mut self, data: &PortfolioData) -> Result<()> {
        self.save(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STORAGE_KEY;
    use crate::store::tests::{apply, edit};
    use crate::store::PortfolioStore;
    use crate::types::*;
    use proptest::prelude::*;

    fn gateway(storage: &MemoryStorage) -> PersistenceGateway<MemoryStorage> {
        PersistenceGateway::new(storage.clone(), Curriculum::default())
    }

    #[test]
    fn test_fresh_load_returns_defaults() {
        let storage = MemoryStorage::new();
        let outcome = gateway(&storage).load();

        assert!(outcome.notice.is_none());
        assert_eq!(outcome.data.episodes.len(), 10);
        assert_eq!(outcome.data.vocabulary.len(), 10);
        assert_eq!(outcome.data.self_assessment.len(), 5);
        assert_eq!(outcome.data.progress, 0);
        assert_eq!(outcome.data, Curriculum::default().blank_portfolio());
    }

    #[test]
    fn test_store_writes_through_gateway_and_reloads() {
        let storage = MemoryStorage::new();
        let mut store = PortfolioStore::blank(Curriculum::default());
        store.subscribe(Box::new(gateway(&storage)));

        store.update_student_info(StudentField::Name, "Ada Lovelace");
        store
            .update_episode(3, EpisodeField::Learning, "Crows mimic hawk calls")
            .unwrap();
        store
            .update_vocabulary(0, VocabularyField::Definition, "A bird in the crow family")
            .unwrap();
        store.update_self_assessment(4, 3).unwrap();
        store.set_observations("A magpie stole a bottle cap");
        store.set_canvas_data("data:image/png;base64,iVBORw0KGgo=");

        let reloaded = gateway(&storage).load();
        assert!(reloaded.notice.is_none());
        assert_eq!(&reloaded.data, store.data());
    }

    #[test]
    fn test_every_mutation_is_written() {
        let storage = MemoryStorage::new();
        let mut store = PortfolioStore::blank(Curriculum::default());
        store.subscribe(Box::new(gateway(&storage)));

        assert!(storage.raw(STORAGE_KEY).is_none());
        store.update_student_info(StudentField::Grade, "5");
        let first = storage.raw(STORAGE_KEY).unwrap();
        assert!(first.contains("\"grade\": \"5\""));

        store.set_observations("Rooks in the field");
        let second = storage.raw(STORAGE_KEY).unwrap();
        assert!(second.contains("Rooks in the field"));
    }

    #[test]
    fn test_malformed_blob_falls_back_with_notice() {
        let mut storage = MemoryStorage::new();
        storage.set_item(STORAGE_KEY, "{ not json").unwrap();

        let outcome = gateway(&storage).load();
        assert!(matches!(outcome.notice, Some(PortfolioError::StorageRead(_))));
        assert_eq!(outcome.data, Curriculum::default().blank_portfolio());
    }

    #[test]
    fn test_blob_for_other_curriculum_is_rejected() {
        let mut storage = MemoryStorage::new();
        let mut other = Curriculum::default().blank_portfolio();
        other.episodes.truncate(3);
        storage
            .set_item(STORAGE_KEY, &other.to_json().unwrap())
            .unwrap();

        let outcome = gateway(&storage).load();
        assert!(outcome.notice.is_some());
        assert_eq!(outcome.data.episodes.len(), 10);
    }

    #[test]
    fn test_out_of_range_rating_is_rejected() {
        let mut storage = MemoryStorage::new();
        let mut data = Curriculum::default().blank_portfolio();
        data.self_assessment[0].rating = 9;
        storage.set_item(STORAGE_KEY, &data.to_json().unwrap()).unwrap();

        let outcome = gateway(&storage).load();
        match outcome.notice {
            Some(PortfolioError::StorageRead(message)) => assert!(message.contains("rating 9")),
            other => panic!("expected a StorageRead notice, got {other:?}"),
        }
        assert_eq!(outcome.data.self_assessment[0].rating, 0);
        assert_eq!(outcome.data.progress, 0);
    }

    #[test]
    fn test_load_recomputes_derived_fields() {
        let mut storage = MemoryStorage::new();
        let mut data = Curriculum::default().blank_portfolio();
        data.episodes[5].learning = "Helpers at the nest".to_string();
        data.progress = 77;
        storage.set_item(STORAGE_KEY, &data.to_json().unwrap()).unwrap();

        let outcome = gateway(&storage).load();
        assert!(outcome.data.episodes[5].completed);
        assert_eq!(outcome.data.progress, 2);
    }

    proptest! {
        #[test]
        fn saved_portfolio_loads_back_unchanged(edits in prop::collection::vec(edit(), 0..40)) {
            let storage = MemoryStorage::new();
            let mut store = PortfolioStore::blank(Curriculum::default());
            store.subscribe(Box::new(gateway(&storage)));
            for e in &edits {
                apply(&mut store, e);
            }

            let outcome = gateway(&storage).load();
            prop_assert!(outcome.notice.is_none());
            prop_assert_eq!(&outcome.data, store.data());
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get_item("portfolio").unwrap(), None);
        storage.set_item("portfolio", "{\"a\":1}").unwrap();
        assert_eq!(
            storage.get_item("portfolio").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(dir.path().join("nested").join("portfolio.json").exists());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_gateway_over_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway =
            PersistenceGateway::new(FileStorage::new(dir.path()), Curriculum::default());
        let mut data = Curriculum::default().blank_portfolio();
        data.student_info.name = "Grace".to_string();
        crate::store::refresh_derived(&mut data);

        gateway.save(&data).unwrap();
        assert_eq!(gateway.load().data, data);
    }
}
