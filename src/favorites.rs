//! Bookmarked commits and their on-device persistence.
//!
//! Two storage formats exist:
//! - v1 ([`FormatVersion::Legacy`]): a JSON array of bare commit ids
//! - v2 ([`FormatVersion::Rich`]): a JSON array of [`FavoriteRecord`]s
//!
//! Reads try the newest format first and fall back through older ones. Writes
//! always produce the newest format, plus the legacy id list so an older
//! client still sees the right membership.
//!
//! Storage problems never escape this module: they are logged, remembered as
//! [`FavoritesStore::last_warning`], and the in-memory index keeps working.

use std::collections::{HashMap, HashSet};

use chrono::DateTime;

use crate::error::StorageError;
use crate::models::FavoriteRecord;
use crate::storage::KeyValueStore;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormatVersion {
    Legacy = 1,
    Rich = 2,
}

impl FormatVersion {
    pub const LATEST: FormatVersion = FormatVersion::Rich;

    pub fn slot(self) -> &'static str {
        match self {
            FormatVersion::Legacy => "favorite_commits",
            FormatVersion::Rich => "favorite_commit_records",
        }
    }
}

/// Decoded contents of one storage slot.
#[derive(Debug, PartialEq)]
pub enum PersistedFavorites {
    Legacy(Vec<String>),
    Rich(Vec<FavoriteRecord>),
}

impl PersistedFavorites {
    pub fn decode(version: FormatVersion, raw: &str) -> Result<Self, StorageError> {
        Ok(match version {
            FormatVersion::Legacy => PersistedFavorites::Legacy(serde_json::from_str(raw)?),
            FormatVersion::Rich => PersistedFavorites::Rich(serde_json::from_str(raw)?),
        })
    }
}

pub struct FavoritesStore {
    order: Vec<String>,
    ids: HashSet<String>,
    records: HashMap<String, FavoriteRecord>,
    storage: Option<Box<dyn KeyValueStore>>,
    initialized: bool,
    last_warning: Option<String>,
}

impl FavoritesStore {
    /// Creates an empty store. Nothing is read until [`FavoritesStore::init`].
    /// A storage backend that reports itself unavailable is dropped and the
    /// store runs purely in memory.
    pub fn new(storage: Option<Box<dyn KeyValueStore>>) -> Self {
        let storage = match storage {
            Some(s) if s.is_available() => Some(s),
            Some(_) => {
                tracing::warn!("Local storage unavailable, favorites will not be persisted");
                None
            }
            None => None,
        };
        Self {
            order: Vec::new(),
            ids: HashSet::new(),
            records: HashMap::new(),
            storage,
            initialized: false,
            last_warning: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(None)
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    /// Loads persisted favorites, migrating the legacy format if that is all
    /// there is. Runs once; later calls are no-ops whatever the first outcome.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        if let Err(e) = self.load() {
            tracing::warn!("Failed to load favorites, starting empty: {}", e);
            self.last_warning = Some(e.to_string());
            self.clear_index();
        }
    }

    fn load(&mut self) -> Result<(), StorageError> {
        let Some(storage) = self.storage.as_deref() else {
            return Ok(());
        };

        let rich = read_slot(storage, FormatVersion::Rich)?;
        let legacy = read_slot(storage, FormatVersion::Legacy)?;

        match (rich, legacy) {
            (Some(PersistedFavorites::Rich(records)), legacy) => {
                // The legacy slot is written through alongside the rich one, so
                // it holds the full id order including ids never backfilled
                if let Some(PersistedFavorites::Legacy(ids)) = legacy {
                    for id in ids {
                        self.insert_id(&id);
                    }
                }
                let count = records.len();
                for record in records {
                    self.insert_id(&record.id);
                    self.records.insert(record.id.clone(), record);
                }
                tracing::info!("Loaded {} favorite records ({} ids)", count, self.order.len());
            }
            (_, Some(PersistedFavorites::Legacy(ids))) => {
                for id in ids {
                    self.insert_id(&id);
                }
                tracing::info!("Migrated {} favorites from the legacy id list", self.order.len());
            }
            _ => {
                tracing::debug!("No persisted favorites found");
            }
        }
        Ok(())
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Removes `id` when present, adds it otherwise. Returns whether the id is
    /// a favorite afterwards.
    pub fn toggle_favorite(&mut self, id: &str, record: Option<FavoriteRecord>) -> bool {
        if self.is_favorite(id) {
            self.remove_favorite(id);
            false
        } else {
            self.add_favorite(id, record);
            true
        }
    }

    pub fn add_favorite(&mut self, id: &str, record: Option<FavoriteRecord>) {
        self.insert_id(id);
        if let Some(mut record) = record {
            record.id = id.to_string();
            self.records.insert(id.to_string(), record);
        }
        self.persist();
    }

    pub fn remove_favorite(&mut self, id: &str) {
        if self.ids.remove(id) {
            self.order.retain(|existing| existing != id);
        }
        self.records.remove(id);
        self.persist();
    }

    pub fn list_favorite_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Records newest first. Timestamps that do not parse sort as the Unix
    /// epoch; equal timestamps keep insertion order.
    pub fn list_favorite_records(&self) -> Vec<FavoriteRecord> {
        let mut records: Vec<FavoriteRecord> = self
            .order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect();
        records.sort_by_key(|record| std::cmp::Reverse(sort_key(&record.timestamp)));
        records
    }

    pub fn get_favorite_record(&self, id: &str) -> Option<&FavoriteRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn last_warning(&self) -> Option<&str> {
        self.last_warning.as_deref()
    }

    fn insert_id(&mut self, id: &str) {
        if self.ids.insert(id.to_string()) {
            self.order.push(id.to_string());
        }
    }

    fn clear_index(&mut self) {
        self.order.clear();
        self.ids.clear();
        self.records.clear();
    }

    fn persist(&mut self) {
        if let Err(e) = self.write_all() {
            tracing::warn!("Failed to persist favorites: {}", e);
            self.last_warning = Some(e.to_string());
        }
    }

    fn write_all(&mut self) -> Result<(), StorageError> {
        let records: Vec<&FavoriteRecord> = self.order.iter().filter_map(|id| self.records.get(id)).collect();
        let rich = serde_json::to_string(&records)?;
        let legacy = serde_json::to_string(&self.order)?;

        let Some(storage) = self.storage.as_deref_mut() else {
            return Ok(());
        };
        storage.set(FormatVersion::LATEST.slot(), &rich)?;
        storage.set(FormatVersion::Legacy.slot(), &legacy)?;
        Ok(())
    }
}

/// Reads and decodes one slot. Malformed content counts as absent; only a
/// failure of the storage medium itself is an error.
fn read_slot(storage: &dyn KeyValueStore, version: FormatVersion) -> Result<Option<PersistedFavorites>, StorageError> {
    let Some(raw) = storage.get(version.slot())? else {
        return Ok(None);
    };
    match PersistedFavorites::decode(version, &raw) {
        Ok(decoded) => Ok(Some(decoded)),
        Err(e) => {
            tracing::warn!("Ignoring malformed favorites slot '{}': {}", version.slot(), e);
            Ok(None)
        }
    }
}

fn sort_key(timestamp: &str) -> i64 {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}
