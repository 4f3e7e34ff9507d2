// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::FavoritesError;
use crate::filter::{FilterMode, collate};

use super::entry::{EpisodeRef, FavoriteEntry};
use super::storage::FavoritesStorage;

/// Storage key holding the persisted favorites list
pub const FAVORITES_KEY: &str = "favorites";

/// The set of favorited shows and episodes.
///
/// Every mutation is written through to storage before it returns. If the
/// write fails the in-memory change is rolled back, so the store never claims
/// a favorite that storage does not hold.
///
/// Mutations take `&mut self`: the store has exactly one owner, which hands
/// out borrows to whichever view needs it.
#[derive(Debug)]
pub struct FavoritesStore<S: FavoritesStorage> {
    storage: S,
    entries: Vec<FavoriteEntry>,
}

impl<S: FavoritesStorage> FavoritesStore<S> {
    /// Load persisted favorites, starting empty if they are absent or unreadable
    pub fn load(storage: S) -> Self {
        let entries = match storage.load(FAVORITES_KEY) {
            Ok(Some(content)) => parse_entries(&content),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read favorites, starting empty");
                Vec::new()
            }
        };

        tracing::info!(count = entries.len(), "favorites loaded");
        Self { storage, entries }
    }

    /// Add a favorite; returns `false` if it was already present
    pub fn add(
        &mut self,
        show_id: &str,
        episode_ref: Option<EpisodeRef>,
    ) -> Result<bool, FavoritesError> {
        self.add_at(show_id, episode_ref, Utc::now())
    }

    /// Add a favorite with an explicit timestamp
    pub fn add_at(
        &mut self,
        show_id: &str,
        episode_ref: Option<EpisodeRef>,
        added_at: DateTime<Utc>,
    ) -> Result<bool, FavoritesError> {
        if self.is_favorite(show_id, episode_ref) {
            return Ok(false);
        }

        self.entries.push(FavoriteEntry {
            show_id: show_id.to_string(),
            episode_ref,
            added_at,
        });

        if let Err(e) = self.persist() {
            self.entries.pop();
            return Err(e);
        }

        Ok(true)
    }

    /// Remove a favorite; returns `false` if there was nothing to remove
    pub fn remove(
        &mut self,
        show_id: &str,
        episode_ref: Option<EpisodeRef>,
    ) -> Result<bool, FavoritesError> {
        let Some(position) = self
            .entries
            .iter()
            .position(|entry| entry.matches(show_id, episode_ref))
        else {
            return Ok(false);
        };

        let removed = self.entries.remove(position);

        if let Err(e) = self.persist() {
            self.entries.insert(position, removed);
            return Err(e);
        }

        Ok(true)
    }

    /// Flip a favorite and return whether it is now set
    pub fn toggle(
        &mut self,
        show_id: &str,
        episode_ref: Option<EpisodeRef>,
    ) -> Result<bool, FavoritesError> {
        if self.is_favorite(show_id, episode_ref) {
            self.remove(show_id, episode_ref).map(|_| false)
        } else {
            self.add(show_id, episode_ref).map(|_| true)
        }
    }

    pub fn clear(&mut self) -> Result<(), FavoritesError> {
        let previous = std::mem::take(&mut self.entries);

        if let Err(e) = self.persist() {
            self.entries = previous;
            return Err(e);
        }

        Ok(())
    }

    pub fn is_favorite(&self, show_id: &str, episode_ref: Option<EpisodeRef>) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.matches(show_id, episode_ref))
    }

    /// Snapshot of the favorites, optionally ordered for the favorites page
    ///
    /// `Newest`/`Oldest` order by when the favorite was added, `A-Z`/`Z-A` by
    /// show id then episode. Every other mode keeps insertion order; ordering
    /// by show title or genre needs the catalog, see
    /// [`CatalogController::favorite_shows`](crate::controller::CatalogController::favorite_shows).
    pub fn list(&self, mode: Option<&FilterMode>) -> Vec<FavoriteEntry> {
        let mut entries = self.entries.clone();

        match mode {
            Some(FilterMode::Newest) => entries.sort_by(|a, b| b.added_at.cmp(&a.added_at)),
            Some(FilterMode::Oldest) => entries.sort_by(|a, b| a.added_at.cmp(&b.added_at)),
            Some(FilterMode::TitleAscending) => entries.sort_by(|a, b| {
                collate(&a.show_id, &b.show_id).then_with(|| a.episode_ref.cmp(&b.episode_ref))
            }),
            Some(FilterMode::TitleDescending) => entries.sort_by(|a, b| {
                collate(&b.show_id, &a.show_id).then_with(|| b.episode_ref.cmp(&a.episode_ref))
            }),
            Some(FilterMode::All) | Some(FilterMode::Genre(_)) | None => {}
        }

        entries
    }

    /// Distinct show ids with at least one favorite, in insertion order
    pub fn show_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|entry| entry.show_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), FavoritesError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        self.storage.save(FAVORITES_KEY, &json).inspect_err(|e| {
            tracing::warn!(error = %e, "failed to persist favorites");
        })
    }
}

/// Parse persisted favorites, skipping records that cannot be read
fn parse_entries(content: &str) -> Vec<FavoriteEntry> {
    let records = match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            tracing::warn!("favorites storage is not a list, starting empty");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "favorites storage is not valid JSON, starting empty");
            return Vec::new();
        }
    };

    let mut entries: Vec<FavoriteEntry> = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value::<FavoriteEntry>(record) {
            Ok(entry) if !entries.iter().any(|e| e.key() == entry.key()) => entries.push(entry),
            Ok(entry) => tracing::debug!(show_id = %entry.show_id, "dropping duplicate favorite"),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable favorite"),
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::{FileStorage, MemoryStorage};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn add_then_is_favorite() {
        let mut store = FavoritesStore::load(MemoryStorage::new());

        assert!(store.add("10716", None).unwrap());
        assert!(store.is_favorite("10716", None));
        assert!(!store.is_favorite("10716", Some(EpisodeRef::new(1, 1))));
    }

    #[test]
    fn add_is_idempotent() {
        let mut store = FavoritesStore::load(MemoryStorage::new());
        let episode = Some(EpisodeRef::new(2, 4));

        assert!(store.add("a", episode).unwrap());
        assert!(!store.add("a", episode).unwrap());
        assert_eq!(store.list(None).len(), 1);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut store = FavoritesStore::load(MemoryStorage::new());
        assert!(!store.remove("ghost", None).unwrap());

        store.add("a", None).unwrap();
        assert!(store.remove("a", None).unwrap());
        assert!(!store.is_favorite("a", None));
        assert!(store.is_empty());
    }

    #[test]
    fn toggle_flips_state() {
        let mut store = FavoritesStore::load(MemoryStorage::new());
        assert!(store.toggle("a", None).unwrap());
        assert!(!store.toggle("a", None).unwrap());
        assert!(!store.is_favorite("a", None));
    }

    #[test]
    fn mutations_are_written_through() {
        let storage = MemoryStorage::new();
        let mut store = FavoritesStore::load(storage.clone());

        store.add("a", Some(EpisodeRef::new(1, 2))).unwrap();
        let persisted = storage.load(FAVORITES_KEY).unwrap().unwrap();
        assert!(persisted.contains("\"showId\": \"a\""));

        store.remove("a", Some(EpisodeRef::new(1, 2))).unwrap();
        let persisted = storage.load(FAVORITES_KEY).unwrap().unwrap();
        assert_eq!(parse_entries(&persisted).len(), 0);
    }

    #[test]
    fn reload_reproduces_entries() {
        let dir = tempdir().unwrap();
        let mut store = FavoritesStore::load(FileStorage::new(dir.path()));
        store.add_at("a", None, at(0)).unwrap();
        store.add_at("b", Some(EpisodeRef::new(3, 1)), at(10)).unwrap();

        let reloaded = FavoritesStore::load(FileStorage::new(dir.path()));
        assert_eq!(reloaded.list(None), store.list(None));
        assert!(reloaded.is_favorite("b", Some(EpisodeRef::new(3, 1))));
    }

    #[test]
    fn malformed_storage_starts_empty() {
        for content in ["not json", r#"{"showId": "a"}"#, "42"] {
            let storage = MemoryStorage::new();
            storage.insert(FAVORITES_KEY, content);
            assert!(FavoritesStore::load(storage).is_empty());
        }
    }

    #[test]
    fn unreadable_records_are_skipped() {
        let storage = MemoryStorage::new();
        storage.insert(
            FAVORITES_KEY,
            r#"[
                {"showId": "a", "addedAt": "2024-01-01T00:00:00Z"},
                {"showId": 5},
                {"showId": "a", "addedAt": "2024-02-01T00:00:00Z"},
                {"showId": "b", "episodeRef": null, "addedAt": "2024-03-01T00:00:00Z"}
            ]"#,
        );

        let store = FavoritesStore::load(storage);
        let ids: Vec<String> = store.list(None).into_iter().map(|e| e.show_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn failed_write_rolls_back() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"file").unwrap();

        let mut store = FavoritesStore::load(FileStorage::new(&blocker));
        let err = store.add("a", None).unwrap_err();

        assert!(matches!(err, FavoritesError::WriteFailed { .. }));
        assert!(!store.is_favorite("a", None));
        assert!(store.is_empty());
    }

    #[test]
    fn list_orders_by_mode() {
        let mut store = FavoritesStore::load(MemoryStorage::new());
        store.add_at("b", None, at(0)).unwrap();
        store.add_at("a", None, at(20)).unwrap();
        store.add_at("c", None, at(10)).unwrap();

        let ids = |mode: Option<&FilterMode>| -> Vec<String> {
            store.list(mode).into_iter().map(|e| e.show_id).collect()
        };

        assert_eq!(ids(None), vec!["b", "a", "c"]);
        assert_eq!(ids(Some(&FilterMode::Newest)), vec!["a", "c", "b"]);
        assert_eq!(ids(Some(&FilterMode::Oldest)), vec!["b", "c", "a"]);
        assert_eq!(ids(Some(&FilterMode::TitleAscending)), vec!["a", "b", "c"]);
        assert_eq!(ids(Some(&FilterMode::TitleDescending)), vec!["c", "b", "a"]);
        assert_eq!(ids(Some(&FilterMode::All)), vec!["b", "a", "c"]);
    }

    #[test]
    fn clear_empties_storage() {
        let storage = MemoryStorage::new();
        let mut store = FavoritesStore::load(storage.clone());
        store.add("a", None).unwrap();
        store.add("b", None).unwrap();

        store.clear().unwrap();

        assert!(store.is_empty());
        assert!(FavoritesStore::load(storage).is_empty());
    }

    #[test]
    fn show_ids_are_distinct() {
        let mut store = FavoritesStore::load(MemoryStorage::new());
        store.add("a", None).unwrap();
        store.add("a", Some(EpisodeRef::new(1, 1))).unwrap();
        store.add("b", None).unwrap();

        assert_eq!(store.show_ids(), vec!["a", "b"]);
    }
}
