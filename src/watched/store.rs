use crate::error::AppError;
use crate::stats::WatchedSummary;
use crate::watched::{KeyValueStorage, WatchedEntry, WatchedList};

/// The watched list bound to its storage slot. Every successful mutation
/// is written through before it becomes visible.
pub struct WatchedStore {
    list: WatchedList,
    storage: Box<dyn KeyValueStorage>,
    slot: String,
}

impl WatchedStore {
    /// Hydrate from `slot`. An absent slot starts an empty list; a slot that
    /// does not hold a valid list is an error rather than being overwritten.
    pub fn open(storage: Box<dyn KeyValueStorage>, slot: &str) -> Result<Self, AppError> {
        let list = match storage.read(slot)? {
            Some(json) => WatchedList::from_entries(serde_json::from_str(&json)?),
            None => WatchedList::default(),
        };

        tracing::info!(slot, count = list.len(), "Watched list loaded");
        Ok(Self {
            list,
            storage,
            slot: slot.to_string(),
        })
    }

    pub fn list(&self) -> &WatchedList {
        &self.list
    }

    pub fn summary(&self) -> WatchedSummary {
        WatchedSummary::from_entries(self.list.entries())
    }

    pub fn add(&mut self, entry: WatchedEntry) -> Result<(), AppError> {
        let mut next = self.list.clone();
        let imdb_id = entry.imdb_id.clone();
        next.add(entry)?;
        self.commit(next)?;

        tracing::info!(imdb_id = %imdb_id, "Added to watched list");
        Ok(())
    }

    pub fn remove(&mut self, imdb_id: &str) -> Result<usize, AppError> {
        let mut next = self.list.clone();
        let removed = next.remove(imdb_id);
        if removed > 0 {
            self.commit(next)?;
            tracing::info!(imdb_id, removed, "Removed from watched list");
        }
        Ok(removed)
    }

    fn commit(&mut self, next: WatchedList) -> Result<(), AppError> {
        let json = serde_json::to_string(next.entries())?;
        self.storage.write(&self.slot, &json)?;
        self.list = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watched::{entry, FileStorage, MemoryStorage};
    use assert_matches::assert_matches;

    #[test]
    fn test_absent_slot_is_empty_list() {
        let store = WatchedStore::open(Box::new(MemoryStorage::default()), "watched").unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_list_survives_reload() {
        let storage = MemoryStorage::default();
        {
            let mut store = WatchedStore::open(Box::new(storage.clone()), "watched").unwrap();
            store.add(entry("tt1", 8.0, 7, 120)).unwrap();
            store.add(entry("tt2", 9.0, 10, 90)).unwrap();
        }

        let reloaded = WatchedStore::open(Box::new(storage), "watched").unwrap();
        let ids: Vec<_> = reloaded.list().entries().iter().map(|e| e.imdb_id.as_str()).collect();
        assert_eq!(ids, vec!["tt1", "tt2"]);
        assert_eq!(reloaded.list().get("tt2").unwrap().user_rating, Some(10));
    }

    #[test]
    fn test_file_backed_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = WatchedStore::open(Box::new(FileStorage::new(dir.path())), "watched").unwrap();
            store.add(entry("tt1", 8.0, 7, 120)).unwrap();
            store.add(entry("tt2", 9.0, 10, 90)).unwrap();
            assert_eq!(store.remove("tt1").unwrap(), 1);
        }

        let reloaded = WatchedStore::open(Box::new(FileStorage::new(dir.path())), "watched").unwrap();
        assert_eq!(reloaded.list().entries(), &[entry("tt2", 9.0, 10, 90)]);
    }

    #[test]
    fn test_every_mutation_is_written() {
        let storage = MemoryStorage::default();
        let mut store = WatchedStore::open(Box::new(storage.clone()), "watched").unwrap();

        store.add(entry("tt1", 8.0, 7, 120)).unwrap();
        let written: Vec<WatchedEntry> = serde_json::from_str(&storage.raw("watched").unwrap()).unwrap();
        assert_eq!(written.len(), 1);

        store.remove("tt1").unwrap();
        assert_eq!(storage.raw("watched").as_deref(), Some("[]"));
    }

    #[test]
    fn test_rejected_duplicate_is_not_written() {
        let storage = MemoryStorage::default();
        let mut store = WatchedStore::open(Box::new(storage.clone()), "watched").unwrap();
        store.add(entry("tt1", 8.0, 7, 120)).unwrap();
        let before = storage.raw("watched");

        assert_matches!(store.add(entry("tt1", 8.0, 3, 120)), Err(AppError::AlreadyWatched(_)));
        assert_eq!(storage.raw("watched"), before);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_corrupt_slot_is_an_error() {
        let storage = MemoryStorage::default();
        storage.put("watched", "{not json");

        let result = WatchedStore::open(Box::new(storage), "watched");
        assert!(matches!(result, Err(AppError::JsonError(_))));
    }

    #[test]
    fn test_stored_camel_case_format() {
        let storage = MemoryStorage::default();
        storage.put(
            "watched",
            r#"[{"imdbId":"tt1","title":"Old","year":"1999","poster":"","imdbRating":null,"runtime":136,"userRating":8}]"#,
        );

        let store = WatchedStore::open(Box::new(storage), "watched").unwrap();
        let old = store.list().get("tt1").unwrap();
        assert_eq!(old.imdb_rating, None);
        assert_eq!(old.runtime, 136);
        assert_eq!(old.rating_decisions, 0);
    }
}
