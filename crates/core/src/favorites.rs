//! Favorites persistence on top of [`LocalStorage`].

use anyhow::{Context, Result};
use tracing::info;

use crate::{models::Movie, storage::LocalStorage};

/// Storage key holding the JSON-encoded favorites array.
pub const FAVORITES_KEY: &str = "favoriteMovies";

/// Reads and rewrites the favorites list as a whole.
#[derive(Clone)]
pub struct FavoritesStore {
    storage: LocalStorage,
}

impl FavoritesStore {
    /// Wrap an opened storage handle.
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Underlying storage handle.
    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Current favorites. A missing key means no favorites yet.
    pub fn load(&self) -> Result<Vec<Movie>> {
        match self.storage.get_item(FAVORITES_KEY) {
            Some(raw) => serde_json::from_str(&raw).context("failed to parse stored favorites"),
            None => Ok(Vec::new()),
        }
    }

    /// Re-read the storage file, then load favorites from it.
    pub fn reload(&self) -> Result<Vec<Movie>> {
        self.storage.reload()?;
        self.load()
    }

    /// Overwrite the stored favorites with `movies`.
    pub fn save(&self, movies: &[Movie]) -> Result<()> {
        let serialized = serde_json::to_string(movies).context("failed to serialize favorites")?;
        self.storage.set_item(FAVORITES_KEY, serialized)?;
        info!(count = movies.len(), "favorites saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn movie(id: u64) -> Movie {
        Movie {
            id,
            title: format!("Movie {id}"),
            image: format!("{id}.jpg"),
            release_date: "2020-01-01".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn save_and_load_favorites() -> Result<()> {
        let dir = tempdir()?;
        let store = FavoritesStore::new(LocalStorage::open(dir.path().join("s.json"))?);
        assert!(store.load()?.is_empty());

        store.save(&[movie(1), movie(2)])?;
        let loaded = store.load()?;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].id, 2);
        Ok(())
    }

    #[test]
    fn empty_list_is_stored_as_empty_array() -> Result<()> {
        let dir = tempdir()?;
        let store = FavoritesStore::new(LocalStorage::open(dir.path().join("s.json"))?);
        store.save(&[movie(1)])?;
        store.save(&[])?;
        assert_eq!(store.storage().get_item(FAVORITES_KEY).as_deref(), Some("[]"));
        Ok(())
    }
}
