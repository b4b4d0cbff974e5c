//! Backend-agnostic document store handle.

use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use toybazaar_core::{CatalogQuery, Lookup, StoreBackend, ToySeed, ToyUpdate};
use uuid::Uuid;

use crate::memory::MemoryStore;
use crate::toys::{self, ToyRow};
use crate::{ping, seed, DbError};

/// The catalog's document store: Postgres in deployments, a process-local
/// map for development and tests. Cloning is cheap and shares the backend.
#[derive(Debug, Clone)]
pub enum ToyStore {
    Postgres(PgPool),
    Memory(MemoryStore),
}

impl ToyStore {
    #[must_use]
    pub fn backend(&self) -> StoreBackend {
        match self {
            ToyStore::Postgres(_) => StoreBackend::Postgres,
            ToyStore::Memory(_) => StoreBackend::Memory,
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the store query fails.
    pub async fn list(&self, query: &CatalogQuery) -> Result<Vec<ToyRow>, DbError> {
        match self {
            ToyStore::Postgres(pool) => toys::list_toys(pool, query).await,
            ToyStore::Memory(mem) => Ok(mem.list(query)),
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the store query fails.
    pub async fn find(&self, lookup: &Lookup) -> Result<Option<ToyRow>, DbError> {
        match self {
            ToyStore::Postgres(pool) => toys::find_toy(pool, lookup).await,
            ToyStore::Memory(mem) => mem.find(lookup),
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the store update fails.
    pub async fn increment_popularity(&self, id: Uuid) -> Result<Option<i64>, DbError> {
        match self {
            ToyStore::Postgres(pool) => toys::increment_popularity(pool, id).await,
            ToyStore::Memory(mem) => Ok(mem.increment_popularity(id)),
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the store update fails.
    pub async fn update(&self, id: Uuid, update: &ToyUpdate) -> Result<Option<ToyRow>, DbError> {
        match self {
            ToyStore::Postgres(pool) => toys::update_toy(pool, id, update).await,
            ToyStore::Memory(mem) => Ok(mem.update(id, update)),
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError::InvalidDocument`] for a non-object document, or
    /// another [`DbError`] if the insert fails.
    pub async fn insert(&self, doc: Value) -> Result<Uuid, DbError> {
        match self {
            ToyStore::Postgres(pool) => toys::insert_toy(pool, &doc).await,
            ToyStore::Memory(mem) => mem.insert(doc),
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the store update fails.
    pub async fn append_image(&self, id: Uuid, url: &str) -> Result<Option<ToyRow>, DbError> {
        match self {
            ToyStore::Postgres(pool) => toys::append_image(pool, id, url).await,
            ToyStore::Memory(mem) => Ok(mem.append_image(id, url)),
        }
    }

    /// Insert seed products whose slug is not yet stored; returns how many
    /// were inserted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if an insert fails.
    pub async fn seed(&self, toys: &[ToySeed]) -> Result<usize, DbError> {
        match self {
            ToyStore::Postgres(pool) => seed::seed_toys(pool, toys).await,
            ToyStore::Memory(mem) => {
                let created = Utc::now();
                let mut count = 0usize;
                for toy in toys {
                    if mem.insert_if_slug_absent(toy.to_document(created))? {
                        count += 1;
                    }
                }
                Ok(count)
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the store does not answer.
    pub async fn health_check(&self) -> Result<(), DbError> {
        match self {
            ToyStore::Postgres(pool) => ping(pool).await.map_err(DbError::from),
            ToyStore::Memory(_) => Ok(()),
        }
    }
}

impl From<PgPool> for ToyStore {
    fn from(pool: PgPool) -> Self {
        ToyStore::Postgres(pool)
    }
}

impl From<MemoryStore> for ToyStore {
    fn from(store: MemoryStore) -> Self {
        ToyStore::Memory(store)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;
    use toybazaar_core::load_toys;

    use super::*;

    fn memory() -> ToyStore {
        ToyStore::from(MemoryStore::new())
    }

    #[tokio::test]
    async fn concurrent_increments_do_not_lose_updates() {
        let store = memory();
        let id = store
            .insert(json!({ "name": "Kite", "popularity": 5 }))
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            tokio::spawn({
                let store = store.clone();
                async move { store.increment_popularity(id).await }
            }),
            tokio::spawn({
                let store = store.clone();
                async move { store.increment_popularity(id).await }
            }),
        );
        let mut seen = vec![a.unwrap().unwrap().unwrap(), b.unwrap().unwrap().unwrap()];
        seen.sort_unstable();
        assert_eq!(seen, vec![6, 7]);

        let row = store.find(&Lookup::PrimaryKey(id)).await.unwrap().unwrap();
        assert_eq!(row.doc["popularity"], json!(7));
    }

    #[tokio::test]
    async fn many_concurrent_increments_all_land() {
        let store = memory();
        let id = store.insert(json!({ "name": "Ball" })).await.unwrap();

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment_popularity(id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.increment_popularity(id).await.unwrap(), Some(51));
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/toys.yaml");
        let file = load_toys(&path).unwrap();
        let store = memory();

        let first = store.seed(&file.toys).await.unwrap();
        assert_eq!(first, file.toys.len());
        assert_eq!(store.seed(&file.toys).await.unwrap(), 0);

        let rows = store.list(&CatalogQuery::default()).await.unwrap();
        assert_eq!(rows.len(), file.toys.len());
        assert!(rows.iter().all(|r| r.doc["popularity"] == json!(0)));
    }

    #[tokio::test]
    async fn memory_store_is_always_healthy() {
        let store = memory();
        assert_eq!(store.backend(), StoreBackend::Memory);
        store.health_check().await.unwrap();
    }
}
