//! Document Store - SQLite-backed JSON document storage
//!
//! Every document lives in a single `documents` table keyed by
//! `(collection, id)`, with an owner column indexed for per-user listing.
//! Bodies are stored as opaque JSON text; typed access goes through
//! [`DocumentStore::get_typed`] and [`DocumentStore::list_typed`], which
//! run legacy normalization before decoding.

use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::normalize::normalize_document;

/// Document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Profiles,
    Items,
    Subscriptions,
    Wears,
    Outfits,
    Gamification,
    Enrollments,
}

impl Collection {
    pub fn all() -> &'static [Collection] {
        &[
            Collection::Profiles,
            Collection::Items,
            Collection::Subscriptions,
            Collection::Wears,
            Collection::Outfits,
            Collection::Gamification,
            Collection::Enrollments,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Profiles => "profiles",
            Collection::Items => "items",
            Collection::Subscriptions => "subscriptions",
            Collection::Wears => "wears",
            Collection::Outfits => "outfits",
            Collection::Gamification => "gamification",
            Collection::Enrollments => "enrollments",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored document with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub collection: Collection,
    pub id: String,
    pub owner_id: String,
    pub body: Value,
    /// Milliseconds since epoch
    pub created_at: i64,
    /// Milliseconds since epoch
    pub updated_at: i64,
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for all data
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("wardrobe_data"),
        }
    }
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path to the SQLite database file
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("wardrobe.db")
    }
}

/// Per-collection document counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub documents: u64,
    pub by_collection: Vec<(String, u64)>,
}

/// SQLite-backed JSON document store
pub struct DocumentStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl DocumentStore {
    /// Open (or create) the store under the configured data directory
    pub fn open(config: &StorageConfig) -> StorageResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let path = config.db_path();

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        Self::init_schema(&conn)?;
        tracing::info!(path = %path.display(), "Document store opened");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
        })
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_owner ON documents(collection, owner_id)",
            [],
        )?;

        Ok(())
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert or replace a document. `created_at` survives replacement.
    pub async fn put(
        &self,
        collection: Collection,
        id: &str,
        owner_id: &str,
        body: &Value,
    ) -> StorageResult<()> {
        let now = Utc::now().timestamp_millis();
        let text = serde_json::to_string(body)?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO documents (collection, id, owner_id, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(collection, id) DO UPDATE SET
                owner_id = excluded.owner_id,
                body = excluded.body,
                updated_at = excluded.updated_at",
            params![collection.as_str(), id, owner_id, text, now],
        )?;

        tracing::trace!(collection = %collection, id = %id, "Document stored");
        Ok(())
    }

    /// Fetch a raw document
    pub async fn get(&self, collection: Collection, id: &str) -> StorageResult<Option<Document>> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT owner_id, body, created_at, updated_at FROM documents
                 WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((owner_id, body, created_at, updated_at)) => Ok(Some(Document {
                collection,
                id: id.to_string(),
                owner_id,
                body: serde_json::from_str(&body)?,
                created_at,
                updated_at,
            })),
            None => Ok(None),
        }
    }

    /// Delete a document, returning whether it existed
    pub async fn delete(&self, collection: Collection, id: &str) -> StorageResult<bool> {
        let conn = self.conn.lock().await;
        let affected = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id],
        )?;
        Ok(affected > 0)
    }

    /// All documents of a collection owned by a user, oldest first
    pub async fn list_by_owner(
        &self,
        collection: Collection,
        owner_id: &str,
    ) -> StorageResult<Vec<Document>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, body, created_at, updated_at FROM documents
             WHERE collection = ?1 AND owner_id = ?2
             ORDER BY created_at, id",
        )?;

        let rows = stmt.query_map(params![collection.as_str(), owner_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, body, created_at, updated_at) = row?;
            match serde_json::from_str(&body) {
                Ok(body) => docs.push(Document {
                    collection,
                    id,
                    owner_id: owner_id.to_string(),
                    body,
                    created_at,
                    updated_at,
                }),
                Err(e) => {
                    tracing::warn!(collection = %collection, id = %id, error = %e, "Skipping unreadable document");
                }
            }
        }
        Ok(docs)
    }

    /// Number of documents of a collection owned by a user
    pub async fn count_by_owner(&self, collection: Collection, owner_id: &str) -> StorageResult<usize> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1 AND owner_id = ?2",
            params![collection.as_str(), owner_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Decode a document into a typed value after legacy normalization
    pub async fn get_typed<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> StorageResult<Option<T>> {
        match self.get(collection, id).await? {
            Some(mut doc) => {
                normalize_document(&mut doc);
                Ok(Some(serde_json::from_value(doc.body)?))
            }
            None => Ok(None),
        }
    }

    /// Decode every document a user owns in a collection.
    ///
    /// Documents that cannot be decoded even after normalization are
    /// logged and skipped rather than failing the whole listing.
    pub async fn list_typed<T: DeserializeOwned>(
        &self,
        collection: Collection,
        owner_id: &str,
    ) -> StorageResult<Vec<T>> {
        let docs = self.list_by_owner(collection, owner_id).await?;
        let mut out = Vec::with_capacity(docs.len());
        for mut doc in docs {
            normalize_document(&mut doc);
            let id = doc.id.clone();
            match serde_json::from_value(doc.body) {
                Ok(value) => out.push(value),
                Err(e) => {
                    tracing::warn!(collection = %collection, id = %id, error = %e, "Skipping malformed document");
                }
            }
        }
        Ok(out)
    }

    /// Serialize and store a typed value
    pub async fn put_typed<T: Serialize>(
        &self,
        collection: Collection,
        id: &str,
        owner_id: &str,
        value: &T,
    ) -> StorageResult<()> {
        let body = serde_json::to_value(value)?;
        self.put(collection, id, owner_id, &body).await
    }

    /// Document counts per collection
    pub async fn stats(&self) -> StorageResult<StoreStats> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT collection, COUNT(*) FROM documents GROUP BY collection ORDER BY collection",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

        let mut stats = StoreStats::default();
        for row in rows {
            let (collection, count) = row?;
            stats.documents += count as u64;
            stats.by_collection.push((collection, count as u64));
        }
        Ok(stats)
    }

    /// Cheap liveness query for health checks
    pub async fn ping(&self) -> bool {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = DocumentStore::open_in_memory().unwrap();
        let body = json!({"name": "Tee"});

        store.put(Collection::Items, "i1", "u1", &body).await.unwrap();
        let doc = store.get(Collection::Items, "i1").await.unwrap().unwrap();
        assert_eq!(doc.owner_id, "u1");
        assert_eq!(doc.body, body);

        assert!(store.delete(Collection::Items, "i1").await.unwrap());
        assert!(!store.delete(Collection::Items, "i1").await.unwrap());
        assert!(store.get(Collection::Items, "i1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_keeps_created_at() {
        let store = DocumentStore::open_in_memory().unwrap();
        store.put(Collection::Items, "i1", "u1", &json!({"v": 1})).await.unwrap();
        let first = store.get(Collection::Items, "i1").await.unwrap().unwrap();

        store.put(Collection::Items, "i1", "u1", &json!({"v": 2})).await.unwrap();
        let second = store.get(Collection::Items, "i1").await.unwrap().unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.body["v"], 2);
    }

    #[tokio::test]
    async fn test_list_and_count_by_owner() {
        let store = DocumentStore::open_in_memory().unwrap();
        store.put(Collection::Items, "a", "u1", &json!({})).await.unwrap();
        store.put(Collection::Items, "b", "u1", &json!({})).await.unwrap();
        store.put(Collection::Items, "c", "u2", &json!({})).await.unwrap();
        store.put(Collection::Wears, "w", "u1", &json!({})).await.unwrap();

        let docs = store.list_by_owner(Collection::Items, "u1").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(store.count_by_owner(Collection::Items, "u2").await.unwrap(), 1);
        assert_eq!(store.count_by_owner(Collection::Outfits, "u1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = DocumentStore::open_in_memory().unwrap();
        store.put(Collection::Items, "a", "u1", &json!({})).await.unwrap();
        store.put(Collection::Profiles, "u1", "u1", &json!({})).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.by_collection.len(), 2);
        assert!(store.ping().await);
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path());

        {
            let store = DocumentStore::open(&config).unwrap();
            store
                .put(Collection::Profiles, "u1", "u1", &json!({"display_name": "Ada"}))
                .await
                .unwrap();
        }

        let store = DocumentStore::open(&config).unwrap();
        let doc = store.get(Collection::Profiles, "u1").await.unwrap().unwrap();
        assert_eq!(doc.body["display_name"], "Ada");
        assert_eq!(store.path(), Some(config.db_path().as_path()));
    }
}
