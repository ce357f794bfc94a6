//! Persistence gateway: named whole-collection records plus the question source.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::{
    error::AppError,
    models::{question::RawQuestion, user::CurrentUser},
    trivia::{QuestionRequest, QuestionSource},
};

/// Names of the durable records.
pub mod collections {
    pub const LEARNERS: &str = "eduQuizLearners";
    pub const TEACHERS: &str = "eduQuizTeachers";
    pub const LEADERBOARD: &str = "eduQuizLeaderboard";
    pub const PENDING_QUESTIONS: &str = "eduQuizPendingQuestions";
    pub const CURRENT_USER: &str = "eduQuizCurrentUser";
}

/// Error raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed while accessing `{name}`")]
    Backend {
        name: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to run storage migrations")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Raw string storage keyed by record name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, name: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, name: &str) -> Result<(), StoreError>;
}

/// Durable backend: one SQLite table of named JSON documents.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wraps an open pool and makes sure the `records` table exists.
    pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM records WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| StoreError::Backend {
                name: name.to_string(),
                source,
            })
    }

    async fn put(&self, name: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO records (name, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|source| StoreError::Backend {
            name: name.to_string(),
            source,
        })?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM records WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|source| StoreError::Backend {
                name: name.to_string(),
                source,
            })?;
        Ok(())
    }
}

/// Process-local backend, lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn put(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.records.write().await.remove(name);
        Ok(())
    }
}

/// Owner of every collection and the only caller of the question source.
///
/// Collections are always loaded, mutated and saved whole. Writers serialize on
/// one lock, so a load-mutate-save inside [`Gateway::transaction`] cannot lose an
/// update made by another request of this process.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn QuestionSource>,
    write_lock: Arc<Mutex<()>>,
}

impl Gateway {
    pub fn new(store: Arc<dyn KeyValueStore>, source: Arc<dyn QuestionSource>) -> Self {
        Self {
            store,
            source,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Loads a collection. Absent or unreadable records yield an empty list.
    pub async fn load_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, AppError> {
        let Some(raw) = self.store.get(name).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!("Ignoring malformed record `{}`: {}", name, e);
                Ok(Vec::new())
            }
        }
    }

    /// Overwrites a collection. Last writer wins.
    pub async fn save_collection<T: Serialize>(&self, name: &str, records: &[T]) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.write(name, records).await
    }

    /// Starts a load-mutate-save boundary holding the write lock until dropped.
    pub async fn transaction(&self) -> Transaction<'_> {
        Transaction {
            gateway: self,
            _guard: self.write_lock.lock().await,
        }
    }

    async fn write<T: Serialize>(&self, name: &str, records: &[T]) -> Result<(), AppError> {
        let raw = serde_json::to_string(records)?;
        self.store.put(name, &raw).await?;
        Ok(())
    }

    /// Requests one question set from the source. A single attempt.
    pub async fn fetch_questions(&self, request: QuestionRequest) -> Result<Vec<RawQuestion>, AppError> {
        self.source.fetch(request).await.map_err(AppError::from)
    }

    pub async fn get_current_user(&self) -> Result<Option<CurrentUser>, AppError> {
        let Some(raw) = self.store.get(collections::CURRENT_USER).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Ignoring malformed current user record: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn set_current_user(&self, user: &CurrentUser) -> Result<(), AppError> {
        let raw = serde_json::to_string(user)?;
        let _guard = self.write_lock.lock().await;
        self.store.put(collections::CURRENT_USER, &raw).await?;
        Ok(())
    }

    pub async fn clear_current_user(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(collections::CURRENT_USER).await?;
        Ok(())
    }
}

/// Exclusive access to the collections for one load-mutate-save sequence.
pub struct Transaction<'a> {
    gateway: &'a Gateway,
    _guard: MutexGuard<'a, ()>,
}

impl Transaction<'_> {
    pub async fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, AppError> {
        self.gateway.load_collection(name).await
    }

    pub async fn save<T: Serialize>(&self, name: &str, records: &[T]) -> Result<(), AppError> {
        self.gateway.write(name, records).await
    }
}
