use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use thiserror::Error;

use crate::models::{Gender, GeoPoint, Preference, UserProfile};

/// Errors that can occur when talking to the relation store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Directed relation kinds persisted between users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Likes,
    Blocks,
}

impl EdgeKind {
    fn table(self) -> &'static str {
        match self {
            EdgeKind::Likes => "likes",
            EdgeKind::Blocks => "blocks",
        }
    }
}

/// Persistence seam for relationship edges and the profiles they connect.
///
/// Edge operations are atomic per single edge; the engine layers its own
/// read/write discipline on top and never asks for cross-edge transactions.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Whether the directed edge `from -> to` currently exists.
    async fn edge_exists(&self, kind: EdgeKind, from: &str, to: &str) -> Result<bool, StoreError>;

    /// Create or remove a single edge. Returns whether the call changed
    /// anything; false means the edge was already in the requested state.
    async fn set_edge(
        &self,
        kind: EdgeKind,
        from: &str,
        to: &str,
        present: bool,
    ) -> Result<bool, StoreError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    async fn get_user_tags(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    /// Ids with an active block involving `user_id`, in either direction,
    /// fetched in one round trip per browse request.
    async fn blocked_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError>;

    /// Candidate profiles for a browse request, excluding the viewer.
    async fn browse_candidates(&self, viewer_id: &str) -> Result<Vec<UserProfile>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// PostgreSQL-backed relation store
///
/// Holds the `users`/`user_tags` tables and one table per edge kind. Edge
/// inserts use `ON CONFLICT DO NOTHING` so redundant transitions are
/// detected from `rows_affected` instead of failing.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    fn row_to_profile(row: &PgRow) -> UserProfile {
        let latitude: Option<f64> = row.get("latitude");
        let longitude: Option<f64> = row.get("longitude");
        let location = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };

        let gender: String = row.get("gender");
        let preference: String = row.get("sexual_preference");

        UserProfile {
            user_id: row.get("user_id"),
            username: row.get("username"),
            gender: Gender::parse(&gender),
            sexual_preference: Preference::parse(&preference),
            birth_date: row.get("birth_date"),
            location,
            fame_rating: row.get("fame_rating"),
            tags: row.get("tags"),
            last_online: row.get("last_online"),
            image_file_ids: row.get("image_file_ids"),
        }
    }
}

const USER_SELECT: &str = r#"
    SELECT
        u.user_id, u.username, u.gender, u.sexual_preference, u.birth_date,
        u.latitude, u.longitude, u.fame_rating, u.last_online, u.image_file_ids,
        COALESCE(array_agg(t.tag) FILTER (WHERE t.tag IS NOT NULL), '{}') AS tags
    FROM users u
    LEFT JOIN user_tags t ON t.user_id = u.user_id
"#;

#[async_trait]
impl RelationStore for PgStore {
    async fn edge_exists(&self, kind: EdgeKind, from: &str, to: &str) -> Result<bool, StoreError> {
        let query = format!(
            "SELECT 1 FROM {} WHERE from_id = $1 AND to_id = $2",
            kind.table()
        );

        let row = sqlx::query(&query)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn set_edge(
        &self,
        kind: EdgeKind,
        from: &str,
        to: &str,
        present: bool,
    ) -> Result<bool, StoreError> {
        let result = if present {
            let query = format!(
                "INSERT INTO {} (from_id, to_id, created_at) VALUES ($1, $2, NOW())
                 ON CONFLICT (from_id, to_id) DO NOTHING",
                kind.table()
            );
            sqlx::query(&query)
                .bind(from)
                .bind(to)
                .execute(&self.pool)
                .await?
        } else {
            let query = format!(
                "DELETE FROM {} WHERE from_id = $1 AND to_id = $2",
                kind.table()
            );
            sqlx::query(&query)
                .bind(from)
                .bind(to)
                .execute(&self.pool)
                .await?
        };

        Ok(result.rows_affected() > 0)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let query = format!("{} WHERE u.user_id = $1 GROUP BY u.user_id", USER_SELECT);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::row_to_profile))
    }

    async fn get_user_tags(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT tag FROM user_tags WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("tag")).collect())
    }

    async fn blocked_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError> {
        let query = r#"
            SELECT to_id AS other_id FROM blocks WHERE from_id = $1
            UNION
            SELECT from_id AS other_id FROM blocks WHERE to_id = $1
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("other_id")).collect())
    }

    async fn browse_candidates(&self, viewer_id: &str) -> Result<Vec<UserProfile>, StoreError> {
        let query = format!("{} WHERE u.user_id <> $1 GROUP BY u.user_id", USER_SELECT);

        let rows = sqlx::query(&query)
            .bind(viewer_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("fetched {} browse candidates for {}", rows.len(), viewer_id);

        Ok(rows.iter().map(Self::row_to_profile).collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// In-memory relation store for tests and local development
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    users: HashMap<String, UserProfile>,
    likes: HashSet<(String, String)>,
    blocks: HashSet<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, profile: UserProfile) {
        let mut inner = self.inner.lock().unwrap();
        inner.users.insert(profile.user_id.clone(), profile);
    }
}

impl MemoryInner {
    fn edges_mut(&mut self, kind: EdgeKind) -> &mut HashSet<(String, String)> {
        match kind {
            EdgeKind::Likes => &mut self.likes,
            EdgeKind::Blocks => &mut self.blocks,
        }
    }

    fn edges(&self, kind: EdgeKind) -> &HashSet<(String, String)> {
        match kind {
            EdgeKind::Likes => &self.likes,
            EdgeKind::Blocks => &self.blocks,
        }
    }
}

#[async_trait]
impl RelationStore for MemoryStore {
    async fn edge_exists(&self, kind: EdgeKind, from: &str, to: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .edges(kind)
            .contains(&(from.to_string(), to.to_string())))
    }

    async fn set_edge(
        &self,
        kind: EdgeKind,
        from: &str,
        to: &str,
        present: bool,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let edges = inner.edges_mut(kind);
        let key = (from.to_string(), to.to_string());

        let changed = if present {
            edges.insert(key)
        } else {
            edges.remove(&key)
        };
        Ok(changed)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(user_id).cloned())
    }

    async fn get_user_tags(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .get(user_id)
            .map(|u| u.tags.clone())
            .unwrap_or_default())
    }

    async fn blocked_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut ids = HashSet::new();
        for (from, to) in &inner.blocks {
            if from == user_id {
                ids.insert(to.clone());
            } else if to == user_id {
                ids.insert(from.clone());
            }
        }
        Ok(ids)
    }

    async fn browse_candidates(&self, viewer_id: &str) -> Result<Vec<UserProfile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .values()
            .filter(|u| u.user_id != viewer_id)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
