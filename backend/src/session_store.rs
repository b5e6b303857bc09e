use crate::session::{Role, Session};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{sync::RwLock, task::JoinHandle, time::interval};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// SessionStore
///
/// The one place session state is read and written. Every login, logout and guard
/// decision funnels through this contract, so the exclusivity of roles is enforced
/// here and nowhere else.
///
/// An unknown session id always reads as `Session::Anonymous`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Session, SessionStoreError>;

    /// Exclusive write: replaces whatever role the session held before.
    /// Writing `Session::Anonymous` is equivalent to `clear`.
    async fn set_role(&self, id: Uuid, session: Session) -> Result<(), SessionStoreError>;

    /// Drops the session back to anonymous if it currently holds `role`, removing every
    /// profile field of that role. Returns whether anything was cleared.
    async fn clear_role(&self, id: Uuid, role: Role) -> Result<bool, SessionStoreError>;

    /// Logout of everything.
    async fn clear(&self, id: Uuid) -> Result<(), SessionStoreError>;

    /// Credits earned points to the session's balance and returns the updated session.
    async fn credit_points(&self, id: Uuid, points: i32) -> Result<Session, SessionStoreError>;

    /// Deletes every session last written before `cutoff`. Returns how many went.
    async fn prune_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, SessionStoreError>;

    async fn get_role(&self, id: Uuid, role: Role) -> Result<bool, SessionStoreError> {
        Ok(self.get(id).await?.holds(role))
    }
}

/// SessionState
///
/// The concrete type used to share the session store across the application state.
pub type SessionState = Arc<dyn SessionStore>;

/// spawn_expiry_sweep
///
/// Background task dropping sessions older than `ttl` every `every`. A session this old
/// can no longer be reached: the token handed out with it expired after the same TTL.
pub fn spawn_expiry_sweep(store: SessionState, ttl: Duration, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);

        loop {
            ticker.tick().await;
            let cutoff = chrono::Duration::from_std(ttl)
                .ok()
                .and_then(|ttl| Utc::now().checked_sub_signed(ttl));
            let Some(cutoff) = cutoff else {
                tracing::warn!("session TTL out of range; expiry sweep disabled");
                return;
            };

            match store.prune_expired(cutoff).await {
                Ok(0) => {}
                Ok(pruned) => tracing::debug!("pruned {} expired sessions", pruned),
                Err(e) => tracing::warn!("session expiry sweep failed: {}", e),
            }
        }
    })
}

/// InMemorySessionStore
///
/// Process-local store used for local development and tests. Sessions do not
/// survive a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
}

struct StoredSession {
    session: Session,
    updated_at: DateTime<Utc>,
}

impl StoredSession {
    fn new(session: Session) -> Self {
        Self {
            session,
            updated_at: Utc::now(),
        }
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: Uuid) -> Result<Session, SessionStoreError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&id)
            .map(|stored| stored.session.clone())
            .unwrap_or_default())
    }

    async fn set_role(&self, id: Uuid, session: Session) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        match session {
            Session::Anonymous => {
                sessions.remove(&id);
            }
            signed_in => {
                sessions.insert(id, StoredSession::new(signed_in));
            }
        }
        Ok(())
    }

    async fn clear_role(&self, id: Uuid, role: Role) -> Result<bool, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.get(&id).is_some_and(|stored| stored.session.holds(role)) {
            sessions.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn clear(&self, id: Uuid) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }

    async fn credit_points(&self, id: Uuid, points: i32) -> Result<Session, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(stored) => {
                if stored.session.credit_points(points) {
                    stored.updated_at = Utc::now();
                }
                Ok(stored.session.clone())
            }
            None => Ok(Session::Anonymous),
        }
    }

    async fn prune_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| stored.updated_at >= cutoff);
        Ok((before - sessions.len()) as u64)
    }
}

/// PostgresSessionStore
///
/// Durable store backed by the `portal_sessions` table (see `migrations/`): one row per
/// session id with the session itself serialized as JSONB. An anonymous session has no row.
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn get(&self, id: Uuid) -> Result<Session, SessionStoreError> {
        let row: Option<Json<Session>> =
            sqlx::query_scalar("SELECT session FROM portal_sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(session)| session).unwrap_or_default())
    }

    async fn set_role(&self, id: Uuid, session: Session) -> Result<(), SessionStoreError> {
        if session == Session::Anonymous {
            return self.clear(id).await;
        }

        sqlx::query(
            r#"
            INSERT INTO portal_sessions (id, session, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE SET session = EXCLUDED.session, updated_at = NOW()
            "#,
        )
        .bind(id)
        .bind(Json(session))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_role(&self, id: Uuid, role: Role) -> Result<bool, SessionStoreError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<Json<Session>> =
            sqlx::query_scalar("SELECT session FROM portal_sessions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let holds_role = current.is_some_and(|Json(session)| session.holds(role));
        if holds_role {
            sqlx::query("DELETE FROM portal_sessions WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(holds_role)
    }

    async fn clear(&self, id: Uuid) -> Result<(), SessionStoreError> {
        sqlx::query("DELETE FROM portal_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn credit_points(&self, id: Uuid, points: i32) -> Result<Session, SessionStoreError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<Json<Session>> =
            sqlx::query_scalar("SELECT session FROM portal_sessions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(Json(mut session)) = current else {
            tx.rollback().await?;
            return Ok(Session::Anonymous);
        };

        if session.credit_points(points) {
            sqlx::query("UPDATE portal_sessions SET session = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(Json(session.clone()))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(session)
    }

    async fn prune_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let result = sqlx::query("DELETE FROM portal_sessions WHERE updated_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
