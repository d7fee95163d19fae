use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::session::Session;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("session encoding error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Where sessions live between requests. Saves overwrite (last write wins)
/// and refresh the expiry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Session, SessionError>;
    async fn save(&self, session: &Session) -> Result<(), SessionError>;
    /// Returns whether a session was removed.
    async fn remove(&self, id: Uuid) -> Result<bool, SessionError>;
}

/// Process-local store used when no Redis URL is configured.
pub struct InMemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, (Session, Instant)>>,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Session, SessionError> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                None => return Err(SessionError::NotFound(id)),
                Some((session, saved_at)) if saved_at.elapsed() <= self.ttl => {
                    return Ok(session.clone())
                }
                Some(_) => {}
            }
        }
        debug!("Session {id} expired");
        self.sessions.write().await.remove(&id);
        Err(SessionError::NotFound(id))
    }

    /// Also drops every expired session.
    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, (_, saved_at)| saved_at.elapsed() <= self.ttl);
        if sessions.len() < before {
            debug!("Dropped {} expired sessions", before - sessions.len());
        }
        sessions.insert(session.id, (session.clone(), Instant::now()));
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool, SessionError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }
}

/// Sessions as JSON strings under `session:<id>` with a TTL.
pub struct RedisSessionStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn key(id: Uuid) -> String {
        format!("session:{id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Session, SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(Self::key(id)).await?;
        let raw = raw.ok_or(SessionError::NotFound(id))?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let payload = serde_json::to_string(session)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(session.id), payload, self.ttl_secs)
            .await?;
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool, SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let removed: i64 = conn.del(Self::key(id)).await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let mut session = Session::new();
        session.job_description = "Rust engineer".into();
        store.save(&session).await.unwrap();

        let loaded = store.load(session.id).await.unwrap();
        assert_eq!(loaded.job_description, "Rust engineer");
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let mut session = Session::new();
        store.save(&session).await.unwrap();
        session.job_description = "Updated".into();
        store.save(&session).await.unwrap();
        assert_eq!(store.load(session.id).await.unwrap().job_description, "Updated");
    }

    #[tokio::test]
    async fn test_unknown_and_removed_sessions() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let session = Session::new();
        assert!(matches!(
            store.load(session.id).await,
            Err(SessionError::NotFound(_))
        ));
        store.save(&session).await.unwrap();
        assert!(store.remove(session.id).await.unwrap());
        assert!(!store.remove(session.id).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_expire_after_ttl() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let session = Session::new();
        store.save(&session).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(store.load(session.id).await.is_ok());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(matches!(
            store.load(session.id).await,
            Err(SessionError::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_drops_expired_sessions() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        for _ in 0..100 {
            store.save(&Session::new()).await.unwrap();
        }
        assert_eq!(store.len().await, 100);

        tokio::time::advance(Duration::from_secs(3600)).await;
        let fresh = Session::new();
        store.save(&fresh).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert!(store.load(fresh.id).await.is_ok());
    }

    #[test]
    fn test_redis_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            RedisSessionStore::key(id),
            "session:00000000-0000-0000-0000-000000000000"
        );
    }
}
