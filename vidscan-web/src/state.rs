use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;
use vidscan_core::{CountProgress, CsvSource, ScanConfig, Scanner, Session};

use crate::error::ApiError;

pub const SESSION_HEADER: &str = "x-session-id";

/// Sessions untouched for this long are dropped on the next session creation.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

struct Inner {
    config: ScanConfig,
    scanner: Scanner<CsvSource>,
    ttl: Duration,
    sessions: DashMap<Uuid, SessionEntry>,
    progress: DashMap<Uuid, CountProgress>,
}

impl AppState {
    pub fn new(config: ScanConfig) -> Self {
        Self::with_ttl(config, SESSION_TTL)
    }

    pub fn with_ttl(config: ScanConfig, ttl: Duration) -> Self {
        let scanner = Scanner::from_config(&config);
        Self {
            inner: Arc::new(Inner {
                config,
                scanner,
                ttl,
                sessions: DashMap::new(),
                progress: DashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.inner.config
    }

    pub fn scanner(&self) -> &Scanner<CsvSource> {
        &self.inner.scanner
    }

    pub fn create_session(&self) -> Uuid {
        self.evict_idle();
        let id = Uuid::new_v4();
        self.inner.sessions.insert(
            id,
            SessionEntry {
                session: Arc::new(Mutex::new(Session::new())),
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Forget a session and any count progress it left behind.
    pub fn remove_session(&self, id: Uuid) -> bool {
        self.inner.progress.remove(&id);
        self.inner.sessions.remove(&id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.inner.sessions.len()
    }

    fn evict_idle(&self) {
        let ttl = self.inner.ttl;
        let before = self.inner.sessions.len();
        self.inner
            .sessions
            .retain(|_, entry| entry.last_seen.elapsed() < ttl);
        let sessions = &self.inner.sessions;
        self.inner.progress.retain(|id, _| sessions.contains_key(id));
        let evicted = before.saturating_sub(sessions.len());
        if evicted > 0 {
            debug!(evicted, "dropped idle sessions");
        }
    }

    pub fn session_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or(ApiError::MissingSession)
    }

    /// Resolve the caller's session from the request headers and mark it as used.
    pub fn session(&self, headers: &HeaderMap) -> Result<(Uuid, SharedSession), ApiError> {
        let id = Self::session_id(headers)?;
        let mut entry = self
            .inner
            .sessions
            .get_mut(&id)
            .ok_or(ApiError::UnknownSession)?;
        entry.last_seen = Instant::now();
        Ok((id, Arc::clone(&entry.session)))
    }

    pub fn set_progress(&self, id: Uuid, progress: CountProgress) {
        self.inner.progress.insert(id, progress);
    }

    pub fn clear_progress(&self, id: Uuid) {
        self.inner.progress.remove(&id);
    }

    pub fn progress(&self, id: Uuid) -> Option<CountProgress> {
        self.inner.progress.get(&id).map(|p| *p.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_for(id: Uuid) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        headers
    }

    #[test]
    fn idle_sessions_are_evicted_with_their_progress() {
        let state = AppState::with_ttl(ScanConfig::default(), Duration::ZERO);
        let first = state.create_session();
        state.set_progress(first, CountProgress::default());

        let second = state.create_session();
        assert_eq!(state.session_count(), 1);
        assert!(state.progress(first).is_none());
        assert!(matches!(
            state.session(&headers_for(first)),
            Err(ApiError::UnknownSession)
        ));
        assert!(state.session(&headers_for(second)).is_ok());
    }

    #[test]
    fn active_sessions_survive_creation_of_others() {
        let state = AppState::new(ScanConfig::default());
        let a = state.create_session();
        state.create_session();
        assert_eq!(state.session_count(), 2);
        assert!(state.session(&headers_for(a)).is_ok());
    }

    #[test]
    fn removing_a_session_drops_progress() {
        let state = AppState::new(ScanConfig::default());
        let id = state.create_session();
        state.set_progress(id, CountProgress::default());
        assert!(state.remove_session(id));
        assert!(!state.remove_session(id));
        assert!(state.progress(id).is_none());
    }
}
