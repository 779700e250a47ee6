//! Per-session classification history
//!
//! A session is created on the first request without a known
//! `breedid_session` cookie, grows only by appends, and is torn down either
//! explicitly (`DELETE /api/session`) or by the idle sweeper.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "breedid_session";

/// One accepted classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// `YYYYMMDD-HHMMSS`, same stamp as the gallery file
    pub timestamp: String,
    /// Display label, e.g. `Golden Retriever`
    pub label: String,
    /// Formatted confidence, e.g. `84.00%`
    pub confidence: String,
    /// Serialized as the bare file name under `image`
    #[serde(rename = "image", serialize_with = "serialize_file_name")]
    pub image_path: PathBuf,
}

fn serialize_file_name<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    serializer.serialize_str(&name)
}

impl HistoryEntry {
    /// Stored image file name (no directory)
    pub fn file_name(&self) -> String {
        self.image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug)]
struct Session {
    last_seen: DateTime<Utc>,
    history: VecDeque<HistoryEntry>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_seen: now,
            history: VecDeque::new(),
        }
    }
}

/// All live sessions
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    retention: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    /// `retention` caps entries kept per session (oldest dropped first)
    pub fn new(retention: usize, idle_timeout: std::time::Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            retention: retention.max(1),
            idle_timeout: Duration::from_std(idle_timeout).unwrap_or_else(|_| Duration::days(36_500)),
        }
    }

    /// Return the live session for `requested`, or start a new one
    ///
    /// The boolean is `true` when a session was created (caller sets the cookie).
    /// Unknown ids are never adopted; a fresh id is minted instead.
    pub async fn resolve(&self, requested: Option<Uuid>) -> (Uuid, bool) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        if let Some(id) = requested {
            if let Some(session) = sessions.get_mut(&id) {
                session.last_seen = now;
                return (id, false);
            }
        }

        let id = Uuid::new_v4();
        sessions.insert(id, Session::new(now));
        debug!("Started session {}", id);
        (id, true)
    }

    /// Append an entry, enforcing the retention cap
    ///
    /// Returns `false` (and drops the entry) when the session has been
    /// ended or evicted in the meantime.
    pub async fn append(&self, id: Uuid, entry: HistoryEntry) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            debug!("Session {} is gone, history entry dropped", id);
            return false;
        };
        session.last_seen = Utc::now();
        session.history.push_back(entry);
        while session.history.len() > self.retention {
            session.history.pop_front();
        }
        true
    }

    /// Up to `limit` most recent entries, newest first
    pub async fn recent(&self, id: Uuid, limit: usize) -> Vec<HistoryEntry> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(|s| s.history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Every retained entry, newest first
    pub async fn history(&self, id: Uuid) -> Vec<HistoryEntry> {
        self.recent(id, usize::MAX).await
    }

    /// Tear down a session; returns whether it existed
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            debug!("Ended session {}", id);
        }
        removed
    }

    /// Drop sessions idle longer than the timeout; returns how many
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let timeout = self.idle_timeout;
        sessions.retain(|_, s| now.signed_duration_since(s.last_seen) <= timeout);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Run [`evict_idle`](Self::evict_idle) every `period`
    pub fn spawn_sweeper(&self, period: std::time::Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(Utc::now()).await;
                if evicted > 0 {
                    info!("Evicted {} idle session(s)", evicted);
                }
            }
        })
    }
}

/// Session id from the request's `Cookie` headers, if well-formed
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// Attach the session cookie to a response
pub fn set_session_cookie(response: &mut Response, id: Uuid) {
    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}

/// Expire the session cookie on the client
pub fn clear_session_cookie(response: &mut Response) {
    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}
