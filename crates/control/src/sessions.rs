use dashmap::DashMap;
use phonebot_models::SessionState;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub type SharedSession = Arc<Mutex<SessionState>>;

/// Per-call conversation state, keyed by call id.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, SharedSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the call's session, creating it on first use. A caller number
    /// learned on a later turn fills in one that was missing.
    pub async fn get_or_create(&self, call_id: &str, caller_number: Option<&str>) -> SharedSession {
        let session = self
            .sessions
            .entry(call_id.to_string())
            .or_insert_with(|| {
                debug!(call_id = %call_id, "Session created");
                Arc::new(Mutex::new(SessionState::new(
                    call_id,
                    caller_number.unwrap_or_default(),
                )))
            })
            .clone();

        if let Some(number) = caller_number.filter(|n| !n.trim().is_empty()) {
            let mut state = session.lock().await;
            if state.caller_number.is_empty() {
                state.caller_number = number.to_string();
            }
        }
        session
    }

    pub fn get(&self, call_id: &str) -> Option<SharedSession> {
        self.sessions.get(call_id).map(|s| s.clone())
    }

    pub fn remove(&self, call_id: &str) -> bool {
        self.sessions.remove(call_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
