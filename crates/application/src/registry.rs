use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use gridrights_core::{AppError, AppResult};
use gridrights_domain::MatrixVariant;

use crate::access_control::AccessControlService;
use crate::matrix_editor::MatrixEditor;
use crate::rights_ports::RightsGateway;

/// Sessions untouched for this long are swept on the next open.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Upper bound on live sessions; the least recently used one is evicted
/// beyond it.
const DEFAULT_MAX_SESSIONS: usize = 256;

struct SessionEntry {
    editor: Arc<MatrixEditor>,
    last_used: Instant,
}

/// Owner of live editing sessions, keyed by session identifier.
///
/// Sessions hold transient state only; dropping one loses nothing the
/// upstream API cannot re-serve, so abandoned sessions are evicted by
/// idle timeout and a hard cap rather than kept forever.
pub struct EditorRegistry {
    gateway: Arc<dyn RightsGateway>,
    access_control: AccessControlService,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl EditorRegistry {
    /// Creates an empty registry over the shared gateway and access control.
    #[must_use]
    pub fn new(gateway: Arc<dyn RightsGateway>, access_control: AccessControlService) -> Self {
        Self::with_limits(
            gateway,
            access_control,
            DEFAULT_IDLE_TIMEOUT,
            DEFAULT_MAX_SESSIONS,
        )
    }

    /// Creates a registry with explicit eviction limits.
    #[must_use]
    pub fn with_limits(
        gateway: Arc<dyn RightsGateway>,
        access_control: AccessControlService,
        idle_timeout: Duration,
        max_sessions: usize,
    ) -> Self {
        Self {
            gateway,
            access_control,
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            max_sessions,
        }
    }

    /// Opens a session for the given screen variant.
    ///
    /// Expired sessions are swept first; if the registry is still at
    /// capacity the least recently used session is evicted.
    pub async fn open(&self, variant: MatrixVariant) -> (Uuid, Arc<MatrixEditor>) {
        let session_id = Uuid::new_v4();
        let editor = Arc::new(MatrixEditor::new(
            variant,
            self.gateway.clone(),
            self.access_control.clone(),
        ));

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.last_used.elapsed() < self.idle_timeout);
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| *id);
            let Some(id) = oldest else {
                break;
            };
            sessions.remove(&id);
        }
        sessions.insert(
            session_id,
            SessionEntry {
                editor: editor.clone(),
                last_used: Instant::now(),
            },
        );

        (session_id, editor)
    }

    /// Returns the session matching the identifier, refreshing its idle
    /// clock.
    pub async fn get(&self, session_id: Uuid) -> AppResult<Arc<MatrixEditor>> {
        let mut sessions = self.sessions.write().await;
        sessions
            .get_mut(&session_id)
            .map(|entry| {
                entry.last_used = Instant::now();
                entry.editor.clone()
            })
            .ok_or_else(|| AppError::NotFound(format!("editor session '{session_id}'")))
    }

    /// Drops the session matching the identifier.
    pub async fn close(&self, session_id: Uuid) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(&session_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("editor session '{session_id}'")))
    }
}
