use std::sync::Arc;

use async_trait::async_trait;

use gridrights_core::{AppError, AppResult, UserIdentity};
use gridrights_domain::RightsFlag;

/// Read-only capability answering operator permission questions.
///
/// The editor receives this as an injected dependency; it never consults
/// ambient global state for permission data.
#[async_trait]
pub trait PermissionProbe: Send + Sync {
    /// Returns whether the operator holds the given action on the screen
    /// identified by the (module, transaction) key.
    async fn has_permission(
        &self,
        actor: &UserIdentity,
        module_id: i64,
        transaction_id: i64,
        action: RightsFlag,
    ) -> AppResult<bool>;
}

/// Application service gating editor operations on operator permissions.
#[derive(Clone)]
pub struct AccessControlService {
    probe: Arc<dyn PermissionProbe>,
}

impl AccessControlService {
    /// Creates a new service from the injected probe.
    #[must_use]
    pub fn new(probe: Arc<dyn PermissionProbe>) -> Self {
        Self { probe }
    }

    /// Fails with [`AppError::Forbidden`] unless the operator holds the
    /// given action on the screen.
    pub async fn require(
        &self,
        actor: &UserIdentity,
        module_id: i64,
        transaction_id: i64,
        action: RightsFlag,
    ) -> AppResult<()> {
        if self
            .probe
            .has_permission(actor, module_id, transaction_id, action)
            .await?
        {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "operator '{}' lacks {} on screen ({module_id}, {transaction_id})",
            actor.subject(),
            action.as_str()
        )))
    }
}
