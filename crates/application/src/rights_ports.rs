use async_trait::async_trait;

use gridrights_core::AppResult;
use gridrights_domain::{MatrixVariant, PermissionRow, Subject};

/// Result of a rights fetch against the upstream API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RightsFetchOutcome {
    /// The subject's current rows, replacing the local set wholesale.
    Rows(Vec<PermissionRow>),
    /// The upstream API reported the screen as locked for this subject
    /// (envelope result `-2`); rendered as a lock state, not an error.
    Locked,
}

/// Gateway port to the upstream rights API.
///
/// Adapters stamp the subject identity onto every serialized row before
/// sending a batch, overriding any stale value carried by the row.
#[async_trait]
pub trait RightsGateway: Send + Sync {
    /// Fetches the subject's current rows for the given screen variant.
    async fn fetch_rights(
        &self,
        variant: MatrixVariant,
        subject: &Subject,
    ) -> AppResult<RightsFetchOutcome>;

    /// Sends the entire edited row set as one batch save.
    async fn save_rights(
        &self,
        variant: MatrixVariant,
        subject: &Subject,
        rows: Vec<PermissionRow>,
    ) -> AppResult<()>;
}
