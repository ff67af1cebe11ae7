use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gridrights_application::{RightsFetchOutcome, RightsGateway};
use gridrights_core::{AppError, AppResult};
use gridrights_domain::{FlagSchema, MatrixVariant, PermissionRow, RightsFlag, Subject};

use crate::envelope::Envelope;

/// Permission row as the upstream rights API serializes it.
///
/// Every flag column is optional on the wire; the screen variant decides
/// which ones are meaningful, and absent columns read as `false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRow {
    module_id: i64,
    transaction_id: i64,
    #[serde(default)]
    module_name: String,
    #[serde(default)]
    transaction_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_edit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_export: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_print: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    share_to_all: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_access: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

impl WireRow {
    fn flag(&self, flag: RightsFlag) -> Option<bool> {
        match flag {
            RightsFlag::Read => self.is_read,
            RightsFlag::Create => self.is_create,
            RightsFlag::Edit => self.is_edit,
            RightsFlag::Delete => self.is_delete,
            RightsFlag::Export => self.is_export,
            RightsFlag::Print => self.is_print,
            RightsFlag::ShareToAll => self.share_to_all,
            RightsFlag::Access => self.is_access,
        }
    }

    fn set_flag(&mut self, flag: RightsFlag, value: bool) {
        let slot = match flag {
            RightsFlag::Read => &mut self.is_read,
            RightsFlag::Create => &mut self.is_create,
            RightsFlag::Edit => &mut self.is_edit,
            RightsFlag::Delete => &mut self.is_delete,
            RightsFlag::Export => &mut self.is_export,
            RightsFlag::Print => &mut self.is_print,
            RightsFlag::ShareToAll => &mut self.share_to_all,
            RightsFlag::Access => &mut self.is_access,
        };
        *slot = Some(value);
    }

    fn into_domain(self, schema: FlagSchema) -> PermissionRow {
        let flags = schema
            .flags()
            .iter()
            .map(|flag| (*flag, self.flag(*flag).unwrap_or(false)))
            .collect();

        PermissionRow {
            module_id: self.module_id,
            transaction_id: self.transaction_id,
            module_name: self.module_name,
            transaction_name: self.transaction_name,
            flags,
            user_group_id: self.user_group_id,
        }
    }

    /// Serializes a row for the save batch, stamping the subject identity
    /// over whatever the row carried before.
    fn from_domain(row: &PermissionRow, subject: &Subject) -> Self {
        let mut wire = Self {
            module_id: row.module_id,
            transaction_id: row.transaction_id,
            module_name: row.module_name.clone(),
            transaction_name: row.transaction_name.clone(),
            user_group_id: row.user_group_id.clone(),
            ..Self::default()
        };
        for (flag, value) in &row.flags {
            wire.set_flag(*flag, *value);
        }

        match subject {
            Subject::User { id } => wire.user_id = Some(id.clone()),
            Subject::UserGroup { id } => wire.user_group_id = Some(id.clone()),
            Subject::Company => {}
        }

        wire
    }
}

#[derive(Debug, Serialize)]
struct SaveRightsBody {
    data: Vec<WireRow>,
}

/// HTTP adapter for the upstream rights API.
pub struct HttpRightsGateway {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpRightsGateway {
    /// Creates a new gateway over the given client and base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn rights_url(&self, variant: MatrixVariant) -> String {
        format!("{}/api/{}/rights", self.base_url, variant.upstream_segment())
    }

    fn subject_query(subject: &Subject) -> Vec<(&'static str, String)> {
        match subject {
            Subject::User { id } => vec![("userId", id.clone())],
            Subject::UserGroup { id } => vec![("userGroupId", id.clone())],
            Subject::Company => Vec::new(),
        }
    }
}

#[async_trait]
impl RightsGateway for HttpRightsGateway {
    async fn fetch_rights(
        &self,
        variant: MatrixVariant,
        subject: &Subject,
    ) -> AppResult<RightsFetchOutcome> {
        let url = self.rights_url(variant);
        debug!(%url, variant = variant.as_str(), "fetching rights rows");

        let response = self
            .http_client
            .get(&url)
            .query(&Self::subject_query(subject))
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("rights fetch request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "rights fetch returned HTTP {status}"
            )));
        }

        let envelope: Envelope<Vec<WireRow>> = response
            .json()
            .await
            .map_err(|error| AppError::Upstream(format!("rights fetch payload invalid: {error}")))?;

        if envelope.is_locked() {
            return Ok(RightsFetchOutcome::Locked);
        }

        let rows = envelope
            .into_data("rights fetch")?
            .into_iter()
            .map(|wire| wire.into_domain(variant.schema()))
            .collect();

        Ok(RightsFetchOutcome::Rows(rows))
    }

    async fn save_rights(
        &self,
        variant: MatrixVariant,
        subject: &Subject,
        rows: Vec<PermissionRow>,
    ) -> AppResult<()> {
        let url = format!("{}/save", self.rights_url(variant));
        debug!(%url, variant = variant.as_str(), rows = rows.len(), "saving rights batch");

        let body = SaveRightsBody {
            data: rows
                .iter()
                .map(|row| WireRow::from_domain(row, subject))
                .collect(),
        };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("rights save request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "rights save returned HTTP {status}"
            )));
        }

        let envelope: Envelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|error| AppError::Upstream(format!("rights save payload invalid: {error}")))?;

        if envelope.is_locked() {
            return Err(AppError::Forbidden(
                "the screen is locked for this subject".to_owned(),
            ));
        }

        envelope.require_success("rights save")
    }
}
