use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use gridrights_application::SubjectDirectory;
use gridrights_core::{AppError, AppResult};
use gridrights_domain::{SubjectDescriptor, SubjectKind};

use crate::envelope::Envelope;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSubject {
    id: String,
    name: String,
}

/// HTTP adapter for the upstream user and user-group listings.
pub struct HttpSubjectDirectory {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpSubjectDirectory {
    /// Creates a new directory over the given client and base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    async fn search(
        &self,
        segment: &str,
        kind: SubjectKind,
        query: &str,
    ) -> AppResult<Vec<SubjectDescriptor>> {
        let url = format!("{}/api/{segment}", self.base_url);
        debug!(%url, query, "searching subject directory");

        let mut request = self.http_client.get(&url);
        if !query.is_empty() {
            request = request.query(&[("query", query)]);
        }

        let response = request.send().await.map_err(|error| {
            AppError::Upstream(format!("subject search request failed: {error}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "subject search returned HTTP {status}"
            )));
        }

        let envelope: Envelope<Vec<WireSubject>> = response.json().await.map_err(|error| {
            AppError::Upstream(format!("subject search payload invalid: {error}"))
        })?;

        Ok(envelope
            .into_data("subject search")?
            .into_iter()
            .map(|wire| SubjectDescriptor {
                id: wire.id,
                name: wire.name,
                kind,
            })
            .collect())
    }
}

#[async_trait]
impl SubjectDirectory for HttpSubjectDirectory {
    async fn search_users(&self, query: &str) -> AppResult<Vec<SubjectDescriptor>> {
        self.search("users", SubjectKind::User, query).await
    }

    async fn search_user_groups(&self, query: &str) -> AppResult<Vec<SubjectDescriptor>> {
        self.search("usergroups", SubjectKind::UserGroup, query).await
    }
}
