use std::sync::Arc;

use async_trait::async_trait;

use gridrights_core::{AppError, AppResult};
use gridrights_domain::{SubjectDescriptor, SubjectKind};

/// Directory port backing the searchable subject picker.
#[async_trait]
pub trait SubjectDirectory: Send + Sync {
    /// Lists users whose display name matches the query.
    async fn search_users(&self, query: &str) -> AppResult<Vec<SubjectDescriptor>>;

    /// Lists user groups whose display name matches the query.
    async fn search_user_groups(&self, query: &str) -> AppResult<Vec<SubjectDescriptor>>;
}

/// Application service for subject lookups.
#[derive(Clone)]
pub struct SubjectDirectoryService {
    directory: Arc<dyn SubjectDirectory>,
}

impl SubjectDirectoryService {
    /// Creates a new service from the injected directory.
    #[must_use]
    pub fn new(directory: Arc<dyn SubjectDirectory>) -> Self {
        Self { directory }
    }

    /// Searches subjects of the given kind. An empty query lists all
    /// entries; the company scope has no directory.
    pub async fn search(
        &self,
        kind: SubjectKind,
        query: &str,
    ) -> AppResult<Vec<SubjectDescriptor>> {
        let query = query.trim();
        match kind {
            SubjectKind::User => self.directory.search_users(query).await,
            SubjectKind::UserGroup => self.directory.search_user_groups(query).await,
            SubjectKind::Company => Err(AppError::Validation(
                "the company scope has no subject directory".to_owned(),
            )),
        }
    }
}
