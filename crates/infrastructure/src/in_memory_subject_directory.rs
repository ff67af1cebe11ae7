use async_trait::async_trait;

use gridrights_application::SubjectDirectory;
use gridrights_core::AppResult;
use gridrights_domain::{SubjectDescriptor, SubjectKind};

/// Seedable subject directory for development mode and tests.
#[derive(Default)]
pub struct InMemorySubjectDirectory {
    users: Vec<SubjectDescriptor>,
    user_groups: Vec<SubjectDescriptor>,
}

impl InMemorySubjectDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory seeded with a demo roster.
    #[must_use]
    pub fn with_demo_roster() -> Self {
        Self {
            users: vec![
                descriptor("u-1", "Alice Mensah", SubjectKind::User),
                descriptor("u-2", "Bruno Keller", SubjectKind::User),
                descriptor("u-3", "Carmen Ortiz", SubjectKind::User),
            ],
            user_groups: vec![
                descriptor("g-1", "Accounting", SubjectKind::UserGroup),
                descriptor("g-2", "Operations", SubjectKind::UserGroup),
            ],
        }
    }

    fn matching(entries: &[SubjectDescriptor], query: &str) -> Vec<SubjectDescriptor> {
        if query.is_empty() {
            return entries.to_vec();
        }
        let query = query.to_lowercase();
        entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }
}

fn descriptor(id: &str, name: &str, kind: SubjectKind) -> SubjectDescriptor {
    SubjectDescriptor {
        id: id.to_owned(),
        name: name.to_owned(),
        kind,
    }
}

#[async_trait]
impl SubjectDirectory for InMemorySubjectDirectory {
    async fn search_users(&self, query: &str) -> AppResult<Vec<SubjectDescriptor>> {
        Ok(Self::matching(&self.users, query))
    }

    async fn search_user_groups(&self, query: &str) -> AppResult<Vec<SubjectDescriptor>> {
        Ok(Self::matching(&self.user_groups, query))
    }
}

#[cfg(test)]
mod tests {
    use gridrights_application::SubjectDirectory;

    use super::InMemorySubjectDirectory;

    #[tokio::test]
    async fn search_filters_case_insensitively() {
        let directory = InMemorySubjectDirectory::with_demo_roster();

        let hits = directory.search_users("alice").await;
        assert!(hits.is_ok_and(|hits| hits.len() == 1));

        let all = directory.search_user_groups("").await;
        assert!(all.is_ok_and(|all| all.len() == 2));
    }
}
