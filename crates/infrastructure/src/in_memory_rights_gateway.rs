use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use gridrights_application::{RightsFetchOutcome, RightsGateway};
use gridrights_core::AppResult;
use gridrights_domain::{MatrixVariant, PermissionRow, Subject};

/// In-memory rights store for development mode and tests.
///
/// Behaves like the upstream API: an unseen subject is served the module
/// catalog with every flag cleared, and a save replaces the stored rows
/// wholesale so the next fetch echoes them back.
#[derive(Default)]
pub struct InMemoryRightsGateway {
    catalog: Vec<(i64, i64, String, String)>,
    rows: RwLock<HashMap<(MatrixVariant, Subject), Vec<PermissionRow>>>,
    locked: RwLock<HashSet<(MatrixVariant, Subject)>>,
}

impl InMemoryRightsGateway {
    /// Creates a gateway serving an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway serving the given (module, transaction) catalog.
    #[must_use]
    pub fn with_catalog(catalog: Vec<(i64, i64, String, String)>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Creates a gateway seeded with the demo screens catalog.
    #[must_use]
    pub fn with_demo_catalog() -> Self {
        Self::with_catalog(vec![
            (1, 1, "Accounts".to_owned(), "Banks".to_owned()),
            (1, 2, "Accounts".to_owned(), "Receivables".to_owned()),
            (1, 3, "Accounts".to_owned(), "Payables".to_owned()),
            (2, 7, "Operations".to_owned(), "Job Orders".to_owned()),
            (2, 8, "Operations".to_owned(), "Checklist".to_owned()),
        ])
    }

    /// Marks the subject's screen as locked for the variant.
    pub async fn lock_subject(&self, variant: MatrixVariant, subject: Subject) {
        self.locked.write().await.insert((variant, subject));
    }

    fn catalog_rows(&self, variant: MatrixVariant) -> Vec<PermissionRow> {
        self.catalog
            .iter()
            .map(|(module_id, transaction_id, module_name, transaction_name)| {
                PermissionRow::new(
                    variant.schema(),
                    *module_id,
                    *transaction_id,
                    module_name.clone(),
                    transaction_name.clone(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl RightsGateway for InMemoryRightsGateway {
    async fn fetch_rights(
        &self,
        variant: MatrixVariant,
        subject: &Subject,
    ) -> AppResult<RightsFetchOutcome> {
        let key = (variant, subject.clone());
        if self.locked.read().await.contains(&key) {
            return Ok(RightsFetchOutcome::Locked);
        }

        let rows = self
            .rows
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.catalog_rows(variant));

        Ok(RightsFetchOutcome::Rows(rows))
    }

    async fn save_rights(
        &self,
        variant: MatrixVariant,
        subject: &Subject,
        rows: Vec<PermissionRow>,
    ) -> AppResult<()> {
        self.rows
            .write()
            .await
            .insert((variant, subject.clone()), rows);
        Ok(())
    }
}
