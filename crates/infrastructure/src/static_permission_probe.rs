use std::collections::HashSet;

use async_trait::async_trait;

use gridrights_application::PermissionProbe;
use gridrights_core::{AppResult, UserIdentity};
use gridrights_domain::RightsFlag;

/// Configuration-driven permission probe.
///
/// Development deployments run it wide open; tighter setups enumerate the
/// (module, transaction, action) grants an operator class holds.
pub struct StaticPermissionProbe {
    allow_all: bool,
    grants: HashSet<(i64, i64, RightsFlag)>,
}

impl StaticPermissionProbe {
    /// Creates a probe that grants everything.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            grants: HashSet::new(),
        }
    }

    /// Creates a probe granting only the listed screen actions.
    #[must_use]
    pub fn with_grants(grants: impl IntoIterator<Item = (i64, i64, RightsFlag)>) -> Self {
        Self {
            allow_all: false,
            grants: grants.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PermissionProbe for StaticPermissionProbe {
    async fn has_permission(
        &self,
        _actor: &UserIdentity,
        module_id: i64,
        transaction_id: i64,
        action: RightsFlag,
    ) -> AppResult<bool> {
        Ok(self.allow_all || self.grants.contains(&(module_id, transaction_id, action)))
    }
}

#[cfg(test)]
mod tests {
    use gridrights_application::PermissionProbe;
    use gridrights_core::UserIdentity;
    use gridrights_domain::RightsFlag;

    use super::StaticPermissionProbe;

    #[tokio::test]
    async fn grants_are_screen_and_action_scoped() {
        let probe = StaticPermissionProbe::with_grants([(1, 11, RightsFlag::Read)]);
        let actor = UserIdentity::new("op-1", "Administrator");

        let read = probe.has_permission(&actor, 1, 11, RightsFlag::Read).await;
        assert_eq!(read.ok(), Some(true));

        let edit = probe.has_permission(&actor, 1, 11, RightsFlag::Edit).await;
        assert_eq!(edit.ok(), Some(false));
    }
}
