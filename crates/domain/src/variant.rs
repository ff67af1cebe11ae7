use std::str::FromStr;

use gridrights_core::AppError;
use serde::{Deserialize, Serialize};

use crate::rights::FlagSchema;
use crate::subject::SubjectKind;

/// The four rights-administration screens served by the generic editor.
///
/// Each variant fixes the flag shape, the accepted subject kind, and the
/// upstream endpoint segment; everything else is shared machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixVariant {
    /// Per-user transaction rights.
    UserRights,
    /// Per-group transaction rights.
    UserGroupRights,
    /// Per-user screen access with a user-group assignment per row.
    UserCompanyAccess,
    /// Company-wide record sharing toggles.
    ShareData,
}

impl MatrixVariant {
    /// Returns the flag shape edited on this screen.
    #[must_use]
    pub fn schema(&self) -> FlagSchema {
        match self {
            Self::UserRights | Self::UserGroupRights => FlagSchema::FullRights,
            Self::UserCompanyAccess => FlagSchema::GroupAccess,
            Self::ShareData => FlagSchema::ShareToAll,
        }
    }

    /// Returns the subject kind this screen is scoped to.
    #[must_use]
    pub fn subject_kind(&self) -> SubjectKind {
        match self {
            Self::UserRights | Self::UserCompanyAccess => SubjectKind::User,
            Self::UserGroupRights => SubjectKind::UserGroup,
            Self::ShareData => SubjectKind::Company,
        }
    }

    /// Returns the upstream endpoint segment for this screen.
    #[must_use]
    pub fn upstream_segment(&self) -> &'static str {
        match self {
            Self::UserRights => "userrights",
            Self::UserGroupRights => "usergrouprights",
            Self::UserCompanyAccess => "userwiserights",
            Self::ShareData => "sharedata",
        }
    }

    /// Returns the administration screen's own (module, transaction) key,
    /// used for operator permission checks on the screen itself.
    #[must_use]
    pub fn screen_key(&self) -> (i64, i64) {
        match self {
            Self::UserRights => (1, 11),
            Self::UserGroupRights => (1, 12),
            Self::UserCompanyAccess => (1, 13),
            Self::ShareData => (1, 14),
        }
    }

    /// Returns a stable transport value for this variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRights => "user_rights",
            Self::UserGroupRights => "user_group_rights",
            Self::UserCompanyAccess => "user_company_access",
            Self::ShareData => "share_data",
        }
    }
}

impl FromStr for MatrixVariant {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user_rights" => Ok(Self::UserRights),
            "user_group_rights" => Ok(Self::UserGroupRights),
            "user_company_access" => Ok(Self::UserCompanyAccess),
            "share_data" => Ok(Self::ShareData),
            _ => Err(AppError::Validation(format!(
                "unknown matrix variant '{value}'"
            ))),
        }
    }
}
