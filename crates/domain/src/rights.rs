use std::str::FromStr;

use gridrights_core::AppError;
use serde::{Deserialize, Serialize};

/// Named boolean columns a rights matrix variant can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RightsFlag {
    /// Allows reading records of the transaction.
    Read,
    /// Allows creating records of the transaction.
    Create,
    /// Allows editing records of the transaction.
    Edit,
    /// Allows deleting records of the transaction.
    Delete,
    /// Allows exporting grid data of the transaction.
    Export,
    /// Allows printing documents of the transaction.
    Print,
    /// Shares the transaction's records with the whole company.
    ShareToAll,
    /// Grants screen access on behalf of an assigned user group.
    Access,
}

impl RightsFlag {
    /// Returns a stable transport value for this flag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "is_read",
            Self::Create => "is_create",
            Self::Edit => "is_edit",
            Self::Delete => "is_delete",
            Self::Export => "is_export",
            Self::Print => "is_print",
            Self::ShareToAll => "share_to_all",
            Self::Access => "is_access",
        }
    }
}

impl FromStr for RightsFlag {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "is_read" => Ok(Self::Read),
            "is_create" => Ok(Self::Create),
            "is_edit" => Ok(Self::Edit),
            "is_delete" => Ok(Self::Delete),
            "is_export" => Ok(Self::Export),
            "is_print" => Ok(Self::Print),
            "share_to_all" => Ok(Self::ShareToAll),
            "is_access" => Ok(Self::Access),
            _ => Err(AppError::Validation(format!(
                "unknown rights flag value '{value}'"
            ))),
        }
    }
}

/// Flag shapes supported by the generic matrix editor.
///
/// Every row in one loaded set shares the same shape; the shape is fixed
/// by the screen variant, never by the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSchema {
    /// The six-column shape used by the user and user-group rights screens.
    FullRights,
    /// The single share-to-all column of the share-data screen.
    ShareToAll,
    /// The access column plus a per-row user-group assignment.
    GroupAccess,
}

impl FlagSchema {
    /// Returns a stable transport value for this shape.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullRights => "full_rights",
            Self::ShareToAll => "share_to_all",
            Self::GroupAccess => "group_access",
        }
    }

    /// Returns the fixed flag set of this shape, in display order.
    #[must_use]
    pub fn flags(&self) -> &'static [RightsFlag] {
        match self {
            Self::FullRights => &[
                RightsFlag::Read,
                RightsFlag::Create,
                RightsFlag::Edit,
                RightsFlag::Delete,
                RightsFlag::Export,
                RightsFlag::Print,
            ],
            Self::ShareToAll => &[RightsFlag::ShareToAll],
            Self::GroupAccess => &[RightsFlag::Access],
        }
    }

    /// Returns whether rows of this shape carry a user-group assignment.
    #[must_use]
    pub fn carries_group_assignment(&self) -> bool {
        matches!(self, Self::GroupAccess)
    }

    /// Returns whether the given flag belongs to this shape.
    #[must_use]
    pub fn contains(&self, flag: RightsFlag) -> bool {
        self.flags().contains(&flag)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{FlagSchema, RightsFlag};

    #[test]
    fn flag_roundtrip_transport_value() {
        for flag in FlagSchema::FullRights.flags() {
            let restored = RightsFlag::from_str(flag.as_str());
            assert_eq!(restored.ok(), Some(*flag));
        }
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let parsed = RightsFlag::from_str("is_approve");
        assert!(parsed.is_err());
    }

    #[test]
    fn schemas_expose_fixed_shapes() {
        assert_eq!(FlagSchema::FullRights.flags().len(), 6);
        assert_eq!(FlagSchema::ShareToAll.flags(), &[RightsFlag::ShareToAll]);
        assert!(FlagSchema::GroupAccess.carries_group_assignment());
        assert!(!FlagSchema::FullRights.contains(RightsFlag::Access));
    }
}
