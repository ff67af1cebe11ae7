use serde::{Deserialize, Serialize};

/// The entity a loaded rights matrix is scoped to.
///
/// Selecting a subject is the sole trigger for loading a new row set; no
/// subject selected means an empty set with editing disabled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    /// A single user.
    User {
        /// Stable user identifier.
        id: String,
    },
    /// A user group.
    UserGroup {
        /// Stable user-group identifier.
        id: String,
    },
    /// The company-wide implicit subject of the share-data screen.
    Company,
}

impl Subject {
    /// Returns the subject classification.
    #[must_use]
    pub fn kind(&self) -> SubjectKind {
        match self {
            Self::User { .. } => SubjectKind::User,
            Self::UserGroup { .. } => SubjectKind::UserGroup,
            Self::Company => SubjectKind::Company,
        }
    }

    /// Returns the subject identifier, if the kind carries one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::User { id } | Self::UserGroup { id } => Some(id.as_str()),
            Self::Company => None,
        }
    }
}

/// Subject classification used by the selector and the upstream payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    /// A single user.
    User,
    /// A user group.
    UserGroup,
    /// The company-wide scope.
    Company,
}

impl SubjectKind {
    /// Returns a stable transport value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::UserGroup => "user_group",
            Self::Company => "company",
        }
    }
}

/// Directory entry offered by the searchable subject picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDescriptor {
    /// Stable subject identifier.
    pub id: String,
    /// Display name shown in the picker.
    pub name: String,
    /// Subject classification.
    pub kind: SubjectKind,
}
