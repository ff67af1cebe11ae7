use serde::{Deserialize, Serialize};

/// Operator information attached to every editor request.
///
/// The surrounding product authenticates operators upstream; this type is
/// the read-only projection handed to services, never looked up from
/// ambient global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
}

impl UserIdentity {
    /// Creates an operator identity from authentication data.
    #[must_use]
    pub fn new(subject: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current operator.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}
