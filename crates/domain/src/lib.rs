//! Domain entities and invariants for the rights matrix editor.

#![forbid(unsafe_code)]

mod matrix;
mod rights;
mod subject;
mod variant;

pub use matrix::{PermissionRow, RightsMatrix};
pub use rights::{FlagSchema, RightsFlag};
pub use subject::{Subject, SubjectDescriptor, SubjectKind};
pub use variant::MatrixVariant;
