//! Application services and ports for the rights matrix editor.

#![forbid(unsafe_code)]

mod access_control;
mod matrix_editor;
mod registry;
mod rights_ports;
mod subject_directory;

pub use access_control::{AccessControlService, PermissionProbe};
pub use matrix_editor::{EditorSnapshot, MatrixEditor, ToggleCommand};
pub use registry::EditorRegistry;
pub use rights_ports::{RightsFetchOutcome, RightsGateway};
pub use subject_directory::{SubjectDirectory, SubjectDirectoryService};
