//! Transport payloads and their conversions to application types.

mod conversions;
mod types;

pub use types::{
    ColumnSelectionResponse, EditorSnapshotResponse, OpenEditorRequest, OpenEditorResponse,
    PermissionRowResponse, SelectSubjectRequest, SubjectDescriptorResponse, SubjectPayload,
    SubjectResponse, ToggleRequest,
};
