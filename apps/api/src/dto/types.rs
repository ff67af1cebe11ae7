use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming subject reference.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/subject-payload.ts"
)]
pub struct SubjectPayload {
    pub kind: String,
    pub id: Option<String>,
}

/// Incoming payload for opening an editor session.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/open-editor-request.ts"
)]
pub struct OpenEditorRequest {
    pub variant: String,
    pub subject: Option<SubjectPayload>,
}

/// Incoming payload for replacing the session subject.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/select-subject-request.ts"
)]
pub struct SelectSubjectRequest {
    pub subject: Option<SubjectPayload>,
}

/// Incoming toggle command.
#[derive(Debug, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/toggle-request.ts"
)]
pub enum ToggleRequest {
    /// Sets one named boolean on one row.
    Cell {
        module_id: i64,
        transaction_id: i64,
        flag: String,
        value: bool,
    },
    /// Sets every flag on one row.
    Row {
        module_id: i64,
        transaction_id: i64,
        value: bool,
    },
    /// Sets one flag on every row.
    Column { flag: String, value: bool },
    /// Sets every flag on every row.
    Global { value: bool },
    /// Replaces the row's user-group assignment.
    AssignGroup {
        module_id: i64,
        transaction_id: i64,
        user_group_id: Option<String>,
    },
}

/// API representation of the session subject.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/subject-response.ts"
)]
pub struct SubjectResponse {
    pub kind: String,
    pub id: Option<String>,
}

/// API representation of one permission row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-row-response.ts"
)]
pub struct PermissionRowResponse {
    pub module_id: i64,
    pub transaction_id: i64,
    pub module_name: String,
    pub transaction_name: String,
    pub flags: BTreeMap<String, bool>,
    pub user_group_id: Option<String>,
    pub fully_selected: bool,
}

/// Full-selection marker for one flag column.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/column-selection-response.ts"
)]
pub struct ColumnSelectionResponse {
    pub flag: String,
    pub fully_selected: bool,
}

/// API representation of an editor session snapshot.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/editor-snapshot-response.ts"
)]
pub struct EditorSnapshotResponse {
    pub variant: String,
    pub schema: String,
    pub flags: Vec<String>,
    pub subject: Option<SubjectResponse>,
    pub rows: Vec<PermissionRowResponse>,
    pub locked: bool,
    pub loading: bool,
    pub saving: bool,
    pub global_fully_selected: bool,
    pub columns_fully_selected: Vec<ColumnSelectionResponse>,
}

/// Response for a freshly opened editor session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/open-editor-response.ts"
)]
pub struct OpenEditorResponse {
    pub session_id: String,
    pub snapshot: EditorSnapshotResponse,
}

/// API representation of a subject picker entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/subject-descriptor-response.ts"
)]
pub struct SubjectDescriptorResponse {
    pub id: String,
    pub name: String,
    pub kind: String,
}
