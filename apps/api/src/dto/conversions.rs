use std::str::FromStr;

use gridrights_application::{EditorSnapshot, ToggleCommand};
use gridrights_core::AppError;
use gridrights_domain::{PermissionRow, RightsFlag, Subject, SubjectDescriptor};

use super::types::{
    ColumnSelectionResponse, EditorSnapshotResponse, PermissionRowResponse,
    SubjectDescriptorResponse, SubjectPayload, SubjectResponse, ToggleRequest,
};

impl TryFrom<SubjectPayload> for Subject {
    type Error = AppError;

    fn try_from(value: SubjectPayload) -> Result<Self, Self::Error> {
        let id = value
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        match value.kind.as_str() {
            "user" => id
                .map(|id| Self::User { id: id.to_owned() })
                .ok_or_else(|| AppError::Validation("a user subject requires an id".to_owned())),
            "user_group" => id
                .map(|id| Self::UserGroup { id: id.to_owned() })
                .ok_or_else(|| {
                    AppError::Validation("a user-group subject requires an id".to_owned())
                }),
            "company" => Ok(Self::Company),
            other => Err(AppError::Validation(format!(
                "unknown subject kind '{other}'"
            ))),
        }
    }
}

impl From<Subject> for SubjectResponse {
    fn from(value: Subject) -> Self {
        Self {
            kind: value.kind().as_str().to_owned(),
            id: value.id().map(str::to_owned),
        }
    }
}

impl TryFrom<ToggleRequest> for ToggleCommand {
    type Error = AppError;

    fn try_from(value: ToggleRequest) -> Result<Self, Self::Error> {
        Ok(match value {
            ToggleRequest::Cell {
                module_id,
                transaction_id,
                flag,
                value,
            } => Self::Cell {
                module_id,
                transaction_id,
                flag: RightsFlag::from_str(&flag)?,
                value,
            },
            ToggleRequest::Row {
                module_id,
                transaction_id,
                value,
            } => Self::Row {
                module_id,
                transaction_id,
                value,
            },
            ToggleRequest::Column { flag, value } => Self::Column {
                flag: RightsFlag::from_str(&flag)?,
                value,
            },
            ToggleRequest::Global { value } => Self::Global { value },
            ToggleRequest::AssignGroup {
                module_id,
                transaction_id,
                user_group_id,
            } => Self::AssignGroup {
                module_id,
                transaction_id,
                user_group_id,
            },
        })
    }
}

impl From<PermissionRow> for PermissionRowResponse {
    fn from(value: PermissionRow) -> Self {
        let fully_selected = value.is_fully_selected();
        Self {
            module_id: value.module_id,
            transaction_id: value.transaction_id,
            module_name: value.module_name,
            transaction_name: value.transaction_name,
            flags: value
                .flags
                .iter()
                .map(|(flag, set)| (flag.as_str().to_owned(), *set))
                .collect(),
            user_group_id: value.user_group_id,
            fully_selected,
        }
    }
}

impl From<EditorSnapshot> for EditorSnapshotResponse {
    fn from(value: EditorSnapshot) -> Self {
        let columns_fully_selected = value
            .schema
            .flags()
            .iter()
            .map(|flag| ColumnSelectionResponse {
                flag: flag.as_str().to_owned(),
                fully_selected: value
                    .columns_fully_selected
                    .get(flag)
                    .copied()
                    .unwrap_or(false),
            })
            .collect();

        Self {
            variant: value.variant.as_str().to_owned(),
            schema: value.schema.as_str().to_owned(),
            flags: value
                .schema
                .flags()
                .iter()
                .map(|flag| flag.as_str().to_owned())
                .collect(),
            subject: value.subject.map(SubjectResponse::from),
            rows: value.rows.into_iter().map(PermissionRowResponse::from).collect(),
            locked: value.locked,
            loading: value.loading,
            saving: value.saving,
            global_fully_selected: value.global_fully_selected,
            columns_fully_selected,
        }
    }
}

impl From<SubjectDescriptor> for SubjectDescriptorResponse {
    fn from(value: SubjectDescriptor) -> Self {
        Self {
            id: value.id,
            name: value.name,
            kind: value.kind.as_str().to_owned(),
        }
    }
}
