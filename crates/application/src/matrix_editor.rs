use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use gridrights_core::{AppError, AppResult, UserIdentity};
use gridrights_domain::{
    FlagSchema, MatrixVariant, PermissionRow, RightsFlag, RightsMatrix, Subject,
};

use crate::access_control::AccessControlService;
use crate::rights_ports::{RightsFetchOutcome, RightsGateway};

#[cfg(test)]
mod tests;

/// Local edit applied to the loaded row set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleCommand {
    /// Sets one named boolean on the row matching the composite key.
    Cell {
        /// Module half of the row key.
        module_id: i64,
        /// Transaction half of the row key.
        transaction_id: i64,
        /// Flag column to set.
        flag: RightsFlag,
        /// New flag value.
        value: bool,
    },
    /// Sets every flag of the shape on that one row.
    Row {
        /// Module half of the row key.
        module_id: i64,
        /// Transaction half of the row key.
        transaction_id: i64,
        /// New value for every flag on the row.
        value: bool,
    },
    /// Sets the given flag on every row.
    Column {
        /// Flag column to set.
        flag: RightsFlag,
        /// New value for the whole column.
        value: bool,
    },
    /// Sets every flag on every row.
    Global {
        /// New value for the whole matrix.
        value: bool,
    },
    /// Replaces the user-group assignment on the row matching the key.
    AssignGroup {
        /// Module half of the row key.
        module_id: i64,
        /// Transaction half of the row key.
        transaction_id: i64,
        /// New assignment; `None` clears it.
        user_group_id: Option<String>,
    },
}

/// Cloned view of an editing session handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSnapshot {
    /// Screen variant of the session.
    pub variant: MatrixVariant,
    /// Flag shape of the session.
    pub schema: FlagSchema,
    /// Currently selected subject, if any.
    pub subject: Option<Subject>,
    /// The local editable row set.
    pub rows: Vec<PermissionRow>,
    /// Whether the upstream API reported the screen locked for the subject.
    pub locked: bool,
    /// Whether a fetch is pending.
    pub loading: bool,
    /// Whether a save is in flight.
    pub saving: bool,
    /// Whether every flag on every row is set; `false` on an empty set.
    pub global_fully_selected: bool,
    /// Per-column full-selection markers for the schema's flags.
    pub columns_fully_selected: BTreeMap<RightsFlag, bool>,
}

struct EditorState {
    subject: Option<Subject>,
    matrix: RightsMatrix,
    locked: bool,
    loading: bool,
    saving: bool,
    fetch_token: u64,
}

/// One editing session's state machine.
///
/// The session is the single mutable owner of its row set. The state mutex
/// is never held across upstream awaits; interleavings are resolved by the
/// fetch token (loads) and the in-flight marker (saves).
pub struct MatrixEditor {
    variant: MatrixVariant,
    gateway: Arc<dyn RightsGateway>,
    access_control: AccessControlService,
    state: Mutex<EditorState>,
}

impl MatrixEditor {
    /// Creates a session for the given screen variant with no subject
    /// selected.
    #[must_use]
    pub fn new(
        variant: MatrixVariant,
        gateway: Arc<dyn RightsGateway>,
        access_control: AccessControlService,
    ) -> Self {
        Self {
            variant,
            gateway,
            access_control,
            state: Mutex::new(EditorState {
                subject: None,
                matrix: RightsMatrix::empty(variant.schema()),
                locked: false,
                loading: false,
                saving: false,
                fetch_token: 0,
            }),
        }
    }

    /// Returns the session's screen variant.
    #[must_use]
    pub fn variant(&self) -> MatrixVariant {
        self.variant
    }

    /// Replaces the selected subject.
    ///
    /// `None` clears the row set and disables editing; `Some` triggers a
    /// fresh load. Either way any in-flight fetch for the previous subject
    /// is invalidated.
    pub async fn select_subject(
        &self,
        actor: &UserIdentity,
        subject: Option<Subject>,
    ) -> AppResult<EditorSnapshot> {
        let Some(subject) = subject else {
            let mut state = self.state.lock().await;
            state.subject = None;
            state.matrix = RightsMatrix::empty(self.variant.schema());
            state.locked = false;
            state.loading = false;
            state.fetch_token = state.fetch_token.wrapping_add(1);
            return Ok(self.snapshot_of(&state));
        };

        if subject.kind() != self.variant.subject_kind() {
            return Err(AppError::Validation(format!(
                "{} expects a {:?} subject, got {:?}",
                self.variant.as_str(),
                self.variant.subject_kind(),
                subject.kind()
            )));
        }

        {
            let mut state = self.state.lock().await;
            state.subject = Some(subject);
        }

        self.load(actor).await
    }

    /// Replaces the entire local row set with the upstream rows for the
    /// current subject.
    ///
    /// Each fetch carries a monotonically increasing token; a response that
    /// resolves after a newer fetch started is discarded, so the last
    /// selected subject always wins.
    pub async fn load(&self, actor: &UserIdentity) -> AppResult<EditorSnapshot> {
        let (module_id, transaction_id) = self.variant.screen_key();
        self.access_control
            .require(actor, module_id, transaction_id, RightsFlag::Read)
            .await?;

        let (subject, token) = {
            let mut state = self.state.lock().await;
            let subject = state.subject.clone().ok_or_else(|| {
                AppError::Validation("select a subject before loading rights".to_owned())
            })?;
            state.loading = true;
            state.fetch_token = state.fetch_token.wrapping_add(1);
            (subject, state.fetch_token)
        };

        let outcome = self.gateway.fetch_rights(self.variant, &subject).await;

        let mut state = self.state.lock().await;
        if state.fetch_token != token {
            // A newer fetch or subject change superseded this response.
            return Ok(self.snapshot_of(&state));
        }
        state.loading = false;

        match outcome {
            Ok(RightsFetchOutcome::Rows(rows)) => {
                match RightsMatrix::from_rows(self.variant.schema(), rows) {
                    Ok(matrix) => {
                        state.matrix = matrix;
                        state.locked = false;
                        Ok(self.snapshot_of(&state))
                    }
                    Err(error) => {
                        state.matrix = RightsMatrix::empty(self.variant.schema());
                        state.locked = false;
                        Err(AppError::Upstream(format!(
                            "upstream rows violate matrix invariants: {error}"
                        )))
                    }
                }
            }
            Ok(RightsFetchOutcome::Locked) => {
                state.matrix = RightsMatrix::empty(self.variant.schema());
                state.locked = true;
                Ok(self.snapshot_of(&state))
            }
            Err(error) => {
                state.matrix = RightsMatrix::empty(self.variant.schema());
                state.locked = false;
                Err(error)
            }
        }
    }

    /// Applies a local toggle to the row set.
    ///
    /// Toggles themselves cannot fail; the session rejects them only while
    /// no subject is selected or the screen is locked.
    pub async fn apply(&self, command: ToggleCommand) -> AppResult<EditorSnapshot> {
        let mut state = self.state.lock().await;
        if state.subject.is_none() {
            return Err(AppError::Validation(
                "select a subject before editing rights".to_owned(),
            ));
        }
        if state.locked {
            return Err(AppError::Forbidden(
                "the screen is locked for this subject".to_owned(),
            ));
        }

        match command {
            ToggleCommand::Cell {
                module_id,
                transaction_id,
                flag,
                value,
            } => state.matrix.toggle_cell(module_id, transaction_id, flag, value),
            ToggleCommand::Row {
                module_id,
                transaction_id,
                value,
            } => state.matrix.toggle_row_all(module_id, transaction_id, value),
            ToggleCommand::Column { flag, value } => state.matrix.toggle_column_all(flag, value),
            ToggleCommand::Global { value } => state.matrix.toggle_global_all(value),
            ToggleCommand::AssignGroup {
                module_id,
                transaction_id,
                user_group_id,
            } => state
                .matrix
                .assign_user_group(module_id, transaction_id, user_group_id),
        }

        Ok(self.snapshot_of(&state))
    }

    /// Sends the entire edited row set as one batch save, then refetches.
    ///
    /// Validation failures and an already-in-flight save are rejected
    /// locally without an upstream call. On upstream success the subject is
    /// refetched and the server echo overwrites local edits wholesale; on
    /// failure local edits are preserved for retry.
    pub async fn save(&self, actor: &UserIdentity) -> AppResult<EditorSnapshot> {
        let (module_id, transaction_id) = self.variant.screen_key();
        self.access_control
            .require(actor, module_id, transaction_id, RightsFlag::Edit)
            .await?;

        let (subject, rows) = {
            let mut state = self.state.lock().await;
            let subject = state.subject.clone().ok_or_else(|| {
                AppError::Validation("select a subject before saving rights".to_owned())
            })?;
            if state.locked {
                return Err(AppError::Forbidden(
                    "the screen is locked for this subject".to_owned(),
                ));
            }
            if state.saving {
                return Err(AppError::Conflict(
                    "a save is already in flight for this session".to_owned(),
                ));
            }

            let offending: Vec<String> = state
                .matrix
                .rows_missing_group_assignment()
                .iter()
                .map(|row| row.display_name())
                .collect();
            if !offending.is_empty() {
                return Err(AppError::Validation(format!(
                    "access granted without a user group: {}",
                    offending.join(", ")
                )));
            }

            if state.matrix.is_empty() {
                // Empty batch: deliberate local no-op, nothing sent upstream.
                return Ok(self.snapshot_of(&state));
            }

            state.saving = true;
            (subject, state.matrix.rows().to_vec())
        };

        let saved = self.gateway.save_rights(self.variant, &subject, rows).await;

        {
            let mut state = self.state.lock().await;
            state.saving = false;
        }

        match saved {
            Ok(()) => self.load(actor).await,
            Err(error) => Err(error),
        }
    }

    /// Returns a cloned view of the current session state.
    pub async fn snapshot(&self) -> EditorSnapshot {
        let state = self.state.lock().await;
        self.snapshot_of(&state)
    }

    fn snapshot_of(&self, state: &EditorState) -> EditorSnapshot {
        let matrix = &state.matrix;
        EditorSnapshot {
            variant: self.variant,
            schema: matrix.schema(),
            subject: state.subject.clone(),
            rows: matrix.rows().to_vec(),
            locked: state.locked,
            loading: state.loading,
            saving: state.saving,
            global_fully_selected: matrix.is_global_fully_selected(),
            columns_fully_selected: matrix
                .schema()
                .flags()
                .iter()
                .map(|flag| (*flag, matrix.is_column_fully_selected(*flag)))
                .collect(),
        }
    }
}
