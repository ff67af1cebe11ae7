use std::collections::BTreeMap;
use std::collections::BTreeSet;

use gridrights_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::rights::{FlagSchema, RightsFlag};

/// One (module, transaction) pair's flag set for the current subject.
///
/// Rows are created from upstream fetch responses and live only in the
/// editor's transient state; they are replaced wholesale whenever the
/// subject changes or a fresh fetch completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRow {
    /// Module identifier, first half of the composite row key.
    pub module_id: i64,
    /// Transaction identifier, second half of the composite row key.
    pub transaction_id: i64,
    /// Server-supplied module display name.
    pub module_name: String,
    /// Server-supplied transaction display name.
    pub transaction_name: String,
    /// The row's named booleans, one entry per schema flag.
    pub flags: BTreeMap<RightsFlag, bool>,
    /// User-group assignment, only meaningful under the group-access shape.
    pub user_group_id: Option<String>,
}

impl PermissionRow {
    /// Creates a row for the given shape with every flag cleared.
    #[must_use]
    pub fn new(
        schema: FlagSchema,
        module_id: i64,
        transaction_id: i64,
        module_name: impl Into<String>,
        transaction_name: impl Into<String>,
    ) -> Self {
        Self {
            module_id,
            transaction_id,
            module_name: module_name.into(),
            transaction_name: transaction_name.into(),
            flags: schema.flags().iter().map(|flag| (*flag, false)).collect(),
            user_group_id: None,
        }
    }

    /// Returns the flag value, or `None` when the flag is not part of the
    /// row's shape.
    #[must_use]
    pub fn flag(&self, flag: RightsFlag) -> Option<bool> {
        self.flags.get(&flag).copied()
    }

    /// Returns whether every flag of the row's shape is set.
    #[must_use]
    pub fn is_fully_selected(&self) -> bool {
        !self.flags.is_empty() && self.flags.values().all(|value| *value)
    }

    /// Returns the "Module / Transaction" label used in user-facing messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} / {}", self.module_name, self.transaction_name)
    }

    /// Returns whether the group assignment is missing while access is set.
    #[must_use]
    pub fn is_missing_group_assignment(&self) -> bool {
        self.flag(RightsFlag::Access) == Some(true)
            && self
                .user_group_id
                .as_deref()
                .is_none_or(|group| group.trim().is_empty())
    }

    fn matches_schema(&self, schema: FlagSchema) -> bool {
        let expected: BTreeSet<RightsFlag> = schema.flags().iter().copied().collect();
        let actual: BTreeSet<RightsFlag> = self.flags.keys().copied().collect();
        expected == actual
    }
}

/// The local editable copy of a loaded permission row set.
///
/// All operations are synchronous and infallible: a toggle aimed at a key
/// or flag that is not present is a no-op, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightsMatrix {
    schema: FlagSchema,
    rows: Vec<PermissionRow>,
}

impl RightsMatrix {
    /// Creates an empty matrix for the given shape.
    #[must_use]
    pub fn empty(schema: FlagSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Creates a matrix from fetched rows, validating the uniform-shape and
    /// unique-key invariants.
    pub fn from_rows(schema: FlagSchema, rows: Vec<PermissionRow>) -> AppResult<Self> {
        let mut seen = BTreeSet::new();
        for row in &rows {
            if !row.matches_schema(schema) {
                return Err(AppError::Validation(format!(
                    "row {} does not match the {:?} flag shape",
                    row.display_name(),
                    schema
                )));
            }
            if !seen.insert((row.module_id, row.transaction_id)) {
                return Err(AppError::Validation(format!(
                    "duplicate row key ({}, {})",
                    row.module_id, row.transaction_id
                )));
            }
        }

        Ok(Self { schema, rows })
    }

    /// Returns the matrix flag shape.
    #[must_use]
    pub fn schema(&self) -> FlagSchema {
        self.schema
    }

    /// Returns the rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[PermissionRow] {
        &self.rows
    }

    /// Returns whether the matrix holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consumes the matrix and returns its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<PermissionRow> {
        self.rows
    }

    /// Sets one flag on the row matching the composite key; every other row
    /// and field is untouched. No-op when the key or flag is absent.
    pub fn toggle_cell(
        &mut self,
        module_id: i64,
        transaction_id: i64,
        flag: RightsFlag,
        value: bool,
    ) {
        if let Some(row) = self.row_mut(module_id, transaction_id) {
            if let Some(slot) = row.flags.get_mut(&flag) {
                *slot = value;
            }
        }
    }

    /// Sets every flag of the shape on that one row.
    pub fn toggle_row_all(&mut self, module_id: i64, transaction_id: i64, value: bool) {
        if let Some(row) = self.row_mut(module_id, transaction_id) {
            for slot in row.flags.values_mut() {
                *slot = value;
            }
        }
    }

    /// Sets the given flag on every row.
    pub fn toggle_column_all(&mut self, flag: RightsFlag, value: bool) {
        for row in &mut self.rows {
            if let Some(slot) = row.flags.get_mut(&flag) {
                *slot = value;
            }
        }
    }

    /// Sets every flag on every row.
    pub fn toggle_global_all(&mut self, value: bool) {
        for row in &mut self.rows {
            for slot in row.flags.values_mut() {
                *slot = value;
            }
        }
    }

    /// Replaces the user-group assignment on the row matching the key.
    /// No-op when the key is absent or the shape carries no assignment.
    pub fn assign_user_group(
        &mut self,
        module_id: i64,
        transaction_id: i64,
        user_group_id: Option<String>,
    ) {
        if !self.schema.carries_group_assignment() {
            return;
        }
        if let Some(row) = self.row_mut(module_id, transaction_id) {
            row.user_group_id = user_group_id;
        }
    }

    /// Returns whether every flag on the row matching the key is set.
    /// `false` when the key is absent.
    #[must_use]
    pub fn is_row_fully_selected(&self, module_id: i64, transaction_id: i64) -> bool {
        self.row(module_id, transaction_id)
            .is_some_and(PermissionRow::is_fully_selected)
    }

    /// Returns whether the flag is set on every row. `false` on an empty
    /// set, never vacuously true.
    #[must_use]
    pub fn is_column_fully_selected(&self, flag: RightsFlag) -> bool {
        !self.rows.is_empty()
            && self.schema.contains(flag)
            && self.rows.iter().all(|row| row.flag(flag) == Some(true))
    }

    /// Returns whether every flag on every row is set. `false` on an empty
    /// set, never vacuously true.
    #[must_use]
    pub fn is_global_fully_selected(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(PermissionRow::is_fully_selected)
    }

    /// Returns the rows where access is granted without a group assignment,
    /// in display order. Only the group-access shape can produce any.
    #[must_use]
    pub fn rows_missing_group_assignment(&self) -> Vec<&PermissionRow> {
        self.rows
            .iter()
            .filter(|row| row.is_missing_group_assignment())
            .collect()
    }

    fn row(&self, module_id: i64, transaction_id: i64) -> Option<&PermissionRow> {
        self.rows
            .iter()
            .find(|row| row.module_id == module_id && row.transaction_id == transaction_id)
    }

    fn row_mut(&mut self, module_id: i64, transaction_id: i64) -> Option<&mut PermissionRow> {
        self.rows
            .iter_mut()
            .find(|row| row.module_id == module_id && row.transaction_id == transaction_id)
    }
}
