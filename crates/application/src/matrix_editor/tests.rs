use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use gridrights_core::{AppError, AppResult, UserIdentity};
use gridrights_domain::{
    FlagSchema, MatrixVariant, PermissionRow, RightsFlag, Subject,
};

use crate::access_control::{AccessControlService, PermissionProbe};
use crate::rights_ports::{RightsFetchOutcome, RightsGateway};

use super::{MatrixEditor, ToggleCommand};

enum FetchScript {
    Rows(Vec<PermissionRow>),
    Locked,
    Fail(String),
    WaitThenRows(Arc<Notify>, Vec<PermissionRow>),
}

enum SaveScript {
    Succeed,
    Fail(String),
    WaitThenSucceed(Arc<Notify>),
}

#[derive(Default)]
struct FakeRightsGateway {
    fetch_scripts: Mutex<VecDeque<FetchScript>>,
    save_scripts: Mutex<VecDeque<SaveScript>>,
    saved_batches: Mutex<Vec<(MatrixVariant, Subject, Vec<PermissionRow>)>>,
    fetch_calls: Mutex<usize>,
    save_calls: Mutex<usize>,
}

impl FakeRightsGateway {
    async fn script_fetch(&self, script: FetchScript) {
        self.fetch_scripts.lock().await.push_back(script);
    }

    async fn script_save(&self, script: SaveScript) {
        self.save_scripts.lock().await.push_back(script);
    }

    async fn fetch_calls(&self) -> usize {
        *self.fetch_calls.lock().await
    }

    async fn save_calls(&self) -> usize {
        *self.save_calls.lock().await
    }

    async fn last_saved_batch(&self) -> Option<(MatrixVariant, Subject, Vec<PermissionRow>)> {
        self.saved_batches.lock().await.last().cloned()
    }
}

#[async_trait]
impl RightsGateway for FakeRightsGateway {
    async fn fetch_rights(
        &self,
        _variant: MatrixVariant,
        _subject: &Subject,
    ) -> AppResult<RightsFetchOutcome> {
        *self.fetch_calls.lock().await += 1;
        let script = self.fetch_scripts.lock().await.pop_front();
        match script {
            Some(FetchScript::Rows(rows)) => Ok(RightsFetchOutcome::Rows(rows)),
            Some(FetchScript::Locked) => Ok(RightsFetchOutcome::Locked),
            Some(FetchScript::Fail(message)) => Err(AppError::Upstream(message)),
            Some(FetchScript::WaitThenRows(gate, rows)) => {
                gate.notified().await;
                Ok(RightsFetchOutcome::Rows(rows))
            }
            None => Ok(RightsFetchOutcome::Rows(Vec::new())),
        }
    }

    async fn save_rights(
        &self,
        variant: MatrixVariant,
        subject: &Subject,
        rows: Vec<PermissionRow>,
    ) -> AppResult<()> {
        *self.save_calls.lock().await += 1;
        self.saved_batches
            .lock()
            .await
            .push((variant, subject.clone(), rows));
        let script = self.save_scripts.lock().await.pop_front();
        match script {
            Some(SaveScript::Succeed) | None => Ok(()),
            Some(SaveScript::Fail(message)) => Err(AppError::Upstream(message)),
            Some(SaveScript::WaitThenSucceed(gate)) => {
                gate.notified().await;
                Ok(())
            }
        }
    }
}

struct AllowAllProbe;

#[async_trait]
impl PermissionProbe for AllowAllProbe {
    async fn has_permission(
        &self,
        _actor: &UserIdentity,
        _module_id: i64,
        _transaction_id: i64,
        _action: RightsFlag,
    ) -> AppResult<bool> {
        Ok(true)
    }
}

struct DenyEditProbe;

#[async_trait]
impl PermissionProbe for DenyEditProbe {
    async fn has_permission(
        &self,
        _actor: &UserIdentity,
        _module_id: i64,
        _transaction_id: i64,
        action: RightsFlag,
    ) -> AppResult<bool> {
        Ok(action != RightsFlag::Edit)
    }
}

fn actor() -> UserIdentity {
    UserIdentity::new("op-1", "Administrator")
}

fn editor(variant: MatrixVariant, gateway: Arc<FakeRightsGateway>) -> MatrixEditor {
    MatrixEditor::new(
        variant,
        gateway,
        AccessControlService::new(Arc::new(AllowAllProbe)),
    )
}

fn user(id: &str) -> Subject {
    Subject::User { id: id.to_owned() }
}

fn full_row(module_id: i64, transaction_id: i64, name: &str) -> PermissionRow {
    PermissionRow::new(FlagSchema::FullRights, module_id, transaction_id, "Accounts", name)
}

fn group_row(transaction_id: i64, name: &str, group: Option<&str>) -> PermissionRow {
    let mut row = PermissionRow::new(FlagSchema::GroupAccess, 3, transaction_id, "Banking", name);
    row.flags.insert(RightsFlag::Access, true);
    row.user_group_id = group.map(str::to_owned);
    row
}

#[tokio::test]
async fn selecting_a_subject_loads_its_rows() {
    let gateway = Arc::new(FakeRightsGateway::default());
    gateway
        .script_fetch(FetchScript::Rows(vec![
            full_row(1, 1, "Banks"),
            full_row(1, 2, "Receivables"),
        ]))
        .await;
    let editor = editor(MatrixVariant::UserRights, gateway.clone());

    let snapshot = editor.select_subject(&actor(), Some(user("7"))).await;

    assert!(snapshot.is_ok());
    let snapshot = editor.snapshot().await;
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.subject, Some(user("7")));
    assert!(!snapshot.loading);
    assert!(!snapshot.locked);
    assert_eq!(gateway.fetch_calls().await, 1);
}

#[tokio::test]
async fn clearing_the_subject_empties_rows_and_disables_save() {
    let gateway = Arc::new(FakeRightsGateway::default());
    gateway
        .script_fetch(FetchScript::Rows(vec![full_row(1, 1, "Banks")]))
        .await;
    let editor = editor(MatrixVariant::UserRights, gateway.clone());
    let _ = editor.select_subject(&actor(), Some(user("7"))).await;

    let cleared = editor.select_subject(&actor(), None).await;
    assert!(cleared.is_ok_and(|snapshot| snapshot.rows.is_empty() && snapshot.subject.is_none()));

    let saved = editor.save(&actor()).await;
    assert!(matches!(saved, Err(AppError::Validation(_))));
    assert_eq!(gateway.save_calls().await, 0);
}

#[tokio::test]
async fn subject_kind_must_match_the_variant() {
    let gateway = Arc::new(FakeRightsGateway::default());
    let editor = editor(MatrixVariant::UserRights, gateway.clone());

    let selected = editor
        .select_subject(&actor(), Some(Subject::UserGroup { id: "g-1".to_owned() }))
        .await;

    assert!(matches!(selected, Err(AppError::Validation(_))));
    assert_eq!(gateway.fetch_calls().await, 0);
}

#[tokio::test]
async fn locked_screens_reject_edits_and_saves() {
    let gateway = Arc::new(FakeRightsGateway::default());
    gateway.script_fetch(FetchScript::Locked).await;
    let editor = editor(MatrixVariant::UserRights, gateway.clone());

    let snapshot = editor.select_subject(&actor(), Some(user("7"))).await;
    assert!(snapshot.is_ok_and(|snapshot| snapshot.locked && snapshot.rows.is_empty()));

    let toggled = editor.apply(ToggleCommand::Global { value: true }).await;
    assert!(matches!(toggled, Err(AppError::Forbidden(_))));

    let saved = editor.save(&actor()).await;
    assert!(matches!(saved, Err(AppError::Forbidden(_))));
    assert_eq!(gateway.save_calls().await, 0);
}

#[tokio::test]
async fn fetch_failure_falls_back_to_an_empty_set() {
    let gateway = Arc::new(FakeRightsGateway::default());
    gateway
        .script_fetch(FetchScript::Fail("upstream unavailable".to_owned()))
        .await;
    let editor = editor(MatrixVariant::UserRights, gateway.clone());

    let selected = editor.select_subject(&actor(), Some(user("7"))).await;
    assert!(matches!(selected, Err(AppError::Upstream(_))));

    // Retry stays manual: the subject selection survives the failure.
    let snapshot = editor.snapshot().await;
    assert!(snapshot.rows.is_empty());
    assert_eq!(snapshot.subject, Some(user("7")));
}

#[tokio::test]
async fn access_without_group_blocks_save_locally() {
    let gateway = Arc::new(FakeRightsGateway::default());
    gateway
        .script_fetch(FetchScript::Rows(vec![
            group_row(4, "Checklist", None),
            group_row(5, "Payables", Some("grp-2")),
        ]))
        .await;
    let editor = editor(MatrixVariant::UserCompanyAccess, gateway.clone());
    let _ = editor.select_subject(&actor(), Some(user("7"))).await;

    let saved = editor.save(&actor()).await;

    match saved {
        Err(AppError::Validation(message)) => {
            assert!(message.contains("Banking / Checklist"));
            assert!(!message.contains("Banking / Payables"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(gateway.save_calls().await, 0);
}

#[tokio::test]
async fn empty_row_set_save_is_a_local_noop() {
    let gateway = Arc::new(FakeRightsGateway::default());
    gateway.script_fetch(FetchScript::Rows(Vec::new())).await;
    let editor = editor(MatrixVariant::UserRights, gateway.clone());
    let _ = editor.select_subject(&actor(), Some(user("7"))).await;

    let saved = editor.save(&actor()).await;

    assert!(saved.is_ok());
    assert_eq!(gateway.save_calls().await, 0);
}

#[tokio::test]
async fn successful_save_resyncs_with_the_server_echo() {
    let gateway = Arc::new(FakeRightsGateway::default());
    let mut echoed = full_row(1, 1, "Banks");
    echoed.flags.insert(RightsFlag::Print, true);
    gateway
        .script_fetch(FetchScript::Rows(vec![full_row(1, 1, "Banks")]))
        .await;
    gateway.script_fetch(FetchScript::Rows(vec![echoed.clone()])).await;
    gateway.script_save(SaveScript::Succeed).await;
    let editor = editor(MatrixVariant::UserRights, gateway.clone());
    let _ = editor.select_subject(&actor(), Some(user("7"))).await;
    let _ = editor
        .apply(ToggleCommand::Cell {
            module_id: 1,
            transaction_id: 1,
            flag: RightsFlag::Read,
            value: true,
        })
        .await;

    let saved = editor.save(&actor()).await;

    // The server echo is authoritative, even where it differs from what
    // was just sent.
    assert!(saved.is_ok_and(|snapshot| snapshot.rows == vec![echoed]));
    let batch = gateway.last_saved_batch().await;
    assert!(batch.is_some_and(|(variant, subject, rows)| {
        variant == MatrixVariant::UserRights
            && subject == user("7")
            && rows[0].flag(RightsFlag::Read) == Some(true)
    }));
}

#[tokio::test]
async fn failed_save_preserves_local_edits_for_retry() {
    let gateway = Arc::new(FakeRightsGateway::default());
    gateway
        .script_fetch(FetchScript::Rows(vec![full_row(1, 1, "Banks")]))
        .await;
    gateway
        .script_save(SaveScript::Fail("result -1".to_owned()))
        .await;
    let editor = editor(MatrixVariant::UserRights, gateway.clone());
    let _ = editor.select_subject(&actor(), Some(user("7"))).await;
    let _ = editor.apply(ToggleCommand::Global { value: true }).await;

    let saved = editor.save(&actor()).await;
    assert!(matches!(saved, Err(AppError::Upstream(_))));

    let snapshot = editor.snapshot().await;
    assert!(snapshot.global_fully_selected);
    assert!(!snapshot.saving);

    // The retry goes through once the upstream recovers.
    gateway.script_save(SaveScript::Succeed).await;
    gateway
        .script_fetch(FetchScript::Rows(vec![full_row(1, 1, "Banks")]))
        .await;
    let retried = editor.save(&actor()).await;
    assert!(retried.is_ok());
    assert_eq!(gateway.save_calls().await, 2);
}

#[tokio::test]
async fn concurrent_save_is_rejected_without_a_second_upstream_call() {
    let gateway = Arc::new(FakeRightsGateway::default());
    let gate = Arc::new(Notify::new());
    gateway
        .script_fetch(FetchScript::Rows(vec![full_row(1, 1, "Banks")]))
        .await;
    gateway
        .script_save(SaveScript::WaitThenSucceed(gate.clone()))
        .await;
    gateway
        .script_fetch(FetchScript::Rows(vec![full_row(1, 1, "Banks")]))
        .await;
    let editor = Arc::new(editor(MatrixVariant::UserRights, gateway.clone()));
    let _ = editor.select_subject(&actor(), Some(user("7"))).await;
    let _ = editor.apply(ToggleCommand::Global { value: true }).await;

    let first = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.save(&actor()).await })
    };
    while gateway.save_calls().await == 0 {
        tokio::task::yield_now().await;
    }

    let second = editor.save(&actor()).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    gate.notify_one();
    let first = first.await;
    assert!(first.is_ok_and(|result| result.is_ok()));
    assert_eq!(gateway.save_calls().await, 1);
}

#[tokio::test]
async fn stale_fetch_never_overwrites_a_newer_subject() {
    let gateway = Arc::new(FakeRightsGateway::default());
    let gate = Arc::new(Notify::new());
    let stale_rows = vec![full_row(1, 1, "Banks")];
    let fresh_rows = vec![full_row(2, 7, "Job Orders")];
    gateway
        .script_fetch(FetchScript::WaitThenRows(gate.clone(), stale_rows))
        .await;
    gateway.script_fetch(FetchScript::Rows(fresh_rows.clone())).await;
    let editor = Arc::new(editor(MatrixVariant::UserRights, gateway.clone()));

    let slow = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.select_subject(&actor(), Some(user("1"))).await })
    };
    while gateway.fetch_calls().await == 0 {
        tokio::task::yield_now().await;
    }

    let fresh = editor.select_subject(&actor(), Some(user("2"))).await;
    assert!(fresh.is_ok());

    gate.notify_one();
    let slow = slow.await;
    assert!(slow.is_ok());

    let snapshot = editor.snapshot().await;
    assert_eq!(snapshot.rows, fresh_rows);
    assert_eq!(snapshot.subject, Some(user("2")));
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn toggles_require_a_selected_subject() {
    let gateway = Arc::new(FakeRightsGateway::default());
    let editor = editor(MatrixVariant::UserRights, gateway);

    let toggled = editor
        .apply(ToggleCommand::Column {
            flag: RightsFlag::Read,
            value: true,
        })
        .await;

    assert!(matches!(toggled, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn snapshot_reports_derived_predicates() {
    let gateway = Arc::new(FakeRightsGateway::default());
    gateway
        .script_fetch(FetchScript::Rows(vec![
            full_row(1, 1, "Banks"),
            full_row(1, 2, "Receivables"),
        ]))
        .await;
    let editor = editor(MatrixVariant::UserRights, gateway);
    let _ = editor.select_subject(&actor(), Some(user("7"))).await;

    let snapshot = editor
        .apply(ToggleCommand::Column {
            flag: RightsFlag::Read,
            value: true,
        })
        .await;

    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(error) => panic!("toggle failed: {error}"),
    };
    assert_eq!(snapshot.columns_fully_selected.get(&RightsFlag::Read), Some(&true));
    assert_eq!(snapshot.columns_fully_selected.get(&RightsFlag::Edit), Some(&false));
    assert!(!snapshot.global_fully_selected);
}

#[tokio::test]
async fn operators_without_edit_rights_cannot_save() {
    let gateway = Arc::new(FakeRightsGateway::default());
    gateway
        .script_fetch(FetchScript::Rows(vec![full_row(1, 1, "Banks")]))
        .await;
    let editor = MatrixEditor::new(
        MatrixVariant::UserRights,
        gateway.clone(),
        AccessControlService::new(Arc::new(DenyEditProbe)),
    );
    let _ = editor.select_subject(&actor(), Some(user("7"))).await;

    let saved = editor.save(&actor()).await;

    assert!(matches!(saved, Err(AppError::Forbidden(_))));
    assert_eq!(gateway.save_calls().await, 0);
}
