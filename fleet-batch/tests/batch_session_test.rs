mod common;

use common::{vm, CountingCollection, ScriptedActions};
use fleet_batch::permissions::{START_STOP, WILDCARD};
use fleet_batch::{
    ActionError, BatchAction, BatchError, BatchSession, DialogState, JobState, OrchestratorConfig,
    Progress, RolePermissions, TriState,
};
use fleet_core::{LifecycleState, ResourceId};
use std::sync::Arc;
use std::time::Duration;

fn mixed_fleet() -> Vec<fleet_core::ResourceRef> {
    vec![
        vm("vmA", LifecycleState::Running),
        vm("vmB", LifecycleState::Stopped),
        vm("vmC", LifecycleState::Running),
    ]
}

fn permissions() -> Arc<RolePermissions> {
    Arc::new(
        RolePermissions::new()
            .with_role("admin", [WILDCARD])
            .with_role("operator", [START_STOP]),
    )
}

async fn session_with(
    role: &str,
    actions: Arc<ScriptedActions>,
    collection: Arc<CountingCollection>,
) -> BatchSession {
    let mut session = BatchSession::new(role, permissions(), actions, collection);
    assert!(session.load().await.is_none());
    session
}

#[tokio::test]
async fn test_mixed_eligibility_stop_batch() {
    fleet_logging::init_for_tests();
    let actions = Arc::new(
        ScriptedActions::new().failing("vmC", ActionError::unknown("quota exceeded")),
    );
    let collection = CountingCollection::new(mixed_fleet());
    let mut session = session_with("admin", actions.clone(), collection.clone()).await;

    session.select_all_displayed();
    assert_eq!(session.header_state(), TriState::All);

    let bar = session.action_bar().expect("selection shows the action bar");
    assert_eq!(bar.control(BatchAction::Stop).unwrap().eligible, 2);
    assert_eq!(bar.control(BatchAction::Start).unwrap().eligible, 1);
    assert!(bar.is_enabled(BatchAction::Delete));

    let prepared = session.prepare(BatchAction::Stop).unwrap();
    assert_eq!(prepared.job().target_names(), vec!["vmA", "vmC"]);
    assert!(prepared.confirmation().is_none());
    let progress = prepared.subscribe();

    let completed = session.execute(prepared).await.unwrap();

    assert_eq!(actions.called_names(), vec!["vmA", "vmC"]);
    assert_eq!(completed.outcome.progress, Progress { done: 2, total: 2 });
    assert_eq!(completed.outcome.errors.len(), 1);
    assert_eq!(completed.outcome.errors[0].name, "vmC");
    assert_eq!(completed.outcome.errors[0].message, "quota exceeded");
    assert!(completed.report.is_partial_failure());
    assert!(matches!(completed.report.dialog(), DialogState::Failures(ref f) if f.len() == 1));
    assert_eq!(
        *progress.borrow(),
        JobState::Completed {
            progress: Progress { done: 2, total: 2 },
            failures: 1
        }
    );

    // Page reset: selection cleared, exactly one refetch after the batch.
    assert!(session.selection().is_empty());
    assert_eq!(session.header_state(), TriState::None);
    assert_eq!(collection.fetches(), 2);
    assert!(session.action_bar().is_none());
}

#[tokio::test]
async fn test_targets_run_one_at_a_time() {
    let actions = Arc::new(ScriptedActions::new().with_delay(Duration::from_millis(5)));
    let collection = CountingCollection::new(vec![
        vm("a", LifecycleState::Stopped),
        vm("b", LifecycleState::Deallocated),
        vm("c", LifecycleState::Stopped),
        vm("d", LifecycleState::Stopped),
    ]);
    let mut session = session_with("operator", actions.clone(), collection).await;
    session.select_all_displayed();

    let prepared = session.prepare(BatchAction::Start).unwrap();
    let completed = session.execute(prepared).await.unwrap();

    assert_eq!(actions.max_in_flight(), 1);
    assert_eq!(actions.called_names(), vec!["a", "b", "c", "d"]);
    assert!(completed.report.is_success());
    assert_eq!(completed.report.dialog(), DialogState::Dismissed);
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let actions = Arc::new(ScriptedActions::new());
    let collection = CountingCollection::new(mixed_fleet());
    let mut session = session_with("admin", actions.clone(), collection.clone()).await;
    session.toggle(&ResourceId::new("vmC"));
    session.toggle(&ResourceId::new("vmA"));

    let prepared = session.prepare(BatchAction::Delete).unwrap();
    let confirmation = prepared.confirmation().cloned().unwrap();
    assert_eq!(confirmation.names, vec!["vmA", "vmC"]);

    let err = session.execute(prepared).await.unwrap_err();
    assert!(matches!(
        err,
        BatchError::ConfirmationRequired {
            action: BatchAction::Delete,
            count: 2
        }
    ));
    assert!(actions.calls().is_empty());
    assert_eq!(session.selection().len(), 2);
    assert_eq!(collection.fetches(), 1);

    let mut prepared = session.prepare(BatchAction::Delete).unwrap();
    prepared.confirm();
    session.execute(prepared).await.unwrap();
    assert_eq!(
        actions.calls(),
        vec![
            (BatchAction::Delete, "vmA".to_string()),
            (BatchAction::Delete, "vmC".to_string())
        ]
    );
}

#[tokio::test]
async fn test_permission_gates_controls() {
    let actions = Arc::new(ScriptedActions::new());
    let collection = CountingCollection::new(mixed_fleet());
    let mut operator = session_with("operator", actions.clone(), collection.clone()).await;
    operator.select_all_displayed();

    let bar = operator.action_bar().unwrap();
    assert!(bar.control(BatchAction::Delete).is_none());
    assert!(bar.is_enabled(BatchAction::Stop));
    assert!(matches!(
        operator.prepare(BatchAction::Delete),
        Err(BatchError::PermissionDenied { .. })
    ));

    let mut guest = session_with("guest", actions, collection).await;
    guest.select_all_displayed();
    assert!(guest.action_bar().unwrap().controls().is_empty());
}

#[tokio::test]
async fn test_empty_selection_hides_action_bar() {
    let actions = Arc::new(ScriptedActions::new());
    let collection = CountingCollection::new(mixed_fleet());
    let session = session_with("admin", actions, collection).await;

    assert!(session.eligibility().is_empty());
    assert!(session.action_bar().is_none());
    assert!(matches!(
        session.prepare(BatchAction::Stop),
        Err(BatchError::NothingEligible(BatchAction::Stop))
    ));
}

#[tokio::test]
async fn test_filtered_out_members_are_not_targeted() {
    let actions = Arc::new(ScriptedActions::new());
    let collection = CountingCollection::new(mixed_fleet());
    let mut session = session_with("admin", actions.clone(), collection).await;
    session.select_all_displayed();

    let visible: Vec<_> = session
        .displayed()
        .iter()
        .filter(|r| r.name != "vmA")
        .cloned()
        .collect();
    session.set_displayed(visible);

    assert_eq!(session.selection().len(), 3);
    assert_eq!(session.header_state(), TriState::All);
    let prepared = session.prepare(BatchAction::Stop).unwrap();
    assert_eq!(prepared.job().target_names(), vec!["vmC"]);
}

#[tokio::test]
async fn test_display_filter_survives_refresh() {
    let actions = Arc::new(ScriptedActions::new());
    let collection = CountingCollection::new(mixed_fleet());
    let mut session = session_with("admin", actions, collection.clone()).await;

    session.set_filter(|r| r.name != "vmB");
    session.select_all_displayed();
    let prepared = session.prepare(BatchAction::Stop).unwrap();

    collection.replace(vec![
        vm("vmA", LifecycleState::Stopped),
        vm("vmB", LifecycleState::Stopped),
        vm("vmC", LifecycleState::Stopped),
        vm("vmD", LifecycleState::Running),
    ]);
    session.execute(prepared).await.unwrap();

    let names: Vec<_> = session.displayed().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["vmA", "vmC", "vmD"]);
    assert_eq!(session.resources().len(), 4);

    session.clear_filter();
    assert_eq!(session.displayed().len(), 4);
}

#[tokio::test]
async fn test_cancel_skips_remaining_targets() {
    let actions = Arc::new(ScriptedActions::new());
    let collection = CountingCollection::new(mixed_fleet());
    let mut session = session_with("admin", actions.clone(), collection.clone()).await;
    session.select_all_displayed();

    let mut prepared = session.prepare(BatchAction::Delete).unwrap();
    prepared.confirm();
    actions.cancel_after("vmB", prepared.cancel_handle());
    let progress = prepared.subscribe();

    let completed = session.execute(prepared).await.unwrap();

    assert_eq!(actions.called_names(), vec!["vmA", "vmB"]);
    assert!(completed.outcome.errors.is_empty());
    assert_eq!(completed.report.skipped, vec!["vmC"]);
    assert!(!completed.report.is_success());
    assert!(matches!(
        completed.report.dialog(),
        DialogState::Cancelled { ref skipped, .. } if skipped == &vec!["vmC".to_string()]
    ));
    assert_eq!(
        *progress.borrow(),
        JobState::Cancelled {
            progress: Progress { done: 2, total: 3 },
            skipped: 1
        }
    );
    // Refresh still runs after a cancelled batch.
    assert_eq!(collection.fetches(), 2);
    assert!(session.selection().is_empty());
}

#[tokio::test]
async fn test_teardown_cancels_batches() {
    let actions = Arc::new(ScriptedActions::new());
    let collection = CountingCollection::new(mixed_fleet());
    let mut session = session_with("admin", actions.clone(), collection).await;
    session.select_all_displayed();

    let prepared = session.prepare(BatchAction::Stop).unwrap();
    let handle = session.teardown_handle();
    handle.teardown();
    assert!(handle.is_torn_down());

    let completed = session.execute(prepared).await.unwrap();
    assert!(actions.calls().is_empty());
    assert!(completed.outcome.is_cancelled());
    assert_eq!(completed.report.skipped, vec!["vmA", "vmC"]);
}

#[tokio::test]
async fn test_refresh_failure_sets_banner() {
    let actions = Arc::new(ScriptedActions::new());
    let collection = CountingCollection::new(mixed_fleet());
    let mut session = session_with("admin", actions, collection.clone()).await;
    session.select_all_displayed();

    collection.set_failing(true);
    let prepared = session.prepare(BatchAction::Start).unwrap();
    let completed = session.execute(prepared).await.unwrap();

    assert!(completed.report.is_success());
    let banner = session.banner().expect("refresh failure shows a banner");
    assert!(banner.message.contains("service unavailable"));
    assert_eq!(session.displayed().len(), 3);
    assert!(session.selection().is_empty());

    collection.set_failing(false);
    collection.replace(vec![vm("vmA", LifecycleState::Running)]);
    assert!(session.load().await.is_none());
    assert_eq!(session.displayed().len(), 1);
}

#[tokio::test]
async fn test_session_from_config() {
    let config = OrchestratorConfig {
        default_role: "operator".to_string(),
        cancel_on_teardown: false,
        ..Default::default()
    };
    let actions = Arc::new(ScriptedActions::new());
    let collection = CountingCollection::new(mixed_fleet());

    let session = BatchSession::from_config(&config, None, actions.clone(), collection.clone());
    assert_eq!(session.role(), "operator");

    let handle = session.teardown_handle();
    handle.teardown();
    assert!(!handle.is_torn_down());

    let admin = BatchSession::from_config(&config, Some("admin"), actions, collection);
    assert_eq!(admin.role(), "admin");
}
