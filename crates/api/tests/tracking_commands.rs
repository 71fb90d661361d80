//! Command layer over a real SQLite-backed context

mod support;

use std::collections::BTreeSet;

use stint_api::{
    add_filter, cancel_timer, current_snapshot, remove_filter, resume_timer,
    set_tracking_visible, start_timer, stop_timer, toggle_filter,
};
use stint_core::{StartOutcome, StartRequest, StopOutcome};
use stint_domain::{
    ActivityTypeId, AppColor, FilterId, FilterType, NewActivityFilter, StintError, TagId,
};
use support::seeded_context;

fn started(outcome: StartOutcome) -> stint_domain::RunningRecord {
    match outcome {
        StartOutcome::Started(record) => record,
        other => panic!("expected a started record, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn start_and_stop_round_through_the_store() {
    let (ctx, _temp_dir) = seeded_context().await;

    let running =
        started(start_timer(&ctx, ActivityTypeId(1), StartRequest::new()).await.unwrap());
    let snapshot = current_snapshot(&ctx).await.unwrap();
    assert!(snapshot.running_for(ActivityTypeId(1)).is_some());

    let again = start_timer(&ctx, ActivityTypeId(1), StartRequest::new()).await;
    assert!(matches!(again, Err(StintError::AlreadyRunning(_))));

    let stopped = stop_timer(&ctx, running.id).await.unwrap();
    let StopOutcome::Stopped(record) = stopped else { panic!("expected a stopped record") };
    assert_eq!(record.activity_type_id, ActivityTypeId(1));
    assert!(record.ended_at >= record.started_at);

    assert_eq!(stop_timer(&ctx, running.id).await.unwrap(), StopOutcome::NotFound);
    assert_eq!(ctx.tracking_service.list_records().await.unwrap().len(), 1);
    let snapshot = current_snapshot(&ctx).await.unwrap();
    assert!(snapshot.running_for(ActivityTypeId(1)).is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_selection_resumes_and_cancels() {
    let (ctx, _temp_dir) = seeded_context().await;

    let StartOutcome::PendingTagSelection(pending) =
        start_timer(&ctx, ActivityTypeId(3), StartRequest::new()).await.unwrap()
    else {
        panic!("type 3 offers two tags and must ask");
    };
    assert_eq!(pending.selectable_tag_ids, BTreeSet::from([TagId(7), TagId(8)]));

    let record = resume_timer(&ctx, pending.token, BTreeSet::from([TagId(8)])).await.unwrap();
    assert_eq!(record.tag_ids, BTreeSet::from([TagId(8)]));

    let reused = resume_timer(&ctx, pending.token, BTreeSet::new()).await;
    assert!(matches!(reused, Err(StintError::NotFound(_))));

    stop_timer(&ctx, record.id).await.unwrap();
    let StartOutcome::PendingTagSelection(second) =
        start_timer(&ctx, ActivityTypeId(3), StartRequest::new()).await.unwrap()
    else {
        panic!("expected another pending selection");
    };
    let cancelled = cancel_timer(&ctx, second.token).await.unwrap();
    assert_eq!(cancelled.activity_type_id, ActivityTypeId(3));
    assert!(matches!(cancel_timer(&ctx, second.token).await, Err(StintError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn filters_shape_the_available_entries() {
    let (ctx, _temp_dir) = seeded_context().await;

    let filter = add_filter(
        &ctx,
        NewActivityFilter {
            name: "  Focus ".into(),
            filter_type: FilterType::Activity,
            selected_ids: vec![1, 1],
            selected: true,
            color: AppColor::palette(2),
        },
    )
    .await
    .unwrap();
    assert_eq!(filter.name, "Focus");
    assert_eq!(filter.selected_ids, vec![1]);

    let snapshot = current_snapshot(&ctx).await.unwrap();
    let visible: Vec<_> = snapshot.available().map(|entry| entry.activity_type_id).collect();
    assert_eq!(visible, vec![ActivityTypeId(1)]);

    assert!(!toggle_filter(&ctx, filter.id).await.unwrap());
    let snapshot = current_snapshot(&ctx).await.unwrap();
    assert_eq!(snapshot.available().count(), 3);

    remove_filter(&ctx, filter.id).await.unwrap();
    let snapshot = current_snapshot(&ctx).await.unwrap();
    assert_eq!(snapshot.filters().count(), 0);

    let missing = toggle_filter(&ctx, FilterId(999)).await;
    assert!(matches!(missing, Err(StintError::NotFound(_))));

    let invalid = add_filter(
        &ctx,
        NewActivityFilter {
            name: "Ghosts".into(),
            filter_type: FilterType::Category,
            selected_ids: vec![99],
            selected: true,
            color: AppColor::palette(0),
        },
    )
    .await;
    assert!(matches!(invalid, Err(StintError::Validation(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn visibility_toggles_the_refresh_loop() {
    let (ctx, _temp_dir) = seeded_context().await;

    set_tracking_visible(&ctx, true).await.unwrap();
    set_tracking_visible(&ctx, true).await.unwrap();
    assert!(ctx.tracking_service.is_visible().await);

    set_tracking_visible(&ctx, false).await.unwrap();
    assert!(!ctx.tracking_service.is_visible().await);
    ctx.shutdown().await.unwrap();
}
