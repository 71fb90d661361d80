//! Timer and visibility commands

use std::collections::BTreeSet;
use std::sync::Arc;

use stint_core::{PendingTagSelection, StartOutcome, StartRequest, StopOutcome};
use stint_domain::{
    ActivityTypeId, DisplaySnapshot, Result, RunningRecord, RunningRecordId, TagId,
};
use tracing::info;
use uuid::Uuid;

use crate::utils::command_helpers::execute_with_logging;
use crate::AppContext;

/// Start timing an activity type.
///
/// Returns a pending tag selection instead when the type needs the user to
/// pick tags first.
pub async fn start_timer(
    ctx: &AppContext,
    activity_type_id: ActivityTypeId,
    request: StartRequest,
) -> Result<StartOutcome> {
    let command_name = "tracking::start_timer";
    info!(command = command_name, %activity_type_id, "Starting timer");

    execute_with_logging(command_name, || ctx.tracking_service.start(activity_type_id, request))
        .await
}

/// Complete a pending start with the chosen tags.
pub async fn resume_timer(
    ctx: &AppContext,
    token: Uuid,
    tag_ids: BTreeSet<TagId>,
) -> Result<RunningRecord> {
    let command_name = "tracking::resume_timer";
    info!(command = command_name, %token, tags = tag_ids.len(), "Resuming pending start");

    execute_with_logging(command_name, || ctx.tracking_service.resume_start(token, tag_ids)).await
}

/// Drop a pending start.
pub async fn cancel_timer(ctx: &AppContext, token: Uuid) -> Result<PendingTagSelection> {
    let command_name = "tracking::cancel_timer";
    info!(command = command_name, %token, "Cancelling pending start");

    execute_with_logging(command_name, || async { ctx.tracking_service.cancel_start(token) })
        .await
}

pub async fn stop_timer(ctx: &AppContext, running_record_id: RunningRecordId) -> Result<StopOutcome> {
    let command_name = "tracking::stop_timer";
    info!(command = command_name, %running_record_id, "Stopping timer");

    execute_with_logging(command_name, || ctx.tracking_service.stop(running_record_id)).await
}

/// Report whether the tracking surface is on screen.
///
/// Visible starts the one-second refresh loop; hidden stops it and waits for
/// it to exit.
pub async fn set_tracking_visible(ctx: &AppContext, visible: bool) -> Result<()> {
    let command_name = "tracking::set_tracking_visible";
    info!(command = command_name, visible, "Tracking surface visibility changed");

    execute_with_logging(command_name, || async {
        ctx.tracking_service.set_visible(visible).await;
        Ok(())
    })
    .await
}

/// Latest published snapshot, producing one if nothing was published yet.
pub async fn current_snapshot(ctx: &AppContext) -> Result<Arc<DisplaySnapshot>> {
    let command_name = "tracking::current_snapshot";

    execute_with_logging(command_name, || async {
        match ctx.tracking_service.latest_snapshot() {
            Some(snapshot) => Ok(snapshot),
            None => ctx.tracking_service.refresh_now().await,
        }
    })
    .await
}
