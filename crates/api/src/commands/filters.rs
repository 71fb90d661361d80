//! Activity filter commands

use stint_domain::{ActivityFilter, FilterId, NewActivityFilter, Result};
use tracing::info;

use crate::utils::command_helpers::execute_with_logging;
use crate::AppContext;

/// Flip a filter's selection; returns the new `selected` value.
pub async fn toggle_filter(ctx: &AppContext, filter_id: FilterId) -> Result<bool> {
    let command_name = "filters::toggle_filter";
    info!(command = command_name, %filter_id, "Toggling filter");

    execute_with_logging(command_name, || ctx.tracking_service.toggle_filter(filter_id)).await
}

pub async fn add_filter(ctx: &AppContext, filter: NewActivityFilter) -> Result<ActivityFilter> {
    let command_name = "filters::add_filter";
    info!(
        command = command_name,
        filter_type = %filter.filter_type,
        members = filter.selected_ids.len(),
        "Adding filter"
    );

    execute_with_logging(command_name, || ctx.tracking_service.add_filter(filter)).await
}

pub async fn remove_filter(ctx: &AppContext, filter_id: FilterId) -> Result<()> {
    let command_name = "filters::remove_filter";
    info!(command = command_name, %filter_id, "Removing filter");

    execute_with_logging(command_name, || ctx.tracking_service.remove_filter(filter_id)).await
}
