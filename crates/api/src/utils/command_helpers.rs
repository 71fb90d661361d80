//! Command execution helpers
//!
//! Every command times itself and logs its outcome the same way; this keeps
//! the individual wrappers down to the call they make.

use std::future::Future;
use std::time::Instant;

use stint_domain::Result;

use crate::utils::logging::{error_label, log_command_execution};

/// Execute a command, logging its duration and outcome.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn my_command(ctx: &AppContext, id: FilterId) -> Result<bool> {
///     execute_with_logging("my_module::my_command", || async {
///         ctx.tracking_service.toggle_filter(id).await
///     })
///     .await
/// }
/// ```
pub async fn execute_with_logging<F, Fut, T>(command_name: &str, command_fn: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let start = Instant::now();

    let result = command_fn().await;

    let elapsed = start.elapsed();
    let success = result.is_ok();
    let error_type = result.as_ref().err().map(error_label);

    log_command_execution(command_name, elapsed, success, error_type);

    result
}

#[cfg(test)]
mod tests {
    use stint_domain::StintError;

    use super::*;

    #[tokio::test]
    async fn passes_the_result_through() {
        let ok = execute_with_logging("test::ok", || async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: Result<()> = execute_with_logging("test::err", || async {
            Err(StintError::NotFound("filter 9".into()))
        })
        .await;
        assert_eq!(err, Err(StintError::NotFound("filter 9".into())));
    }
}
