//! Visibility-driven periodic refresh
//!
//! Two states: `Idle` (no loop) and `Active` (one loop task plus the token
//! that cancels it). Every visibility change first tears down whatever loop
//! exists and waits for it to finish, so at most one loop ever runs and
//! repeated "visible" signals never stack loops.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::refresher::SnapshotRefresher;

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Active,
}

enum LoopState {
    Idle,
    Active { cancel: CancellationToken, handle: JoinHandle<()> },
}

pub struct RefreshScheduler {
    refresher: Arc<SnapshotRefresher>,
    interval: Duration,
    join_timeout: Duration,
    state: Mutex<LoopState>,
}

impl RefreshScheduler {
    pub fn new(refresher: Arc<SnapshotRefresher>, interval: Duration, join_timeout: Duration) -> Self {
        Self { refresher, interval, join_timeout, state: Mutex::new(LoopState::Idle) }
    }

    /// Apply a visibility change.
    ///
    /// Always stops the current loop first. When `visible`, a fresh loop is
    /// spawned that refreshes immediately and then once per interval.
    #[instrument(skip(self))]
    pub async fn set_visible(&self, visible: bool) {
        let mut state = self.state.lock().await;
        self.stop_loop(&mut state).await;

        if visible {
            let cancel = CancellationToken::new();
            let handle = tokio::spawn(Self::refresh_loop(
                Arc::clone(&self.refresher),
                self.interval,
                cancel.clone(),
            ));
            *state = LoopState::Active { cancel, handle };
            info!(interval_ms = self.interval.as_millis() as u64, "refresh loop started");
        }
    }

    pub async fn state(&self) -> RefreshState {
        match &*self.state.lock().await {
            LoopState::Idle => RefreshState::Idle,
            LoopState::Active { .. } => RefreshState::Active,
        }
    }

    pub async fn is_active(&self) -> bool {
        self.state().await == RefreshState::Active
    }

    /// Stop the loop, if any. Equivalent to `set_visible(false)`.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        self.stop_loop(&mut state).await;
    }

    async fn stop_loop(&self, state: &mut LoopState) {
        let LoopState::Active { cancel, mut handle } = std::mem::replace(state, LoopState::Idle)
        else {
            return;
        };

        cancel.cancel();
        match tokio::time::timeout(self.join_timeout, &mut handle).await {
            Ok(Ok(())) => info!("refresh loop stopped"),
            Ok(Err(join_error)) if join_error.is_cancelled() => debug!("refresh loop aborted"),
            Ok(Err(join_error)) => error!(error = %join_error, "refresh loop panicked"),
            Err(_) => {
                warn!(
                    timeout_ms = self.join_timeout.as_millis() as u64,
                    "refresh loop did not stop in time; aborting"
                );
                handle.abort();
                let _ = handle.await;
            }
        }
    }

    async fn refresh_loop(
        refresher: Arc<SnapshotRefresher>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = refresher.refresh() => match result {
                    Ok(_) => {}
                    Err(e) if e.is_transient() => warn!(error = %e, "periodic refresh skipped"),
                    Err(e) => error!(error = %e, "periodic refresh failed"),
                },
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        debug!("refresh loop exited");
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let LoopState::Active { cancel, handle } = self.state.get_mut() {
            cancel.cancel();
            handle.abort();
        }
    }
}
