//! Background polling of manual generation status.
//!
//! Generation runs server-side and can take minutes. While a manual is
//! `processing`, the views watch it with a fixed-interval status check and
//! learn about the outcome through the [`EventBus`]. Each watch is owned
//! by a [`PollHandle`]; dropping the handle stops the loop.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use torisetsu_core::manual::ManualStatus;
use torisetsu_core::models::manual::{Manual, ManualStatusResponse};
use torisetsu_core::types::EntityId;
use torisetsu_events::{ClientEvent, EventBus, Notice};

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Default interval between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Read access to manuals, as needed by the pollers.
#[async_trait]
pub trait ManualSource: Send + Sync {
    async fn manual_status(&self, id: &str) -> Result<ManualStatusResponse, ApiError>;

    async fn manual(&self, id: &str) -> Result<Manual, ApiError>;

    async fn manuals_in_torisetsu(&self, torisetsu_id: &str) -> Result<Vec<Manual>, ApiError>;
}

/// Tunable parameters for a watch.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Time between checks. The first check happens one interval after
    /// the watch starts.
    pub interval: Duration,
    /// Stop after this many checks. Unbounded when `None`.
    pub max_ticks: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_ticks: None,
        }
    }
}

impl PollConfig {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }
}

impl From<&ClientConfig> for PollConfig {
    fn from(config: &ClientConfig) -> Self {
        Self::with_interval(config.poll_interval())
    }
}

/// Why a watch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// Nothing is processing any more; the final state was published.
    Resolved,
    /// The handle was cancelled or dropped.
    Cancelled,
    /// `max_ticks` checks ran without resolution.
    TickLimit,
}

/// Owner of a running watch. Cancels the loop when dropped.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<PollExit>>,
}

impl PollHandle {
    fn spawn<F>(cancel: CancellationToken, future: F) -> Self
    where
        F: std::future::Future<Output = PollExit> + Send + 'static,
    {
        Self {
            cancel,
            task: Some(tokio::spawn(future)),
        }
    }

    /// Stop the loop. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the loop to end without cancelling it.
    pub async fn finished(mut self) -> Result<PollExit, JoinError> {
        match self.task.take() {
            Some(task) => task.await,
            None => Ok(PollExit::Cancelled),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn interval(config: &PollConfig) -> tokio::time::Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + config.interval, config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn tick_limit_reached(ticks: u32, config: &PollConfig) -> bool {
    config.max_ticks.is_some_and(|max| ticks >= max)
}

// ---------------------------------------------------------------------------
// Single manual
// ---------------------------------------------------------------------------

/// Watch one manual while it is processing.
///
/// Every interval the lightweight status endpoint is checked. When the
/// status differs from `known_status` the full manual is fetched once,
/// published as [`ClientEvent::ManualUpdated`], and the watch ends. A
/// failed check is logged and retried on the next tick. If `known_status`
/// is not `processing` the watch ends immediately.
pub fn watch_manual<S>(
    source: Arc<S>,
    manual_id: impl Into<EntityId>,
    known_status: ManualStatus,
    config: PollConfig,
    bus: Arc<EventBus>,
) -> PollHandle
where
    S: ManualSource + ?Sized + 'static,
{
    let manual_id = manual_id.into();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    PollHandle::spawn(cancel, async move {
        if !known_status.is_processing() {
            return PollExit::Resolved;
        }

        tracing::info!(
            manual_id = %manual_id,
            interval_ms = config.interval.as_millis() as u64,
            "Watching manual generation",
        );

        let mut interval = interval(&config);
        let mut ticks = 0u32;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(manual_id = %manual_id, "Manual watch cancelled");
                    return PollExit::Cancelled;
                }
                _ = interval.tick() => {
                    ticks += 1;
                    let Some(status) = unless_cancelled(&token, source.manual_status(&manual_id)).await else {
                        tracing::debug!(manual_id = %manual_id, "Manual watch cancelled mid-request");
                        return PollExit::Cancelled;
                    };
                    match status {
                        Ok(check) if check.status != known_status => {
                            let Some(refetched) = unless_cancelled(&token, source.manual(&manual_id)).await else {
                                tracing::debug!(manual_id = %manual_id, "Manual watch cancelled mid-request");
                                return PollExit::Cancelled;
                            };
                            match refetched {
                                Ok(manual) => {
                                    tracing::info!(
                                        manual_id = %manual_id,
                                        status = %manual.status,
                                        "Manual status changed",
                                    );
                                    bus.publish(ClientEvent::ManualUpdated {
                                        manual: Box::new(manual),
                                    });
                                    return PollExit::Resolved;
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        manual_id = %manual_id,
                                        error = %e,
                                        "Failed to refetch manual",
                                    );
                                }
                            }
                        }
                        Ok(_) => {
                            tracing::debug!(manual_id = %manual_id, ticks, "Manual still processing");
                        }
                        Err(e) => {
                            tracing::warn!(
                                manual_id = %manual_id,
                                error = %e,
                                "Failed to check manual status",
                            );
                        }
                    }
                    if tick_limit_reached(ticks, &config) {
                        tracing::info!(manual_id = %manual_id, ticks, "Manual watch reached tick limit");
                        return PollExit::TickLimit;
                    }
                }
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Manual list
// ---------------------------------------------------------------------------

/// Watch the manuals of a torisetsu while any of them is processing.
///
/// Every interval the full list is refetched and published as
/// [`ClientEvent::ManualsRefreshed`]. A manual that moves from
/// `processing` to `completed` or `failed` raises a success or error
/// notice. The watch ends once no manual is processing.
pub fn watch_torisetsu<S>(
    source: Arc<S>,
    torisetsu_id: impl Into<EntityId>,
    manuals: &[Manual],
    config: PollConfig,
    bus: Arc<EventBus>,
) -> PollHandle
where
    S: ManualSource + ?Sized + 'static,
{
    let torisetsu_id = torisetsu_id.into();
    let mut previous = status_map(manuals);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    PollHandle::spawn(cancel, async move {
        if !previous.values().any(ManualStatus::is_processing) {
            return PollExit::Resolved;
        }

        tracing::info!(
            torisetsu_id = %torisetsu_id,
            interval_ms = config.interval.as_millis() as u64,
            "Watching manual list",
        );

        let mut interval = interval(&config);
        let mut ticks = 0u32;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(torisetsu_id = %torisetsu_id, "Manual list watch cancelled");
                    return PollExit::Cancelled;
                }
                _ = interval.tick() => {
                    ticks += 1;
                    let Some(listed) = unless_cancelled(&token, source.manuals_in_torisetsu(&torisetsu_id)).await else {
                        tracing::debug!(torisetsu_id = %torisetsu_id, "Manual list watch cancelled mid-request");
                        return PollExit::Cancelled;
                    };
                    match listed {
                        Ok(current) => {
                            let notices = transition_notices(&previous, &current);
                            let still_processing = current.iter().any(|m| m.status.is_processing());
                            previous = status_map(&current);

                            bus.publish(ClientEvent::ManualsRefreshed {
                                torisetsu_id: torisetsu_id.clone(),
                                manuals: current,
                            });
                            for notice in notices {
                                bus.notify(notice);
                            }

                            if !still_processing {
                                tracing::info!(torisetsu_id = %torisetsu_id, ticks, "No manuals processing");
                                return PollExit::Resolved;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                torisetsu_id = %torisetsu_id,
                                error = %e,
                                "Failed to poll manual list",
                            );
                        }
                    }
                    if tick_limit_reached(ticks, &config) {
                        tracing::info!(torisetsu_id = %torisetsu_id, ticks, "Manual list watch reached tick limit");
                        return PollExit::TickLimit;
                    }
                }
            }
        }
    })
}

/// Await `fut` unless `token` is cancelled first. A cancelled request is
/// dropped and its result never reaches the bus.
async fn unless_cancelled<F: Future>(token: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        out = fut => Some(out),
    }
}

fn status_map(manuals: &[Manual]) -> HashMap<EntityId, ManualStatus> {
    manuals.iter().map(|m| (m.id.clone(), m.status)).collect()
}

/// Notices for manuals that left `processing` since the previous poll.
fn transition_notices(previous: &HashMap<EntityId, ManualStatus>, current: &[Manual]) -> Vec<Notice> {
    current
        .iter()
        .filter(|m| previous.get(&m.id).is_some_and(ManualStatus::is_processing))
        .filter_map(|m| match m.status {
            ManualStatus::Completed => Some(Notice::success(format!(
                "マニュアル「{}」の生成が完了しました！",
                m.title
            ))),
            ManualStatus::Failed => Some(Notice::error(format!(
                "マニュアル「{}」の生成に失敗しました",
                m.title
            ))),
            _ => None,
        })
        .collect()
}
