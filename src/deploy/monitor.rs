// ABOUTME: Rollout monitor state machine for a service update.
// ABOUTME: Polls running tasks until success, early failure, or the timeout.

use std::time::Duration;

use tokio::time::Instant;

use crate::diagnostics::{Diagnostics, Warning};
use crate::plane::{ControlPlane, PlaneError, RolloutPhase, RunningTaskSnapshot};
use crate::types::{ServiceIdentity, TaskDefinitionArn};

use super::retry::backoff_delay;

/// Polling behaviour of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Wait between polls.
    pub poll_interval: Duration,
    /// Stopped tasks of the new revision tolerated before failing early.
    /// Zero disables the check.
    pub max_task_failures: u32,
    /// Upper bound on backoff after failed polls.
    pub max_backoff: Duration,
}

impl MonitorSettings {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
    pub const DEFAULT_MAX_TASK_FAILURES: u32 = 3;
    pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_task_failures: Self::DEFAULT_MAX_TASK_FAILURES,
            max_backoff: Self::DEFAULT_MAX_BACKOFF,
        }
    }
}

/// Why a rollout was declared failed before the timeout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RolloutFailure {
    #[error("ECS marked the deployment FAILED{}", format_reason(.reason))]
    CircuitBreaker { reason: Option<String> },

    #[error("{count} tasks of the new revision stopped{}", format_reason(.last_reason))]
    RepeatedTaskFailures {
        count: u32,
        last_reason: Option<String>,
    },
}

fn format_reason(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {reason}"),
        None => String::new(),
    }
}

/// Why the monitor ended in `Failed`.
#[derive(Debug)]
pub enum MonitorFailure {
    Rollout(RolloutFailure),
    Plane(PlaneError),
}

/// Monitor state. `Succeeded`, `TimedOut`, and `Failed` are terminal and
/// absorb every further event unchanged.
#[derive(Debug)]
pub enum MonitorState {
    Polling {
        last: Option<RunningTaskSnapshot>,
        consecutive_errors: u32,
    },
    Succeeded {
        last: RunningTaskSnapshot,
    },
    TimedOut {
        last: Option<RunningTaskSnapshot>,
    },
    Failed {
        failure: MonitorFailure,
        last: Option<RunningTaskSnapshot>,
    },
}

impl MonitorState {
    pub fn start() -> Self {
        MonitorState::Polling {
            last: None,
            consecutive_errors: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, MonitorState::Polling { .. })
    }

    /// Most recent snapshot seen, if any poll succeeded.
    pub fn last(&self) -> Option<&RunningTaskSnapshot> {
        match self {
            MonitorState::Succeeded { last } => Some(last),
            MonitorState::Polling { last, .. }
            | MonitorState::TimedOut { last }
            | MonitorState::Failed { last, .. } => last.as_ref(),
        }
    }

    /// Apply a successful poll.
    pub fn observe(self, snapshot: RunningTaskSnapshot, settings: &MonitorSettings) -> Self {
        if self.is_terminal() {
            return self;
        }

        if snapshot.is_settled() {
            return MonitorState::Succeeded { last: snapshot };
        }

        if snapshot.rollout == Some(RolloutPhase::Failed) {
            return MonitorState::Failed {
                failure: MonitorFailure::Rollout(RolloutFailure::CircuitBreaker {
                    reason: snapshot.rollout_reason.clone(),
                }),
                last: Some(snapshot),
            };
        }

        let failures = snapshot.failure_count();
        if settings.max_task_failures > 0 && failures >= settings.max_task_failures {
            return MonitorState::Failed {
                failure: MonitorFailure::Rollout(RolloutFailure::RepeatedTaskFailures {
                    count: failures,
                    last_reason: snapshot.last_stop_reason().map(str::to_string),
                }),
                last: Some(snapshot),
            };
        }

        MonitorState::Polling {
            last: Some(snapshot),
            consecutive_errors: 0,
        }
    }

    /// Apply a failed poll. Only transient errors keep the monitor polling.
    pub fn on_error(self, error: PlaneError) -> Self {
        match self {
            MonitorState::Polling {
                last,
                consecutive_errors,
            } => {
                if error.is_transient() {
                    MonitorState::Polling {
                        last,
                        consecutive_errors: consecutive_errors.saturating_add(1),
                    }
                } else {
                    MonitorState::Failed {
                        failure: MonitorFailure::Plane(error),
                        last,
                    }
                }
            }
            terminal => terminal,
        }
    }

    /// Time out a still-polling monitor once `elapsed` reaches `timeout`.
    pub fn check_deadline(self, elapsed: Duration, timeout: Duration) -> Self {
        match self {
            MonitorState::Polling { last, .. } if elapsed >= timeout => {
                MonitorState::TimedOut { last }
            }
            other => other,
        }
    }

    /// How long to wait before the next poll, capped to the time left.
    pub fn next_delay(
        &self,
        elapsed: Duration,
        timeout: Duration,
        settings: &MonitorSettings,
    ) -> Duration {
        let wait = match self {
            MonitorState::Polling {
                consecutive_errors, ..
            } if *consecutive_errors > 0 => backoff_delay(
                settings.poll_interval,
                *consecutive_errors,
                settings.max_backoff,
            ),
            _ => settings.poll_interval,
        };
        wait.min(timeout.saturating_sub(elapsed))
    }
}

/// Drives `MonitorState` against the control plane.
pub struct RolloutMonitor<'a, P> {
    plane: &'a P,
    identity: &'a ServiceIdentity,
    revision: &'a TaskDefinitionArn,
    timeout: Duration,
    settings: MonitorSettings,
}

impl<'a, P: ControlPlane> RolloutMonitor<'a, P> {
    pub fn new(
        plane: &'a P,
        identity: &'a ServiceIdentity,
        revision: &'a TaskDefinitionArn,
        timeout: Duration,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            plane,
            identity,
            revision,
            timeout,
            settings,
        }
    }

    /// Poll until a terminal state is reached.
    pub async fn run(&self, diag: &mut Diagnostics) -> MonitorState {
        let start = Instant::now();
        let mut state = MonitorState::start();

        loop {
            let polled = self
                .plane
                .describe_running_tasks(self.identity, self.revision)
                .await;
            let elapsed = start.elapsed();

            state = match polled {
                Ok(snapshot) => {
                    tracing::debug!(
                        service = %self.identity,
                        elapsed_secs = elapsed.as_secs(),
                        "{snapshot}"
                    );
                    state.observe(snapshot, &self.settings)
                }
                Err(err) => {
                    let message = err.to_string();
                    let next = state.on_error(err);
                    if !next.is_terminal() {
                        diag.warn(Warning::retried_read(format!("poll failed: {message}")));
                    }
                    next
                }
            };
            state = state.check_deadline(elapsed, self.timeout);

            if state.is_terminal() {
                return state;
            }

            let delay = state.next_delay(elapsed, self.timeout, &self.settings);
            tokio::time::sleep(delay).await;
        }
    }
}
