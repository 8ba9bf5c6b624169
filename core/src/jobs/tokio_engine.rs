// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::clock::Clock;
use crate::jobs::{Job, JobEngine, JobError, JobOutcome, JobRunner};

/// How often and how patiently a failing job is run again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per firing, including the first.
    pub max_attempts: u32,

    /// Delay before the first retry, doubled after each further failure.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(30),
        }
    }
}

/// Runs each job as a task on the current tokio runtime.
///
/// Timers follow the wall clock of the given [`Clock`] at the moment a job is
/// scheduled; jobs do not survive the process, so callers re-enqueue them on
/// start-up.
///
/// Cancelling a job that is waiting aborts it. A job that is already running
/// finishes its current run and then stops.
#[derive(Clone)]
pub struct TokioJobEngine {
    inner: Arc<Inner>,
}

struct Inner {
    runner: Arc<dyn JobRunner>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    tasks: Mutex<HashMap<String, Vec<Task>>>,
}

struct Task {
    abort: AbortHandle,
    state: Arc<Mutex<TaskState>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskState {
    Waiting,
    Running,
    Cancelled,
}

impl Task {
    fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }

    fn cancel(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == TaskState::Waiting {
            self.abort.abort();
        }
        *state = TaskState::Cancelled;
    }
}

/// Moves a task to `next` unless it was cancelled meanwhile.
fn transition(state: &Mutex<TaskState>, next: TaskState) -> bool {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if *state == TaskState::Cancelled {
        return false;
    }
    *state = next;
    true
}

impl fmt::Debug for TokioJobEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioJobEngine")
            .field("retry", &self.inner.retry)
            .field("clock", &self.inner.clock)
            .finish_non_exhaustive()
    }
}

impl TokioJobEngine {
    pub fn new(runner: Arc<dyn JobRunner>, clock: Arc<dyn Clock>, retry: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                runner,
                clock,
                retry,
                tasks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Tags with at least one job that has not finished yet.
    pub fn pending_tags(&self) -> Result<Vec<String>, JobError> {
        let mut tasks = self.inner.tasks.lock().map_err(|_| JobError::Poisoned)?;
        tasks.retain(|_, entries| {
            entries.retain(|t| !t.is_finished());
            !entries.is_empty()
        });
        let mut tags: Vec<_> = tasks.keys().cloned().collect();
        tags.sort();
        Ok(tags)
    }

    async fn drive(self, job: Job, state: Arc<Mutex<TaskState>>) {
        let mut schedule = Some(job.schedule);
        while let Some(current) = schedule {
            let delay = (current.first_at() - self.inner.clock.now().with_timezone(&Utc))
                .to_std()
                .unwrap_or(Duration::ZERO);
            tracing::debug!(tag = %job.tag, ?delay, "waiting for job");
            tokio::time::sleep(delay).await;

            if !transition(&state, TaskState::Running) {
                break;
            }
            self.run_with_retry(&job).await;
            if !transition(&state, TaskState::Waiting) {
                tracing::debug!(tag = %job.tag, "job cancelled while running");
                break;
            }
            schedule = current.advance();
        }
    }

    async fn run_with_retry(&self, job: &Job) {
        let retry = self.inner.retry;
        let mut backoff = retry.initial_backoff;
        for attempt in 1..=retry.max_attempts.max(1) {
            match self.inner.runner.run(job, self).await {
                JobOutcome::Success => return,
                JobOutcome::Failure => {
                    tracing::warn!(tag = %job.tag, kind = %job.kind, "job failed");
                    return;
                }
                JobOutcome::Retry if attempt < retry.max_attempts => {
                    tracing::debug!(tag = %job.tag, attempt, ?backoff, "job will be retried");
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                JobOutcome::Retry => {
                    tracing::warn!(tag = %job.tag, attempt, "job gave up after retries");
                }
            }
        }
    }
}

impl JobEngine for TokioJobEngine {
    fn enqueue(&self, job: Job) -> Result<(), JobError> {
        let handle = Handle::try_current().map_err(|_| JobError::NoRuntime)?;
        tracing::debug!(tag = %job.tag, kind = %job.kind, at = %job.schedule.first_at(), "enqueue job");

        let tag = job.tag.clone();
        let state = Arc::new(Mutex::new(TaskState::Waiting));
        let mut tasks = self.inner.tasks.lock().map_err(|_| JobError::Poisoned)?;
        let spawned = handle.spawn(self.clone().drive(job, state.clone()));
        let entries = tasks.entry(tag).or_default();
        entries.retain(|t| !t.is_finished());
        entries.push(Task {
            abort: spawned.abort_handle(),
            state,
        });
        Ok(())
    }

    fn cancel_by_tag(&self, tag: &str) -> Result<(), JobError> {
        let entries = self
            .inner
            .tasks
            .lock()
            .map_err(|_| JobError::Poisoned)?
            .remove(tag)
            .unwrap_or_default();

        if !entries.is_empty() {
            tracing::debug!(tag, count = entries.len(), "cancelling jobs");
        }
        for task in entries {
            task.cancel();
        }
        Ok(())
    }
}
