// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeZone, Utc};

use crate::jobs::{Job, JobEngine, JobError, JobOutcome, JobRunner};

/// Keeps jobs in memory without running them on its own.
///
/// Jobs only run when [`MemoryJobEngine::run_due`] is called, which makes the
/// engine suitable for short-lived processes and for driving time by hand.
#[derive(Debug, Default)]
pub struct MemoryJobEngine {
    jobs: Mutex<BTreeMap<String, Vec<Job>>>,
}

impl MemoryJobEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// All pending jobs, ordered by tag then insertion.
    pub fn jobs(&self) -> Vec<Job> {
        self.lock().values().flatten().cloned().collect()
    }

    /// Pending jobs with the tag.
    pub fn jobs_for(&self, tag: &str) -> Vec<Job> {
        self.lock().get(tag).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every job due at `now` once, in firing order.
    ///
    /// One-time jobs are dropped after running unless the runner asks for a
    /// retry; recurring jobs move on to their next day before they run, so a
    /// runner may still cancel them.
    pub async fn run_due<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        runner: &dyn JobRunner,
    ) -> Vec<(Job, JobOutcome)> {
        let now = now.with_timezone(&Utc);
        let mut due = Vec::new();
        {
            let mut jobs = self.lock();
            for pending in jobs.values_mut() {
                let mut kept = Vec::with_capacity(pending.len());
                for job in pending.drain(..) {
                    if job.schedule.first_at() > now {
                        kept.push(job);
                        continue;
                    }

                    if let Some(schedule) = job.schedule.advance() {
                        kept.push(Job {
                            schedule,
                            ..job.clone()
                        });
                    }
                    due.push(job);
                }
                *pending = kept;
            }
            jobs.retain(|_, pending| !pending.is_empty());
        }
        due.sort_by_key(|job| job.schedule.first_at());

        let mut results = Vec::with_capacity(due.len());
        for job in due {
            tracing::debug!(tag = %job.tag, kind = %job.kind, "running due job");
            let outcome = runner.run(&job, self).await;
            if outcome == JobOutcome::Retry && !job.schedule.is_recurring() {
                self.lock().entry(job.tag.clone()).or_default().push(job.clone());
            }
            results.push((job, outcome));
        }
        results
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<Job>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl JobEngine for MemoryJobEngine {
    fn enqueue(&self, job: Job) -> Result<(), JobError> {
        tracing::debug!(tag = %job.tag, kind = %job.kind, at = %job.schedule.first_at(), "enqueue job");
        self.lock().entry(job.tag.clone()).or_default().push(job);
        Ok(())
    }

    fn cancel_by_tag(&self, tag: &str) -> Result<(), JobError> {
        if let Some(jobs) = self.lock().remove(tag) {
            tracing::debug!(tag, count = jobs.len(), "cancelled jobs");
        }
        Ok(())
    }
}
