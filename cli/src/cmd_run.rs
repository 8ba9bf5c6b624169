// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, sync::Arc, time::Duration};

use clap::{ArgMatches, Command, arg, value_parser};
use colored::Colorize;
use daysleft_core::jobs::{JobEngine, RetryPolicy, TokioJobEngine};
use daysleft_core::notify::{Notifier, TracingNotifier};
use daysleft_core::{Clock, DaysLeft, JobDispatcher, SystemClock};
use tokio::time::MissedTickBehavior;

use crate::config::parse_config;
use crate::notifier::StdoutNotifier;

/// Runs reminders, the daily digest and auto-archiving until interrupted.
#[derive(Debug, Clone, Copy)]
pub struct CmdRun {
    /// Seconds between reloads of events and settings changed by other commands.
    pub resync_secs: u64,

    /// Post notifications to the log instead of the terminal.
    pub quiet: bool,
}

impl CmdRun {
    pub const NAME: &str = "run";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Stay in the foreground and post reminders as they come due")
            .arg(
                arg!(--resync <SECONDS> "Seconds between picking up changes from other commands")
                    .value_parser(value_parser!(u64).range(1..))
                    .default_value("60"),
            )
            .arg(arg!(-q --quiet "Write notifications to the log instead of the terminal"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            resync_secs: matches.get_one("resync").copied().unwrap_or(60),
            quiet: matches.get_flag("quiet"),
        }
    }

    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "starting job engine...");
        let config = parse_config(config).await?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let notifier = self.notifier();

        let engine_clock = clock.clone();
        let app = DaysLeft::open(config, clock, move |config, db| -> Arc<dyn JobEngine> {
            let dispatcher = JobDispatcher::new(db.clone(), notifier, engine_clock.clone(), config);
            let retry = RetryPolicy {
                max_attempts: config.job_retry_limit,
                initial_backoff: config.job_retry_backoff(),
            };
            Arc::new(TokioJobEngine::new(
                Arc::new(dispatcher),
                engine_clock,
                retry,
            ))
        })
        .await?;

        let scheduled = app.on_launch().await?;
        println!(
            "{} {} reminders scheduled, press Ctrl-C to stop",
            "Running:".green(),
            scheduled
        );

        let result = self.watch(&app).await;
        app.close().await;
        result
    }

    fn notifier(&self) -> Arc<dyn Notifier> {
        match self.quiet {
            true => Arc::new(TracingNotifier),
            false => Arc::new(StdoutNotifier::new()),
        }
    }

    async fn watch(&self, app: &DaysLeft) -> Result<(), Box<dyn Error>> {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.resync_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    res?;
                    tracing::info!("interrupted, shutting down");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    if let Err(err) = app.refresh_settings() {
                        tracing::warn!(%err, "failed to reload settings");
                    }
                    if let Err(err) = app.reschedule_reminders().await {
                        tracing::warn!(%err, "failed to reschedule reminders");
                    }
                }
            }
        }
    }
}
