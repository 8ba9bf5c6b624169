// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use chrono::Timelike;
use clap::{ArgMatches, Command, arg};
use colored::Colorize;
use daysleft_core::{ConfigTime, DaysLeft, Settings};

use crate::arg::CommonArgs;
use crate::util::OutputFormat;

/// Shows or changes the daily digest settings.
#[derive(Debug, Clone)]
pub struct CmdDigest {
    pub enabled: Option<bool>,
    pub time: Option<ConfigTime>,
    pub output_format: OutputFormat,
}

impl CmdDigest {
    pub const NAME: &str = "digest";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Show or change the daily digest of the coming week")
            .arg(arg!(--on "Turn the daily digest on"))
            .arg(arg!(--off "Turn the daily digest off").conflicts_with("on"))
            .arg(
                arg!(--time <TIME> "Time of day of the digest, HH:MM")
                    .value_parser(|s: &str| s.parse::<ConfigTime>()),
            )
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        let enabled = if matches.get_flag("on") {
            Some(true)
        } else if matches.get_flag("off") {
            Some(false)
        } else {
            None
        };

        Self {
            enabled,
            time: matches.get_one("time").copied(),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, app: &DaysLeft) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "updating digest settings...");
        if let Some(time) = self.time {
            let time = time.time();
            app.set_digest_time(time.hour(), time.minute())?;
        }
        if let Some(enabled) = self.enabled {
            app.set_digest_enabled(enabled)?;
        }

        let settings = app.settings();
        match self.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&settings)?),
            OutputFormat::Table => println!("{}", describe(&settings)),
        }
        Ok(())
    }
}

fn describe(settings: &Settings) -> String {
    let state = match settings.digest_enabled {
        true => "on".green(),
        false => "off".yellow(),
    };
    format!(
        "Daily digest: {} at {:02}:{:02}",
        state, settings.digest_hour, settings.digest_minute
    )
}
