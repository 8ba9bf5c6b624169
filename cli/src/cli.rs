// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf, sync::Arc};

use clap::{
    ArgMatches, Command, ValueHint, arg, builder::styling, crate_authors, crate_version,
    value_parser,
};
use colored::Colorize;
use daysleft_core::jobs::{JobEngine, MemoryJobEngine};
use daysleft_core::{APP_NAME, DaysLeft, SystemClock};
use futures::{FutureExt, future::BoxFuture};
use tracing_subscriber::EnvFilter;

use crate::arg::CommonArgs;
use crate::cmd_digest::CmdDigest;
use crate::cmd_event::{
    CmdEventAdd, CmdEventArchive, CmdEventDelete, CmdEventEdit, CmdEventList, CmdEventReminders,
    CmdEventRestore,
};
use crate::cmd_generate_completion::CmdGenerateCompletion;
use crate::cmd_run::CmdRun;
use crate::config::parse_config;

/// Run the Days Left command-line interface.
pub async fn run() -> Result<(), Box<dyn Error>> {
    match Cli::parse() {
        Ok(cli) => {
            init_tracing(cli.verbose);
            if let Err(e) = cli.run().await {
                eprintln!("{} {}", "Error:".red(), e);
            }
        }
        Err(e) => eprintln!("{} {}", "Error:".red(), e),
    };
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = match verbose {
        true => EnvFilter::new("debug"),
        false => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(e) = subscriber {
        eprintln!("{} failed to set up logging: {}", "Warning:".yellow(), e);
    }
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// Whether to log debug messages
    pub verbose: bool,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Days Left - count the days until (and since) the events that matter.")
            .author(crate_authors!())
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(false) // allow default to list
            .arg_required_else_help(false)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $DAYSLEFT_CONFIG, then \
$XDG_CONFIG_HOME/daysleft/config.toml on Linux and MacOS, \
%APPDATA%/daysleft/config.toml on Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath)
                    .global(true),
            )
            .arg(CommonArgs::verbose())
            .subcommand(CmdEventList::command())
            .subcommand(CmdEventAdd::command())
            .subcommand(CmdEventEdit::command())
            .subcommand(CmdEventDelete::command())
            .subcommand(CmdEventArchive::command())
            .subcommand(CmdEventRestore::command())
            .subcommand(CmdEventReminders::command())
            .subcommand(CmdDigest::command())
            .subcommand(CmdRun::command())
            .subcommand(CmdGenerateCompletion::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdEventList::NAME, matches)) => List(CmdEventList::from(matches)),
            Some((CmdEventAdd::NAME, matches)) => Add(CmdEventAdd::from(matches)?),
            Some((CmdEventEdit::NAME, matches)) => Edit(CmdEventEdit::from(matches)?),
            Some((CmdEventDelete::NAME, matches)) => Delete(CmdEventDelete::from(matches)),
            Some((CmdEventArchive::NAME, matches)) => Archive(CmdEventArchive::from(matches)),
            Some((CmdEventRestore::NAME, matches)) => Restore(CmdEventRestore::from(matches)),
            Some((CmdEventReminders::NAME, matches)) => {
                Reminders(CmdEventReminders::from(matches)?)
            }
            Some((CmdDigest::NAME, matches)) => Digest(CmdDigest::from(matches)),
            Some((CmdRun::NAME, matches)) => Run(CmdRun::from(matches)),
            Some((CmdGenerateCompletion::NAME, matches)) => {
                GenerateCompletion(CmdGenerateCompletion::from(matches)?)
            }
            None => List(CmdEventList::default()),
            Some((name, _)) => return Err(format!("Unknown command: {name}").into()),
        };

        let config = matches.get_one("config").cloned();
        let verbose = CommonArgs::get_verbose(&matches);
        Ok(Cli {
            config,
            verbose,
            command,
        })
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// List events
    List(CmdEventList),

    /// Add an event
    Add(CmdEventAdd),

    /// Edit an event
    Edit(CmdEventEdit),

    /// Delete events
    Delete(CmdEventDelete),

    /// Archive events
    Archive(CmdEventArchive),

    /// Restore archived events
    Restore(CmdEventRestore),

    /// Show the reminders of an event
    Reminders(CmdEventReminders),

    /// Show or change the daily digest
    Digest(CmdDigest),

    /// Run the background jobs in the foreground
    Run(CmdRun),

    /// Generate shell completion
    GenerateCompletion(CmdGenerateCompletion),
}

impl Commands {
    /// Run the command with the given configuration
    #[rustfmt::skip]
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        match self {
            List(a)      => Self::run_with(config, |x| a.run(x).boxed()).await,
            Add(a)       => Self::run_with(config, |x| a.run(x).boxed()).await,
            Edit(a)      => Self::run_with(config, |x| a.run(x).boxed()).await,
            Delete(a)    => Self::run_with(config, |x| a.run(x).boxed()).await,
            Archive(a)   => Self::run_with(config, |x| a.run(x).boxed()).await,
            Restore(a)   => Self::run_with(config, |x| a.run(x).boxed()).await,
            Reminders(a) => Self::run_with(config, |x| a.run(x).boxed()).await,
            Digest(a)    => Self::run_with(config, |x| a.run(x).boxed()).await,
            Run(a) => a.run(config).await,
            GenerateCompletion(a) => a.run(),
        }
    }

    /// Opens the application for a single command.
    ///
    /// Jobs go to a [`MemoryJobEngine`] and are dropped when the command ends,
    /// `daysleft run` schedules them again from the stored events.
    async fn run_with<F>(config: Option<PathBuf>, f: F) -> Result<(), Box<dyn Error>>
    where
        F: for<'a> FnOnce(&'a DaysLeft) -> BoxFuture<'a, Result<(), Box<dyn Error>>>,
    {
        tracing::debug!("parsing configuration...");
        let config = parse_config(config).await?;
        let app = DaysLeft::open(config, Arc::new(SystemClock), |_, _| -> Arc<dyn JobEngine> {
            Arc::new(MemoryJobEngine::new())
        })
        .await?;

        let result = f(&app).await;
        app.close().await;
        result
    }
}
