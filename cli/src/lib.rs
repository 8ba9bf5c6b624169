// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Terminal front-end of Days Left.

mod arg;
mod cli;
mod cmd_digest;
mod cmd_event;
mod cmd_generate_completion;
mod cmd_run;
mod config;
mod event_formatter;
mod notifier;
mod reminder_formatter;
mod table;
mod util;

pub use crate::cli::{Cli, Commands, run};
pub use crate::config::parse_config;
pub use crate::notifier::StdoutNotifier;
