// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};

use chrono::Local;
use colored::Colorize;
use daysleft_core::Priority;
use daysleft_core::notify::{Notification, Notifier, NotifyError};

/// Prints notifications to the terminal, one line each.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutNotifier;

impl StdoutNotifier {
    pub fn new() -> Self {
        Self
    }

    fn write(w: &mut impl Write, n: &Notification) -> io::Result<()> {
        let title = match n.priority {
            Priority::High => n.title.red().bold(),
            Priority::Default => n.title.bold(),
            Priority::Low => n.title.dimmed(),
        };
        writeln!(w, "[{}] {} {}", Local::now().format("%H:%M"), title, n.body)?;
        w.flush()
    }
}

impl Notifier for StdoutNotifier {
    fn notify(&self, n: &Notification) -> Result<(), NotifyError> {
        tracing::debug!(id = n.id, channel = %n.channel, "posting notification");
        Self::write(&mut io::stdout().lock(), n).map_err(|e| NotifyError::Post(e.to_string()))
    }
}
