/*!
 * Status surfaces.
 *
 * The engine tells the user what it is doing through a [`StatusReporter`].
 * Calls are fire-and-forget; nothing the reporter does can affect a pass.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::time::Duration;

/// Minimal progress surface
pub trait StatusReporter {
    /// Show a message, optionally with a detail line
    fn show(&self, message: &str, detail: Option<&str>);

    /// Hide the surface after `after` has elapsed
    fn hide(&self, after: Duration);
}

/// Reporter that writes status lines to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatusReporter;

impl StatusReporter for LogStatusReporter {
    fn show(&self, message: &str, detail: Option<&str>) {
        match detail {
            Some(detail) => info!("{} ({})", message, detail),
            None => info!("{}", message),
        }
    }

    fn hide(&self, after: Duration) {
        debug!("Status hidden after {:?}", after);
    }
}

/// Spinner on the terminal, for the command-line front end
#[derive(Debug, Clone)]
pub struct ProgressBarStatusReporter {
    bar: ProgressBar,
}

impl ProgressBarStatusReporter {
    /// Create a spinner drawn on stderr
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Stop the spinner now, leaving the last message on screen
    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish();
        }
    }
}

impl Default for ProgressBarStatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for ProgressBarStatusReporter {
    fn show(&self, message: &str, detail: Option<&str>) {
        match detail {
            Some(detail) => self.bar.set_message(format!("{} - {}", message, detail)),
            None => self.bar.set_message(message.to_string()),
        }
    }

    fn hide(&self, after: Duration) {
        // Outside a runtime there is nothing to defer onto
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let bar = self.bar.clone();
                handle.spawn(async move {
                    tokio::time::sleep(after).await;
                    bar.finish();
                });
            }
            Err(_) => self.bar.finish(),
        }
    }
}
