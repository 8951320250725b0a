//! GitHub Actions workflow commands and console progress
//!
//! Under Actions, output sections are folded with `::group::` and failures are
//! surfaced with `::error::` annotations. On an interactive terminal a styled
//! header and a spinner are shown instead.

use crate::infra::EnvSource;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::time::Duration;

/// Whether the process runs inside a GitHub Actions job
pub fn is_github_actions<E: EnvSource>(env: &E) -> bool {
    env.var("GITHUB_ACTIONS").as_deref() == Some("true")
}

/// Escape data for a workflow command
///
/// ```
/// use bloat_ci::ci::actions::escape_data;
///
/// assert_eq!(escape_data("50% done\nnext"), "50%25 done%0Anext");
/// ```
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// `::error::` annotation line for a failure message
pub fn error_annotation(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Run `f` inside a collapsible log section
pub fn group<T>(in_actions: bool, title: &str, f: impl FnOnce() -> T) -> T {
    if in_actions {
        println!("::group::{}", escape_data(title));
        let result = f();
        println!("::endgroup::");
        result
    } else {
        println!("\n{}", style(title).bold());
        f()
    }
}

/// Spinner for long tool runs, only drawn on an interactive terminal
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    /// Start a spinner with the given message
    pub fn start(in_actions: bool, message: impl Into<String>) -> Self {
        let message = message.into();
        if in_actions || !Term::stderr().is_term() {
            info!("{}", message);
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(spinner_style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar: Some(bar) }
    }

    /// Remove the spinner from the terminal
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
