//! Completions command implementation
//!
//! Handles the `bloat-ci completions` command which generates
//! shell completion scripts for bash, zsh, fish, etc.

use clap::Command;
use clap_complete::{generate, Shell};
use std::io::Write;

/// Binary name used in generated scripts
pub const BIN_NAME: &str = "bloat-ci";

/// Generate shell completion scripts
///
/// Outputs completion script for the specified shell to stdout.
/// Users can redirect this to their shell's completion directory.
///
/// # Examples
///
/// ```bash
/// # Bash
/// bloat-ci completions bash > /etc/bash_completion.d/bloat-ci
///
/// # Zsh
/// bloat-ci completions zsh > ~/.zfunc/_bloat-ci
///
/// # Fish
/// bloat-ci completions fish > ~/.config/fish/completions/bloat-ci.fish
/// ```
pub fn cmd_completions(shell: Shell, cmd: &mut Command) {
    write_completions(shell, cmd, &mut std::io::stdout());
}

/// Write the completion script for `cmd` to `out`
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    generate(shell, cmd, BIN_NAME, out);
}
