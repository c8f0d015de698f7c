//! Shell completions command

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io;

/// Generate shell completions for the given shell on stdout.
pub fn completions(shell: Shell) {
    let mut cmd = crate::Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
