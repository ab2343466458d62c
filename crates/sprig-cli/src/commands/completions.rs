//! `sprig completions` command - Generate shell completions.

use std::io::Write;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;

use crate::commands::Cli;

/// Print completions for `shell` to stdout.
pub fn run(shell: Shell) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

fn write(shell: Shell, out: &mut impl Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, out);
}
