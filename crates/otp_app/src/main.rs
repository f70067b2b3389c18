mod cli;
mod output;
mod platform;

use std::io;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    platform::logging::initialize(cli.log_level(), cli.log_file.as_deref());

    let launcher = output::run(&cli.config(), !cli.no_preview);
    output::write_output(io::stdout().lock(), &launcher, cli.compact)
}
