use anyhow::Result;
use clap::Parser;
use env_logger::init;
use ufoproc_cli::cli::Cli;

fn main() -> Result<()> {
    init();
    Cli::parse().command.run()
}
