use crate::cli::PurgeTunnelCli;
use clap::Parser;

/// Initialise the CLI and logging for the purge tunnel runner.
pub fn init() -> PurgeTunnelCli {
    env_logger::init();

    PurgeTunnelCli::parse()
}
