use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Debug, Parser)]
#[command(name = "hr_chatbox")]
#[command(about = "Show your heart rate in the VRChat chatbox", long_about = None)]
pub(crate) struct Cli {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to the config file, created with defaults if missing",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub(crate) config: PathBuf,
    #[arg(
        long = "dry_run",
        help = "Send a random heart rate instead of querying the configured source"
    )]
    pub(crate) dry_run: bool,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help = "Sets the level of verbosity")]
    pub(crate) verbose: u8,
}
