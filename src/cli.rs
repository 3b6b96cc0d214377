use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Travel history HTTP service")]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "TRAVELS_CONFIG", default_value = "config.json")]
    pub config: PathBuf,
}
