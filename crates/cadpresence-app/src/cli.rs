use std::path::PathBuf;

use clap::Parser;

/// cadpresence: show the active CAD document as Discord rich presence.
///
/// Reads host commands from stdin: `open <name>`, `close`, `start`,
/// `status`, `help`, `quit`.
#[derive(Parser, Debug)]
#[command(name = "cadpresence", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Activate the start command right after launch.
    #[arg(long)]
    pub autostart: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
