use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jarvis-doctor")]
#[command(version = concat!("Ver:", env!("CARGO_PKG_VERSION")))]
#[command(about = "Health probes and diagnostics for ARP Jarvis deployments")]
pub struct Cli {
    /// Probe this URL instead of the configured checks (repeatable)
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Config file (default: ~/.arp-jarvis/doctor.toml)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Request timeout in milliseconds
    #[arg(short = 't', long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u32>,

    /// Treat non-2xx responses as failures
    #[arg(long = "require-success")]
    pub require_success: bool,

    /// Print the report as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Write a default config file
    #[arg(long = "init")]
    pub init: bool,

    /// Validate the config file
    #[arg(long = "check")]
    pub check: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
