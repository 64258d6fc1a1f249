use clap::Parser;
use std::path::PathBuf;

/// Headless music player with an HTTP remote control API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Music directory (defaults to `library.dir` from the config, then the current directory)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Address to bind the API server to
    #[arg(long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// Port for the API server
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Print the effective configuration as TOML and exit
    #[arg(long = "dump-config")]
    pub dump_config: bool,
}
