use std::path::PathBuf;

use clap::Parser;

/// Interactive explorer for an XAS data-access endpoint.
#[derive(Debug, Parser)]
#[command(name = "xasplore", version, about)]
pub struct Cli {
    /// The URL to operate on, e.g. https://app.example.com
    pub base_url: String,

    /// Path to a username:password file, one entry per line
    #[arg(short = 'c', long)]
    pub credentials_file: Option<PathBuf>,

    /// HTTP(S) proxy, e.g. 127.0.0.1:8080
    #[arg(short = 'p', long)]
    pub proxy: Option<String>,

    /// Disable TLS certificate verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Downloads destination directory
    #[arg(short = 'd', long, default_value = ".")]
    pub download_path: PathBuf,
}
