use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use xasplore::config::{Cli, CredentialSet};
use xasplore::protocol::{ProtocolSession, SessionConfig};
use xasplore::repl::{self, Dispatcher};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so they never interleave with rendered results.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if !cli.download_path.is_dir() {
        bail!("download path not found: {}", cli.download_path.display());
    }

    let credentials = match &cli.credentials_file {
        Some(path) => CredentialSet::load(path).context("loading credentials")?,
        None => CredentialSet::default(),
    };
    if credentials.is_empty() {
        tracing::info!("no credentials loaded; 'login <user>' and '@<guid>' will have no users");
    }

    let mut session = ProtocolSession::new(SessionConfig {
        base_url: cli.base_url.trim_end_matches('/').to_string(),
        proxy: cli.proxy.clone(),
        verify_tls: !cli.insecure,
    })?;
    session.login(None).await.context("anonymous login failed")?;

    let dispatcher = Dispatcher::new(session, credentials, cli.download_path.clone());
    repl::run(dispatcher).await
}
