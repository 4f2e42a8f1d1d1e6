//! CLI arguments and credential loading.

mod cli;
mod credentials;

pub use cli::Cli;
pub use credentials::{CredentialEntry, CredentialError, CredentialSet};
