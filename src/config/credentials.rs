//! Credential list loading.
//!
//! The file format is one `username:password` per line, split on the
//! first `:` so passwords may themselves contain colons. The dispatcher
//! only ever reads the resulting list; entry order is sweep order.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

/// Errors that can occur when loading the credentials file.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read credentials file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One `(username, password)` pair from the credentials file.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialEntry {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("username", &self.username)
            .field("password", &"••••••••")
            .finish()
    }
}

/// Ordered list of known credentials.
#[derive(Debug, Default, Clone)]
pub struct CredentialSet {
    entries: Vec<CredentialEntry>,
}

impl CredentialSet {
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let content = fs::read_to_string(path).map_err(|source| CredentialError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// Parse file content. Blank lines and lines without a `:` separator
    /// are skipped; line content is not logged.
    pub fn parse(content: &str) -> Self {
        let mut entries = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((username, password)) => entries.push(CredentialEntry {
                    username: username.to_string(),
                    password: password.to_string(),
                }),
                None => warn!(line = index + 1, "skipping credentials line without ':' separator"),
            }
        }
        Self { entries }
    }

    /// Password of the first entry matching `username`.
    pub fn lookup(&self, username: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.password.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CredentialEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
