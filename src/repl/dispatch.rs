//! Command execution against the protocol session.
//!
//! The dispatcher owns the session, the credential list and the download
//! directory, and turns a parsed [`Command`] into a typed [`Outcome`].
//! It never prints; rendering outcomes is the caller's concern.

use std::path::PathBuf;

use tracing::warn;

use crate::config::CredentialSet;
use crate::protocol::{DomainObject, DownloadOutcome, ProtocolError, ProtocolSession};
use crate::repl::command::Command;

/// What a command produced, ready for rendering.
#[derive(Debug)]
pub enum Outcome {
    Usage,
    /// Objects returned for a query or commit; may be empty, which the
    /// presentation layer reports as "no results" for `subject`.
    Objects {
        subject: String,
        objects: Vec<DomainObject>,
    },
    ClassNames(Vec<String>),
    /// One entry per class, each reported independently.
    ClassSamples(Vec<ClassSample>),
    SweepReport {
        entries: Vec<SweepEntry>,
        /// Identity in effect after restoration.
        restored: String,
    },
    LoginChanged { identity: String },
    UserNotFound { username: String },
    LoginFailed { username: String },
    Download(DownloadOutcome),
    Unrecognized { input: String },
}

/// One class's sample from the `?` command.
#[derive(Debug)]
pub struct ClassSample {
    pub class: String,
    pub objects: Vec<DomainObject>,
}

/// One user's result within an impersonation sweep.
#[derive(Debug)]
pub struct SweepEntry {
    pub username: String,
    pub access: SweepAccess,
}

#[derive(Debug)]
pub enum SweepAccess {
    /// Logged in and queried; the object list may be empty.
    Queried(Vec<DomainObject>),
    /// Logged in but the query itself failed.
    QueryFailed(String),
    /// Could not log in as this user; the sweep continued without them.
    LoginFailed(String),
}

/// Executes parsed commands against one owned [`ProtocolSession`].
pub struct Dispatcher {
    session: ProtocolSession,
    credentials: CredentialSet,
    download_dir: PathBuf,
}

impl Dispatcher {
    pub fn new(session: ProtocolSession, credentials: CredentialSet, download_dir: PathBuf) -> Self {
        Self {
            session,
            credentials,
            download_dir,
        }
    }

    pub fn session(&self) -> &ProtocolSession {
        &self.session
    }

    /// Execute one command to completion. Zero results is a normal
    /// outcome; errors abort only this command.
    pub async fn execute(&mut self, command: Command) -> Result<Outcome, ProtocolError> {
        match command {
            Command::Usage => Ok(Outcome::Usage),
            Command::ClassQuery {
                class,
                limit,
                offset,
            } => {
                let objects = self
                    .session
                    .query_by_class(&class, limit, offset, None)
                    .await?;
                Ok(Outcome::Objects {
                    subject: format!("//{class}"),
                    objects,
                })
            }
            Command::GuidLookup { guid } => {
                let objects = self.session.query_by_id(&guid).await?;
                Ok(Outcome::Objects {
                    subject: guid,
                    objects,
                })
            }
            Command::ClassNamesSorted => {
                let mut names = self.session.list_classes();
                names.sort_by_key(|name| name.to_lowercase());
                Ok(Outcome::ClassNames(names))
            }
            Command::SampleEachClass => self.sample_each_class().await,
            Command::ClassNames => Ok(Outcome::ClassNames(self.session.list_classes())),
            Command::Login { username } => self.login(username).await,
            Command::UpdateAttribute {
                guid,
                attribute,
                value,
            } => {
                let objects = self
                    .session
                    .update_attribute(&guid, &attribute, &value)
                    .await?;
                Ok(Outcome::Objects {
                    subject: format!("+{guid}"),
                    objects,
                })
            }
            Command::AccessSweep { guid } => self.access_sweep(&guid).await,
            Command::DownloadFile { guid } => self.download(&guid).await,
            Command::Unrecognized { input } => Ok(Outcome::Unrecognized { input }),
        }
    }

    /// `?`: one object of each class, sorted ascending. An empty class
    /// is recorded and the remaining classes still run.
    async fn sample_each_class(&mut self) -> Result<Outcome, ProtocolError> {
        let mut names = self.session.list_classes();
        names.sort();
        let mut samples = Vec::with_capacity(names.len());
        for class in names {
            let objects = self.session.query_by_class(&class, 1, None, None).await?;
            samples.push(ClassSample { class, objects });
        }
        Ok(Outcome::ClassSamples(samples))
    }

    async fn login(&mut self, username: Option<String>) -> Result<Outcome, ProtocolError> {
        let Some(username) = username else {
            self.session.login(None).await?;
            return Ok(Outcome::LoginChanged {
                identity: self.current_identity(),
            });
        };

        let Some(password) = self.credentials.lookup(&username) else {
            return Ok(Outcome::UserNotFound { username });
        };
        match self.session.login(Some((&username, password))).await {
            Ok(()) => Ok(Outcome::LoginChanged {
                identity: self.current_identity(),
            }),
            Err(ProtocolError::AuthenticationFailed { .. }) => {
                Ok(Outcome::LoginFailed { username })
            }
            Err(other) => Err(other),
        }
    }

    /// `@guid`: log in as every known credential in list order, query
    /// the guid under each, then restore the pre-sweep identity.
    ///
    /// The original identity is captured before the first re-login;
    /// restoration never reads loop state. A user whose login fails is
    /// skipped and the sweep continues.
    async fn access_sweep(&mut self, guid: &str) -> Result<Outcome, ProtocolError> {
        let original = if self.session.is_anonymous() {
            None
        } else {
            self.session.identity().map(str::to_string)
        };

        let mut entries = Vec::with_capacity(self.credentials.len());
        for entry in self.credentials.iter() {
            let access = match self
                .session
                .login(Some((&entry.username, &entry.password)))
                .await
            {
                Ok(()) => match self.session.query_by_id(guid).await {
                    Ok(objects) => SweepAccess::Queried(objects),
                    Err(err) => SweepAccess::QueryFailed(err.to_string()),
                },
                Err(err) => {
                    warn!(user = %entry.username, error = %err, "sweep login failed, skipping user");
                    SweepAccess::LoginFailed(err.to_string())
                }
            };
            entries.push(SweepEntry {
                username: entry.username.clone(),
                access,
            });
        }

        let restored = self.restore_identity(original).await?;
        Ok(Outcome::SweepReport { entries, restored })
    }

    /// Re-establish the identity captured before a sweep. An anonymous
    /// original logs back in anonymously; a named original re-uses its
    /// credential entry, falling back to anonymous if the entry has
    /// vanished from the list.
    async fn restore_identity(
        &mut self,
        original: Option<String>,
    ) -> Result<String, ProtocolError> {
        match original {
            None => self.session.login(None).await?,
            Some(username) => match self.credentials.lookup(&username) {
                Some(password) => self.session.login(Some((&username, password))).await?,
                None => {
                    warn!(user = %username, "pre-sweep user missing from credential list, restoring anonymous");
                    self.session.login(None).await?;
                }
            },
        }
        Ok(self.current_identity())
    }

    async fn download(&mut self, guid: &str) -> Result<Outcome, ProtocolError> {
        let objects = self.session.query_by_id(guid).await?;
        let name = objects
            .first()
            .and_then(|object| object.attribute_text("Name"))
            .unwrap_or_else(|| "unnamed".to_string());
        let outcome = self
            .session
            .download_file(guid, &name, &self.download_dir)
            .await?;
        Ok(Outcome::Download(outcome))
    }

    fn current_identity(&self) -> String {
        self.session.identity().unwrap_or_default().to_string()
    }
}
