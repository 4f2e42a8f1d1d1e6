//! The authenticated protocol conversation.
//!
//! One [`ProtocolSession`] owns one logical conversation with the remote
//! service: the CSRF token, the session cookie, the current identity and
//! the class catalogue delivered by the handshake. `login` is the only
//! writer of that state; every other operation reads it. Requests are
//! issued strictly sequentially and carry no timeout beyond the transport
//! defaults.

use std::io::Write;
use std::path::Path;

use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use reqwest::{Client, Proxy, Response};
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use super::error::{DownloadOutcome, ProtocolError};
use super::types::{ClassDescriptor, DomainObject, ObjectsResponse, SessionDataResponse, TokenResponse};

const XAS_PATH: &str = "/xas/";
const FILE_PATH: &str = "/file";
const CSRF_HEADER: &str = "X-Csrf-Token";
const SESSION_COOKIE: &str = "__Host-XASSESSIONID";
/// The service shapes its responses by client profile; claim a desktop.
const DEVICE_COOKIES: &str = "__Host-DeviceType=Desktop; __Host-Profile=Responsive";

/// Construction parameters for a session, read once from the CLI.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Service root, no trailing slash.
    pub base_url: String,
    /// Optional HTTP(S) proxy, host:port or full URL.
    pub proxy: Option<String>,
    /// Verify TLS certificates. Off only for deliberate interception.
    pub verify_tls: bool,
}

/// One authenticated conversation with the remote service.
pub struct ProtocolSession {
    http: Client,
    base_url: String,
    identity: Option<String>,
    csrf_token: Option<String>,
    session_cookie: Option<String>,
    metadata: Vec<ClassDescriptor>,
}

impl ProtocolSession {
    /// Build the HTTP client. No request is issued until [`Self::login`].
    pub fn new(config: SessionConfig) -> Result<Self, ProtocolError> {
        let mut builder = Client::builder();
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy_url(proxy))?);
        }
        if !config.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            identity: None,
            csrf_token: None,
            session_cookie: None,
            metadata: Vec::new(),
        })
    }

    /// Display name of the current principal, once logged in.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Whether the current principal is a server-assigned anonymous user.
    /// Holds before the first login as well.
    pub fn is_anonymous(&self) -> bool {
        self.identity
            .as_deref()
            .map_or(true, |name| name.starts_with("Anonymous"))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticate as the given user, or anonymously when `credentials`
    /// is `None`.
    ///
    /// The CSRF token, session cookie and identity are cleared before the
    /// attempt, so a failed login can never inherit the previous
    /// identity's session. With credentials, an `action: login` request
    /// must succeed first; either way the `get_session_data` handshake
    /// must then succeed to establish the identity, the fresh token and
    /// the class catalogue together.
    pub async fn login(
        &mut self,
        credentials: Option<(&str, &str)>,
    ) -> Result<(), ProtocolError> {
        self.csrf_token = None;
        self.session_cookie = None;
        self.identity = None;

        if let Some((username, password)) = credentials {
            let response = self
                .post_action("login", json!({"username": username, "password": password}), None)
                .await?;
            if !response.status().is_success() {
                return Err(ProtocolError::AuthenticationFailed {
                    username: username.to_string(),
                    status: response.status().as_u16(),
                });
            }
            self.capture_session_cookie(response.headers());
            let body: TokenResponse = response.json().await?;
            self.csrf_token = body.csrftoken;
        }

        let response = self.post_action("get_session_data", json!({}), None).await?;
        if !response.status().is_success() {
            return Err(ProtocolError::BootstrapFailed {
                status: response.status().as_u16(),
            });
        }
        self.capture_session_cookie(response.headers());
        let body: SessionDataResponse = response.json().await?;
        let identity = body.user_name().ok_or_else(|| ProtocolError::MalformedResponse {
            reason: "session data carries no user name".to_string(),
        })?;

        self.csrf_token = body.csrftoken;
        self.metadata = body.metadata;
        debug!(identity = %identity, classes = self.metadata.len(), "session established");
        self.identity = Some(identity);
        Ok(())
    }

    /// Retrieve up to `limit` objects of `class`, in server order.
    /// Zero matches is an empty vector, not an error.
    pub async fn query_by_class(
        &self,
        class: &str,
        limit: u64,
        offset: Option<u64>,
        sort: Option<&str>,
    ) -> Result<Vec<DomainObject>, ProtocolError> {
        let mut schema = json!({"amount": limit});
        if let Some(offset) = offset {
            schema["offset"] = offset.into();
        }
        if let Some(sort) = sort {
            schema["sort"] = sort.into();
        }
        let params = json!({"xpath": format!("//{class}"), "schema": schema});
        let response = self.post_action("retrieve_by_xpath", params, None).await?;
        objects_from("retrieve_by_xpath", response).await
    }

    /// Retrieve the object with the given guid; zero or one results.
    /// The server owns the semantics of non-numeric input.
    pub async fn query_by_id(&self, guid: &str) -> Result<Vec<DomainObject>, ProtocolError> {
        let params = json!({"ids": [guid], "schema": {}});
        let response = self.post_action("retrieve_by_ids", params, None).await?;
        objects_from("retrieve_by_ids", response).await
    }

    /// Class names visible to the current identity, in catalogue order.
    /// Pure read of the last handshake; never touches the network.
    pub fn list_classes(&self) -> Vec<String> {
        self.metadata
            .iter()
            .map(|descriptor| descriptor.object_type.clone())
            .collect()
    }

    /// Commit a single attribute change and return the server's
    /// post-commit snapshot(s). A readonly target is the server's call to
    /// accept, reject or ignore; this never errors for that reason alone.
    pub async fn update_attribute(
        &self,
        guid: &str,
        name: &str,
        value: &str,
    ) -> Result<Vec<DomainObject>, ProtocolError> {
        let params = json!({"guids": [guid]});
        let changes = json!({guid: {name: {"value": value}}});
        let response = self.post_action("commit", params, Some(changes)).await?;
        objects_from("commit", response).await
    }

    /// Fetch the file attached to `guid` into `dest_dir/<guid>_<name>`.
    ///
    /// Idempotent by filename: an existing file short-circuits without a
    /// request. The body is written to a temp file in the destination
    /// directory and persisted into place, so a failure never leaves a
    /// half-written file behind.
    pub async fn download_file(
        &self,
        guid: &str,
        suggested_name: &str,
        dest_dir: &Path,
    ) -> Result<DownloadOutcome, ProtocolError> {
        let destination = dest_dir.join(format!("{guid}_{suggested_name}"));
        if destination.exists() {
            return Ok(DownloadOutcome::AlreadyPresent { path: destination });
        }

        let url = format!("{}{}", self.base_url, FILE_PATH);
        let mut request = self
            .http
            .get(&url)
            .query(&[("guid", guid)])
            .header(COOKIE, self.cookie_header());
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Ok(DownloadOutcome::Unavailable {
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let mut temp = NamedTempFile::new_in(dest_dir)?;
        temp.write_all(&bytes)?;
        temp.persist(&destination)
            .map_err(|persist| ProtocolError::Io(persist.error))?;
        debug!(path = %destination.display(), bytes = bytes.len(), "file saved");
        Ok(DownloadOutcome::Saved { path: destination })
    }

    async fn post_action(
        &self,
        action: &str,
        params: Value,
        changes: Option<Value>,
    ) -> Result<Response, ProtocolError> {
        let url = format!("{}{}", self.base_url, XAS_PATH);
        let mut body = json!({"action": action, "params": params});
        if let Some(changes) = changes {
            body["changes"] = changes;
        }

        let mut request = self
            .http
            .post(&url)
            .header(COOKIE, self.cookie_header())
            .json(&body);
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }
        debug!(%action, "xas request");
        Ok(request.send().await?)
    }

    fn cookie_header(&self) -> String {
        match &self.session_cookie {
            Some(id) => format!("{DEVICE_COOKIES}; {SESSION_COOKIE}={id}"),
            None => DEVICE_COOKIES.to_string(),
        }
    }

    fn capture_session_cookie(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let Some(rest) = raw.strip_prefix(SESSION_COOKIE) else {
                continue;
            };
            let Some(rest) = rest.strip_prefix('=') else { continue };
            let id = rest.split(';').next().unwrap_or(rest).trim();
            if !id.is_empty() {
                self.session_cookie = Some(id.to_string());
            }
        }
    }
}

async fn objects_from(
    action: &'static str,
    response: Response,
) -> Result<Vec<DomainObject>, ProtocolError> {
    if !response.status().is_success() {
        return Err(ProtocolError::Rejected {
            action,
            status: response.status().as_u16(),
        });
    }
    let body: ObjectsResponse = response.json().await?;
    Ok(body.objects)
}

fn proxy_url(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}
