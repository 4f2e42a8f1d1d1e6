//! Shared test utilities.

#![allow(dead_code, unused_imports)]

pub mod mock_service;

pub use mock_service::{object, CapturedRequest, MockResponse, MockService};

use xasplore::config::CredentialSet;
use xasplore::protocol::{ProtocolSession, SessionConfig};

/// A session pointed at the mock service, not yet logged in.
pub fn session_for(service: &MockService) -> ProtocolSession {
    ProtocolSession::new(SessionConfig {
        base_url: service.base_url(),
        proxy: None,
        verify_tls: true,
    })
    .expect("failed to build session")
}

pub fn credentials(entries: &[(&str, &str)]) -> CredentialSet {
    let content: String = entries
        .iter()
        .map(|(username, password)| format!("{username}:{password}\n"))
        .collect();
    CredentialSet::parse(&content)
}

/// Enqueue the two responses of a successful credential login.
pub async fn enqueue_login(service: &MockService, token: &str, user: &str, classes: &[&str]) {
    service
        .enqueue(MockResponse::login_ok(token, &format!("sid-{user}")))
        .await;
    service
        .enqueue(MockResponse::session_data(token, user, classes))
        .await;
}

/// Enqueue the single handshake response of an anonymous login.
pub async fn enqueue_anonymous(service: &MockService, token: &str, classes: &[&str]) {
    service
        .enqueue(MockResponse::session_data(token, "Anonymous_1a2b", classes))
        .await;
}
