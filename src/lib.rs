//! Interactive exploration client for an XAS data-access endpoint.
//!
//! One authenticated conversation ([`protocol::ProtocolSession`]) carries
//! the CSRF token, session cookie and class catalogue; a line-oriented
//! dispatcher ([`repl::Dispatcher`]) classifies interactive input into
//! typed commands and executes them against that session.

pub mod config;
pub mod protocol;
pub mod render;
pub mod repl;
