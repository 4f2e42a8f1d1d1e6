//! Protocol client: one authenticated conversation with the remote
//! service and the typed operations it exposes.

mod error;
mod session;
mod types;

pub use error::{DownloadOutcome, ProtocolError};
pub use session::{ProtocolSession, SessionConfig};
pub use types::{Attribute, ClassDescriptor, DomainObject};
