//! Wire types for the XAS JSON envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One business record retrieved from the remote store.
///
/// Instances are only ever produced by deserializing server responses; a
/// commit yields a fresh snapshot rather than mutating one in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainObject {
    #[serde(rename = "objectType")]
    pub object_type: String,
    /// Server-assigned stable identifier, a string of digits.
    pub guid: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
}

impl DomainObject {
    /// String form of an attribute's value, if the attribute exists.
    pub fn attribute_text(&self, name: &str) -> Option<String> {
        self.attributes.get(name).map(|attribute| match &attribute.value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}

/// A single attribute slot on a [`DomainObject`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub value: Value,
    /// Commits targeting a readonly attribute are expected to be rejected
    /// or ignored by the server; the client preserves the flag for display
    /// and never blocks the attempt locally.
    #[serde(default)]
    pub readonly: bool,
}

/// One entry of the class catalogue delivered by the session handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassDescriptor {
    #[serde(rename = "objectType")]
    pub object_type: String,
}

/// Body of a `login` response. Only the token matters to the client.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub csrftoken: Option<String>,
}

/// Body of a `get_session_data` response.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionDataResponse {
    pub csrftoken: Option<String>,
    /// The authenticated principal, kept loosely typed; only the display
    /// name is extracted.
    pub user: Option<Value>,
    #[serde(default)]
    pub metadata: Vec<ClassDescriptor>,
}

impl SessionDataResponse {
    /// Canonical display name of the authenticated principal.
    pub fn user_name(&self) -> Option<String> {
        self.user
            .as_ref()?
            .get("attributes")?
            .get("Name")?
            .get("value")?
            .as_str()
            .map(str::to_string)
    }
}

/// Body shared by all object-bearing responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ObjectsResponse {
    #[serde(default)]
    pub objects: Vec<DomainObject>,
}
