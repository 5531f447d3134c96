pub mod client;
pub mod sendgrid;
mod error;

use serde::{Deserialize, Serialize};

pub use client::{Client, ClientFactory, ClientFuture};
pub use error::Error;

/// Account credentials for a delivery provider. Accepted as-is, never stored.
#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub api_user: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(api_user: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_user: api_user.into(),
            api_key: api_key.into(),
        }
    }
}

// Keep the key out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_user", &self.api_user)
            .field("api_key", &"***")
            .finish()
    }
}

/// Provider response payload on success, kept verbatim.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SendResult(pub serde_json::Value);

impl SendResult {
    /// Human-readable status message, e.g. `"success"`.
    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(|m| m.as_str())
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}
