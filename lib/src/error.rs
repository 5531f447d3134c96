use serde_json::{json, Value};
use thiserror::Error;

use crate::delivery;
use crate::email::InputError;

/// Library errors. `Input` and `Delivery` are what the `error` exit carries;
/// `Config` only comes out of [`crate::config::load_config`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("Input: {0}")]
    Input(#[from] InputError),
    #[error("Delivery: {0}")]
    Delivery(#[from] delivery::Error),
    #[error("Config: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Exit payload. Delivery errors are passed through as-is.
    pub fn to_json(&self) -> Value {
        match self {
            Error::Input(e) => json!({
                "message": self.to_string(),
                "input": e,
            }),
            Error::Delivery(e) => json!({
                "message": self.to_string(),
                "delivery": e,
            }),
            Error::Config(_) => json!({ "message": self.to_string() }),
        }
    }
}
