use serde::Deserialize;

use crate::delivery::sendgrid::api::SENDGRID_BASE_API;
use crate::Error;

pub const DEFAULT_PATH: &str = "/etc/sendgrid-email/sendgrid-email.toml";
const ENV_PREFIX: &str = "SENDGRID_EMAIL";

/// Settings for the delivery provider.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Root of the provider's Web API
    pub base_url: String,

    /// Per-request timeout, in seconds. No timeout when unset.
    pub timeout_secs: Option<u64>,

    /// Attach `replyTo` to outgoing requests. Off by default: the input is
    /// accepted but not sent.
    pub forward_reply_to: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: SENDGRID_BASE_API.to_string(),
            timeout_secs: None,
            forward_reply_to: false,
        }
    }
}

/// Loads provider config from filesystem and merges it with any
/// environment variables prefixed with SENDGRID_EMAIL_.
///
/// The file is optional; missing keys fall back to defaults.
pub fn load_config(path: Option<&str>) -> Result<ProviderConfig, Error> {
    let file = config::File::with_name(path.unwrap_or(DEFAULT_PATH)).required(path.is_some());

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;

    Ok(settings.try_deserialize()?)
}
