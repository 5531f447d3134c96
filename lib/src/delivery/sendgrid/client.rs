use std::time::Duration;

use super::api;

use crate::config::ProviderConfig;
use crate::delivery::client::{Client, ClientFactory, ClientFuture};
use crate::delivery::{Credentials, Error, SendResult};
use crate::email::Message;

/// Builds [`SendGridClient`]s that share one HTTP connection pool.
#[derive(Clone, Debug)]
pub struct SendGridFactory {
    base_url: url::Url,
    client: reqwest::Client,
}

impl SendGridFactory {
    pub fn new(config: &ProviderConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url: parse_base_url(&config.base_url)?,
            client: builder.build()?,
        })
    }
}

impl ClientFactory for SendGridFactory {
    type Client = SendGridClient;

    fn build(&self, credentials: Credentials) -> Result<SendGridClient, Error> {
        Ok(SendGridClient {
            credentials,
            endpoint: api::build_endpoint_url(&self.base_url, api::Endpoint::MailSend)?,
            client: self.client.clone(),
        })
    }
}

// `Url::join` drops the last path segment unless the base ends with a slash
fn parse_base_url(base: &str) -> Result<url::Url, Error> {
    if base.ends_with('/') {
        Ok(url::Url::parse(base)?)
    } else {
        Ok(url::Url::parse(&format!("{}/", base))?)
    }
}

/// SendGrid Web API client for a single account.
#[derive(Debug)]
pub struct SendGridClient {
    credentials: Credentials,
    endpoint: url::Url,
    client: reqwest::Client,
}

impl SendGridClient {
    /// Standalone client against the public SendGrid API.
    pub fn from_credentials(credentials: Credentials) -> Result<Self, Error> {
        SendGridFactory::new(&ProviderConfig::default())?.build(credentials)
    }

    async fn post(&self, message: &Message) -> Result<SendResult, Error> {
        let fields = api::form_fields(&self.credentials, message);

        let resp = self
            .client
            .post(self.endpoint.clone())
            .form(&fields)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await?;

        api::map_response(status, &body)
    }
}

impl Client for SendGridClient {
    fn send<'a>(&'a self, message: &'a Message) -> ClientFuture<'a, SendResult> {
        Box::pin(self.post(message))
    }
}
