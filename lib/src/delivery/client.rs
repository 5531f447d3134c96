use futures::future::BoxFuture;

use crate::delivery::{Credentials, Error, SendResult};
use crate::email::Message;

// Definition of future types for async use
pub type ClientFuture<'a, T> = BoxFuture<'a, Result<T, Error>>;

/// A provider client bound to one set of account credentials.
///
/// `send` issues exactly one request and resolves exactly once.
pub trait Client {
    fn send<'a>(&'a self, message: &'a Message) -> ClientFuture<'a, SendResult>;
}

/// Builds provider clients from per-invocation credentials.
pub trait ClientFactory {
    type Client: Client + Send + Sync;

    fn build(&self, credentials: Credentials) -> Result<Self::Client, Error>;
}
