//! SendGrid Web API v2 (`mail.send.json`), authenticated with an API user
//! and key.

pub mod api;
mod client;

pub use client::{SendGridClient, SendGridFactory};
