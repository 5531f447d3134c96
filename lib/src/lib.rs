//! Send one email through the SendGrid Web API.
//!
//! [`machine::SendEmail`] validates a JSON parameter bag against
//! [`machine::SEND_EMAIL`], hands the message to a provider client and
//! reports exactly one [`machine::Exit`].

pub mod config;
pub mod delivery;
pub mod email;
pub mod machine;
mod error;

pub use error::Error;
pub use machine::{Exit, SendEmail};
