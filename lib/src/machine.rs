//! The "Send email" machine: a declarative input/exit definition plus the
//! operation that runs it.

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::ProviderConfig;
use crate::delivery::{Client, ClientFactory, SendResult};
use crate::email::Inputs;
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    String,
    StringOrList,
}

#[derive(Debug, Serialize)]
pub struct InputDef {
    pub name: &'static str,
    pub description: &'static str,
    pub example: &'static str,
    pub required: bool,
    pub kind: InputKind,
}

#[derive(Debug, Serialize)]
pub struct ExitDef {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    pub friendly_name: &'static str,
    pub description: &'static str,
    pub inputs: &'static [InputDef],
    pub default_exit: &'static str,
    pub exits: &'static [ExitDef],
}

pub const SUCCESS_EXIT: &str = "success";
pub const ERROR_EXIT: &str = "error";

const fn input(
    name: &'static str,
    description: &'static str,
    example: &'static str,
    required: bool,
    kind: InputKind,
) -> InputDef {
    InputDef {
        name,
        description,
        example,
        required,
        kind,
    }
}

pub static SEND_EMAIL: Definition = Definition {
    friendly_name: "Send email",
    description: "Send an email",
    inputs: &[
        input(
            "apiUser",
            "The API user of the SendGrid account to use.",
            "someuser",
            true,
            InputKind::String,
        ),
        input(
            "apiKey",
            "The API key of the SendGrid account to use.",
            "whateverkey",
            true,
            InputKind::String,
        ),
        input(
            "toEmail",
            "Recipient address. Pass a list to send to several recipients; every recipient is visible in the message.",
            "jane@example.com",
            true,
            InputKind::StringOrList,
        ),
        input(
            "toName",
            "Recipient display name. When toEmail is a list, a list of the same length, paired by position.",
            "Jane Doe",
            false,
            InputKind::StringOrList,
        ),
        input(
            "subject",
            "Subject line for the email.",
            "Welcome, Jane!",
            true,
            InputKind::String,
        ),
        input(
            "textMessage",
            "The plain text body of the email.",
            "Jane,\nThanks for joining our community.\n\nSincerely,\nThe Management",
            true,
            InputKind::String,
        ),
        input(
            "htmlMessage",
            "The HTML body of the email.",
            "<p>Jane,<br>Thanks for joining our community.</p>",
            false,
            InputKind::String,
        ),
        input(
            "fromEmail",
            "Sender address, from your domain. This is where the email appears to originate from.",
            "harold@example.enterprise",
            true,
            InputKind::String,
        ),
        input(
            "fromName",
            "Name shown next to the sender address, e.g. your name or company name.",
            "Harold Greaseworthy",
            false,
            InputKind::String,
        ),
        input(
            "replyTo",
            "Address used when replying to the email.",
            "support@example.com",
            false,
            InputKind::String,
        ),
    ],
    default_exit: SUCCESS_EXIT,
    exits: &[
        ExitDef {
            name: ERROR_EXIT,
            description: "Unexpected error occurred.",
            example: None,
        },
        ExitDef {
            name: SUCCESS_EXIT,
            description: "Returns a JSON object with the result",
            example: Some(r#"{"message":"success"}"#),
        },
    ],
};

/// Outcome of one invocation. Exactly one is produced per run.
#[derive(Debug)]
pub enum Exit {
    Success(SendResult),
    Error(Error),
}

impl Exit {
    pub fn name(&self) -> &'static str {
        match self {
            Exit::Success(_) => SUCCESS_EXIT,
            Exit::Error(_) => ERROR_EXIT,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Exit::Success(_))
    }

    /// `{"exit": <name>, "output": <payload>}`
    pub fn to_json(&self) -> Value {
        let output = match self {
            Exit::Success(result) => result.0.clone(),
            Exit::Error(err) => err.to_json(),
        };

        json!({ "exit": self.name(), "output": output })
    }
}

impl From<Result<SendResult, Error>> for Exit {
    fn from(result: Result<SendResult, Error>) -> Self {
        match result {
            Ok(r) => Exit::Success(r),
            Err(e) => Exit::Error(e),
        }
    }
}

/// Runs the "Send email" machine against a provider.
pub struct SendEmail<F> {
    factory: F,
    forward_reply_to: bool,
}

impl<F: ClientFactory> SendEmail<F> {
    pub fn new(factory: F, config: &ProviderConfig) -> Self {
        Self {
            factory,
            forward_reply_to: config.forward_reply_to,
        }
    }

    pub fn definition(&self) -> &'static Definition {
        &SEND_EMAIL
    }

    /// Validate `params`, then issue exactly one provider request.
    ///
    /// Invalid parameters take the error exit before any client is built.
    /// Provider failures are passed through untouched; nothing is retried.
    pub async fn run(&self, params: &Value) -> Exit {
        self.try_run(params).await.into()
    }

    async fn try_run(&self, params: &Value) -> Result<SendResult, Error> {
        let inputs = Inputs::from_params(params, SEND_EMAIL.inputs).map_err(|e| {
            log::error!("Rejected send parameters: {}", e);
            e
        })?;

        let (credentials, message) = inputs.into_message(self.forward_reply_to);

        log::info!("Sending email to {} recipient(s)", message.to.len());

        let client = self.factory.build(credentials).map_err(|e| {
            log::error!("Could not build provider client: {}", e);
            e
        })?;

        match client.send(&message).await {
            Ok(result) => {
                log::debug!("Send succeeded: {}", result.0);
                Ok(result)
            }
            Err(e) => {
                log::error!("Send failed: {}", e);
                Err(e.into())
            }
        }
    }
}
