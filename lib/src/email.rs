use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::delivery::Credentials;
use crate::machine::{InputDef, InputKind};

/// One recipient address (or display name), or an ordered list of them.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Recipients::One(s) => std::slice::from_ref(s),
            Recipients::Many(v) => v.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Recipients::Many(_))
    }
}

impl From<&str> for Recipients {
    fn from(s: &str) -> Self {
        Recipients::One(s.to_string())
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(v: Vec<&str>) -> Self {
        Recipients::Many(v.into_iter().map(String::from).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Error, Serialize)]
pub enum InputError {
    #[error("parameters must be a JSON object")]
    NotAnObject,
    #[error("missing required input `{field}`")]
    Missing { field: &'static str },
    #[error("input `{field}` must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("`toEmail` must contain at least one address")]
    EmptyRecipients,
    #[error("`toName` has {names} entries but `toEmail` has {emails}")]
    RecipientNamesMismatch { emails: usize, names: usize },
    #[error("malformed parameters: {0}")]
    Malformed(String),
}

/// Validated parameter bag for a single send.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inputs {
    pub api_user: String,
    pub api_key: String,
    pub to_email: Recipients,
    pub to_name: Option<Recipients>,
    pub subject: String,
    pub text_message: String,
    pub html_message: Option<String>,
    pub from_email: String,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
}

impl Inputs {
    /// Check `params` against the input definitions, then convert.
    ///
    /// Required inputs must be present and non-null, and every supplied
    /// input must match its declared kind.
    pub fn from_params(params: &serde_json::Value, defs: &[InputDef]) -> Result<Self, InputError> {
        let map = params.as_object().ok_or(InputError::NotAnObject)?;

        for def in defs {
            match map.get(def.name) {
                None | Some(serde_json::Value::Null) => {
                    if def.required {
                        return Err(InputError::Missing { field: def.name });
                    }
                }
                Some(value) => {
                    if !def.kind.accepts(value) {
                        return Err(InputError::InvalidType {
                            field: def.name,
                            expected: def.kind.expected(),
                        });
                    }
                }
            }
        }

        let inputs: Inputs = serde_json::from_value(params.clone())
            .map_err(|e| InputError::Malformed(e.to_string()))?;

        inputs.check_recipients()?;

        Ok(inputs)
    }

    fn check_recipients(&self) -> Result<(), InputError> {
        if self.to_email.is_empty() {
            return Err(InputError::EmptyRecipients);
        }

        if let Some(names) = self.to_name.as_ref().filter(|n| !is_blank(n)) {
            if names.len() != self.to_email.len() {
                return Err(InputError::RecipientNamesMismatch {
                    emails: self.to_email.len(),
                    names: names.len(),
                });
            }
        }

        Ok(())
    }

    /// Split into the account credentials and the outgoing message.
    ///
    /// Optional inputs are only attached when non-empty. `replyTo` is only
    /// attached when `forward_reply_to` is set.
    pub fn into_message(self, forward_reply_to: bool) -> (Credentials, Message) {
        let credentials = Credentials::new(self.api_user, self.api_key);
        let mut message = Message::new(self.to_email, self.subject, self.text_message);

        if let Some(to_name) = self.to_name.filter(|n| !is_blank(n)) {
            message = message.with_to_name(to_name);
        }
        if !self.from_email.is_empty() {
            message = message.with_from(self.from_email);
        }
        if let Some(from_name) = non_empty(self.from_name) {
            message = message.with_from_name(from_name);
        }
        if let Some(html) = non_empty(self.html_message) {
            message = message.with_html(html);
        }
        if let Some(reply_to) = non_empty(self.reply_to) {
            if forward_reply_to {
                message = message.with_reply_to(reply_to);
            } else {
                log::warn!("replyTo is set but not forwarded to the provider");
            }
        }

        (credentials, message)
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

// A lone empty string counts as "not supplied"; an empty list does not
fn is_blank(r: &Recipients) -> bool {
    matches!(r, Recipients::One(s) if s.is_empty())
}

/// Provider-neutral outgoing message.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub to: Recipients,
    pub to_name: Option<Recipients>,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub from: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
}

impl Message {
    pub fn new(to: Recipients, subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to,
            to_name: None,
            subject: subject.into(),
            text: text.into(),
            html: None,
            from: None,
            from_name: None,
            reply_to: None,
        }
    }

    pub fn with_to_name(mut self, to_name: Recipients) -> Self {
        self.to_name = Some(to_name);
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_from_name(mut self, from_name: impl Into<String>) -> Self {
        self.from_name = Some(from_name.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

impl InputKind {
    fn accepts(&self, value: &serde_json::Value) -> bool {
        match self {
            InputKind::String => value.is_string(),
            InputKind::StringOrList => match value {
                serde_json::Value::String(_) => true,
                serde_json::Value::Array(items) => items.iter().all(|i| i.is_string()),
                _ => false,
            },
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            InputKind::String => "a string",
            InputKind::StringOrList => "a string or a list of strings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::SEND_EMAIL;
    use serde_json::json;

    fn base_params() -> serde_json::Value {
        json!({
            "apiUser": "u",
            "apiKey": "k",
            "toEmail": "jane@example.com",
            "subject": "Welcome, Jane!",
            "textMessage": "Hi Jane",
            "fromEmail": "harold@example.enterprise",
        })
    }

    fn parse(params: &serde_json::Value) -> Result<Inputs, InputError> {
        Inputs::from_params(params, SEND_EMAIL.inputs)
    }

    #[test]
    fn test_minimal_inputs() {
        let inputs = parse(&base_params()).unwrap();

        assert_eq!(inputs.api_user, "u");
        assert_eq!(inputs.to_email, Recipients::One("jane@example.com".to_string()));
        assert!(inputs.to_name.is_none());
        assert!(inputs.html_message.is_none());
    }

    #[test]
    fn test_each_required_input_is_enforced() {
        let required = [
            "apiUser",
            "apiKey",
            "toEmail",
            "subject",
            "textMessage",
            "fromEmail",
        ];

        for field in required.iter().copied() {
            let mut params = base_params();
            params.as_object_mut().unwrap().remove(field);

            assert_eq!(parse(&params).unwrap_err(), InputError::Missing { field });

            let mut params = base_params();
            params[field] = serde_json::Value::Null;

            assert_eq!(parse(&params).unwrap_err(), InputError::Missing { field });
        }
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        let mut params = base_params();
        params["subject"] = json!(42);
        assert_eq!(
            parse(&params).unwrap_err(),
            InputError::InvalidType {
                field: "subject",
                expected: "a string"
            }
        );

        let mut params = base_params();
        params["toEmail"] = json!(["a@example.com", 7]);
        assert!(matches!(
            parse(&params).unwrap_err(),
            InputError::InvalidType { field: "toEmail", .. }
        ));

        let mut params = base_params();
        params["replyTo"] = json!(true);
        assert!(matches!(
            parse(&params).unwrap_err(),
            InputError::InvalidType { field: "replyTo", .. }
        ));
    }

    #[test]
    fn test_params_must_be_object() {
        assert_eq!(parse(&json!(["u", "k"])).unwrap_err(), InputError::NotAnObject);
    }

    #[test]
    fn test_recipient_list() {
        let mut params = base_params();
        params["toEmail"] = json!(["a@example.com", "b@example.com"]);
        params["toName"] = json!(["A", "B"]);

        let inputs = parse(&params).unwrap();

        assert_eq!(inputs.to_email.len(), 2);
        assert!(inputs.to_email.is_many());
        assert_eq!(inputs.to_name.unwrap().as_slice(), &["A", "B"]);
    }

    #[test]
    fn test_empty_recipient_list() {
        let mut params = base_params();
        params["toEmail"] = json!([]);

        assert_eq!(parse(&params).unwrap_err(), InputError::EmptyRecipients);
    }

    #[test]
    fn test_recipient_names_must_pair_up() {
        let mut params = base_params();
        params["toEmail"] = json!(["a@example.com", "b@example.com"]);
        params["toName"] = json!(["A"]);

        assert_eq!(
            parse(&params).unwrap_err(),
            InputError::RecipientNamesMismatch { emails: 2, names: 1 }
        );

        let mut params = base_params();
        params["toName"] = json!(["Jane", "Doe"]);

        assert_eq!(
            parse(&params).unwrap_err(),
            InputError::RecipientNamesMismatch { emails: 1, names: 2 }
        );
    }

    #[test]
    fn test_single_name_for_single_recipient() {
        let mut params = base_params();
        params["toName"] = json!("Jane Doe");

        assert!(parse(&params).is_ok());
    }

    #[test]
    fn test_into_message_minimal() {
        let (creds, message) = parse(&base_params()).unwrap().into_message(false);

        assert_eq!(creds.api_user, "u");
        assert_eq!(creds.api_key, "k");
        assert_eq!(
            message,
            Message::new("jane@example.com".into(), "Welcome, Jane!", "Hi Jane")
                .with_from("harold@example.enterprise")
        );
    }

    #[test]
    fn test_into_message_attaches_optional_inputs() {
        let mut params = base_params();
        params["toName"] = json!("Jane Doe");
        params["htmlMessage"] = json!("<p>Hi Jane</p>");
        params["fromName"] = json!("Harold Greaseworthy");

        let (_, message) = parse(&params).unwrap().into_message(false);

        assert_eq!(message.to_name, Some(Recipients::One("Jane Doe".to_string())));
        assert_eq!(message.html.as_deref(), Some("<p>Hi Jane</p>"));
        assert_eq!(message.from_name.as_deref(), Some("Harold Greaseworthy"));
    }

    #[test]
    fn test_into_message_skips_empty_optional_inputs() {
        let mut params = base_params();
        params["toName"] = json!("");
        params["htmlMessage"] = json!("");
        params["fromName"] = json!("");

        let (_, message) = parse(&params).unwrap().into_message(false);

        assert!(message.to_name.is_none());
        assert!(message.html.is_none());
        assert!(message.from_name.is_none());
    }

    #[test]
    fn test_reply_to_is_dropped_unless_forwarded() {
        let mut params = base_params();
        params["replyTo"] = json!("support@example.com");

        let (_, message) = parse(&params).unwrap().into_message(false);
        assert!(message.reply_to.is_none());

        let (_, message) = parse(&params).unwrap().into_message(true);
        assert_eq!(message.reply_to.as_deref(), Some("support@example.com"));
    }
}
