use serde_json::Value;

use crate::delivery::{Credentials, Error, SendResult};
use crate::email::{Message, Recipients};

pub const SENDGRID_BASE_API: &str = "https://api.sendgrid.com/";

const SUCCESS_MESSAGE: &str = "success";

pub enum Endpoint {
    MailSend,
}

/// Build the endpoint URL on top of `base`. `base` is expected to end with `/`.
#[inline]
pub fn build_endpoint_url(base: &url::Url, endpoint: Endpoint) -> Result<url::Url, Error> {
    match endpoint {
        Endpoint::MailSend => Ok(base.join("api/mail.send.json")?),
    }
}

/// Form fields for `mail.send.json`, in request order.
///
/// Lists are sent with a `[]` suffix (`to[]=a&to[]=b`). Optional fields
/// are only included when set on the message.
pub fn form_fields<'a>(credentials: &'a Credentials, message: &'a Message) -> Vec<(&'static str, &'a str)> {
    let mut fields = vec![
        ("api_user", credentials.api_user.as_str()),
        ("api_key", credentials.api_key.as_str()),
    ];

    push_recipients(&mut fields, "to", "to[]", &message.to);
    if let Some(ref to_name) = message.to_name {
        push_recipients(&mut fields, "toname", "toname[]", to_name);
    }

    fields.push(("subject", message.subject.as_str()));
    fields.push(("text", message.text.as_str()));

    if let Some(ref html) = message.html {
        fields.push(("html", html.as_str()));
    }
    if let Some(ref from) = message.from {
        fields.push(("from", from.as_str()));
    }
    if let Some(ref from_name) = message.from_name {
        fields.push(("fromname", from_name.as_str()));
    }
    if let Some(ref reply_to) = message.reply_to {
        fields.push(("replyto", reply_to.as_str()));
    }

    fields
}

fn push_recipients<'a>(
    fields: &mut Vec<(&'static str, &'a str)>,
    single: &'static str,
    list: &'static str,
    recipients: &'a Recipients,
) {
    let key = if recipients.is_many() { list } else { single };
    for r in recipients.as_slice() {
        fields.push((key, r.as_str()));
    }
}

/// Map a raw provider response onto a send result.
///
/// Anything other than a 2xx status with `"message": "success"` is a
/// rejection. The body is kept verbatim either way.
pub fn map_response(status: u16, body: &[u8]) -> Result<SendResult, Error> {
    let parsed = serde_json::from_slice::<Value>(body);

    let is_success_status = (200..300).contains(&status);

    let json = match parsed {
        Ok(json) => json,
        Err(e) if is_success_status => return Err(e.into()),
        Err(_) => {
            return Err(Error::Rejected {
                status,
                errors: vec![],
                body: Value::String(String::from_utf8_lossy(body).into_owned()),
            })
        }
    };

    let message = json.get("message").and_then(|m| m.as_str());

    if is_success_status && message == Some(SUCCESS_MESSAGE) {
        Ok(SendResult(json))
    } else {
        Err(Error::Rejected {
            status,
            errors: extract_errors(&json),
            body: json,
        })
    }
}

fn extract_errors(json: &Value) -> Vec<String> {
    json.get("errors")
        .and_then(|e| e.as_array())
        .map(|errors| {
            errors
                .iter()
                .map(|e| match e.as_str() {
                    Some(s) => s.to_string(),
                    None => e.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
