use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mail_parser::{MessageParser, PartType};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Email {
    pub subject: String,
    pub text: String,
    pub html: String,
    pub date: DateTime<Utc>,
}

/// Decode one raw RFC 5322 message.
///
/// Text and HTML bodies are taken only from parts of that type; a text-only
/// message yields an empty `html` and vice versa. A missing or unparseable
/// `Date` header becomes the Unix epoch; only a message the parser rejects
/// is an error.
pub fn decode(raw: &[u8]) -> Result<Email> {
    let message = MessageParser::default()
        .parse(raw)
        .context("Unable to parse email")?;

    let subject = message.subject().unwrap_or_default().to_string();

    let text = message
        .text_bodies()
        .filter_map(|part| match &part.body {
            PartType::Text(t) => Some(t.as_ref()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .concat();

    let html = message
        .html_bodies()
        .filter_map(|part| match &part.body {
            PartType::Html(h) => Some(h.as_ref()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .concat();

    let date = message
        .date()
        .and_then(|d| DateTime::from_timestamp(d.to_timestamp(), 0))
        .unwrap_or_else(|| {
            warn!(subject = %subject, "Missing or unparseable Date header, using epoch");
            DateTime::UNIX_EPOCH
        });

    Ok(Email {
        subject,
        text,
        html,
        date,
    })
}
