//! Server-push text framing for registry events.
//!
//! Each event is written as `event:`, `id:` and `data:` lines followed by a
//! blank line. Readers accumulate consecutive `data:` lines, joined with a
//! newline, until the blank line that terminates the record.

use super::{EventType, ParseEventTypeError, ServiceTargetEvent};
use thiserror::Error;

/// Errors raised while reading framed events.
#[derive(Debug, Error)]
pub enum SseParseError {
    /// The `event:` field named an unknown event type.
    #[error(transparent)]
    UnknownEvent(#[from] ParseEventTypeError),

    /// A record ended without a required field.
    #[error("event record is missing the '{0}' field")]
    MissingField(&'static str),

    /// The accumulated `data:` payload is not valid JSON.
    #[error("event data is not valid JSON: {0}")]
    InvalidData(#[from] serde_json::Error),
}

/// Renders one event in server-push framing, including the terminating blank
/// line.
#[must_use]
pub fn encode(event: &ServiceTargetEvent) -> String {
    let data = event.data().to_string();
    let mut lines = vec![
        format!("event: {}", event.event()),
        format!("id: {}", event.id()),
    ];
    lines.extend(data.lines().map(|line| format!("data: {line}")));
    let mut frame = lines.join("\n");
    frame.push_str("\n\n");
    frame
}

/// Reads every complete record from `text`.
///
/// Comment lines (starting with `:`) and unknown fields are skipped. A
/// trailing record without its terminating blank line is still returned.
///
/// # Errors
///
/// Returns [`SseParseError`] when a record lacks `event:` or `data:`, names an
/// unknown event type, or carries a non-JSON payload.
pub fn parse(text: &str) -> Result<Vec<ServiceTargetEvent>, SseParseError> {
    let mut events = Vec::new();
    let mut pending = PendingRecord::default();

    for line in text.lines() {
        if line.is_empty() {
            if let Some(event) = pending.take()? {
                events.push(event);
            }
            continue;
        }
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = split_field(line);
        match field {
            "event" => pending.event = Some(value.to_owned()),
            "id" => pending.id = Some(value.to_owned()),
            "data" => pending.data.push(value.to_owned()),
            _ => {}
        }
    }

    if let Some(event) = pending.take()? {
        events.push(event);
    }
    Ok(events)
}

fn split_field(line: &str) -> (&str, &str) {
    line.split_once(':').map_or((line, ""), |(field, value)| {
        (field, value.strip_prefix(' ').unwrap_or(value))
    })
}

#[derive(Default)]
struct PendingRecord {
    event: Option<String>,
    id: Option<String>,
    data: Vec<String>,
}

impl PendingRecord {
    fn take(&mut self) -> Result<Option<ServiceTargetEvent>, SseParseError> {
        let record = std::mem::take(self);
        if record.event.is_none() && record.id.is_none() && record.data.is_empty() {
            return Ok(None);
        }
        let event_name = record.event.ok_or(SseParseError::MissingField("event"))?;
        if record.data.is_empty() {
            return Err(SseParseError::MissingField("data"));
        }
        let event_type = EventType::try_from(event_name.as_str())?;
        let data = serde_json::from_str(&record.data.join("\n"))?;
        Ok(Some(ServiceTargetEvent::new(
            event_type,
            record.id.unwrap_or_default(),
            data,
        )))
    }
}
