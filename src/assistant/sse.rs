//! Server-Sent Events framing.
//!
//! Turns any buffered byte source into a stream of [`SseEvent`]s. Events are
//! separated by blank lines; multiple `data:` lines are joined with `\n`.
//! `id:`, `retry:` and comment lines are ignored.

use anyhow::{Context, Result};
use futures::stream::{self, Stream};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// The event type, e.g. `thread.message.delta`.
    pub event: Option<String>,
    /// The event payload.
    pub data: String,
}

/// Parses SSE events from `reader` until EOF.
///
/// A trailing event without a terminating blank line is still emitted.
pub fn sse_events<R>(reader: R) -> impl Stream<Item = Result<SseEvent>> + Send
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    stream::try_unfold(Some(reader.lines()), |state| async move {
        let Some(mut lines) = state else {
            return Ok(None);
        };

        let mut event: Option<String> = None;
        let mut data = String::new();

        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read event stream")?
        {
            if line.is_empty() {
                if !data.is_empty() {
                    return Ok(Some((SseEvent { event, data }, Some(lines))));
                }
                event = None;
                continue;
            }

            if let Some(value) = field(&line, "event") {
                event = Some(value.to_string());
            } else if let Some(value) = field(&line, "data") {
                if !data.is_empty() {
                    data.push('\n');
                }
                data.push_str(value);
            }
        }

        if data.is_empty() {
            Ok(None)
        } else {
            Ok(Some((SseEvent { event, data }, None)))
        }
    })
}

/// Value of `name: value` (the space after the colon is optional).
fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let value = line.strip_prefix(name)?.strip_prefix(':')?;
    Some(value.strip_prefix(' ').unwrap_or(value))
}
