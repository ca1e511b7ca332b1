use serde::{Deserialize, Serialize};
use std::fmt;

use crate::buffer_utils::Frame;

const EVENT_PREFIX: &str = "event:";
const DATA_PREFIX: &str = "data:";

/// Classification of a frame by its `event:` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Answer,
    Progress,
    Debug,
    /// Anything without a recognized `event:` value
    #[default]
    Message,
}

impl EventKind {
    /// Map an event tag to its kind. Matching is exact and case-sensitive.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "answer" => EventKind::Answer,
            "progress" => EventKind::Progress,
            "debug" => EventKind::Debug,
            _ => EventKind::Message,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Answer => "answer",
            EventKind::Progress => "progress",
            EventKind::Debug => "debug",
            EventKind::Message => "message",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A frame parsed into its kind and reassembled payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEvent {
    pub kind: EventKind,
    pub payload: String,
}

impl ParsedEvent {
    pub fn new(kind: EventKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Parse one frame
    ///
    /// `event:` sets the kind from its trimmed value (last one wins).
    /// Each `data:` line adds one payload line with at most one leading
    /// space removed; nothing else is trimmed. Payload lines are joined
    /// with `\n`. Other lines are ignored.
    pub fn from_frame(frame: &Frame) -> Self {
        let mut kind = EventKind::Message;
        let mut data_lines: Vec<&str> = Vec::new();

        for line in frame.as_str().split('\n') {
            if let Some(tag) = line.strip_prefix(EVENT_PREFIX) {
                kind = EventKind::from_tag(tag.trim());
            } else if let Some(raw) = line.strip_prefix(DATA_PREFIX) {
                data_lines.push(raw.strip_prefix(' ').unwrap_or(raw));
            }
        }

        Self {
            kind,
            payload: data_lines.join("\n"),
        }
    }

    /// Frames without payload text are never dispatched
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedEvent {
        ParsedEvent::from_frame(&Frame::new(text))
    }

    #[test]
    fn test_answer_frame() {
        let event = parse("event:answer\ndata:hello");
        assert_eq!(event, ParsedEvent::new(EventKind::Answer, "hello"));
    }

    #[test]
    fn test_single_space_stripped() {
        let event = parse("event:answer\ndata: \thello");
        assert_eq!(event.payload, "\thello");
    }

    #[test]
    fn test_extra_whitespace_preserved() {
        let event = parse("event: answer \ndata:   two spaces left  ");
        assert_eq!(event.kind, EventKind::Answer);
        assert_eq!(event.payload, "  two spaces left  ");
    }

    #[test]
    fn test_multiline_payload() {
        let event = parse("event:progress\ndata:foo\ndata:bar");
        assert_eq!(event.kind, EventKind::Progress);
        assert_eq!(event.payload, "foo\nbar");
    }

    #[test]
    fn test_default_kind_is_message() {
        let event = parse("data:hi");
        assert_eq!(event.kind, EventKind::Message);
        assert_eq!(event.payload, "hi");
    }

    #[test]
    fn test_unknown_and_case_mismatch_are_message() {
        assert_eq!(parse("event:done\ndata:x").kind, EventKind::Message);
        assert_eq!(parse("event:Answer\ndata:x").kind, EventKind::Message);
    }

    #[test]
    fn test_last_event_line_wins() {
        let event = parse("event:progress\nevent:debug\ndata:x");
        assert_eq!(event.kind, EventKind::Debug);
    }

    #[test]
    fn test_unrecognized_lines_ignored() {
        let event = parse(": keep-alive\nid: 7\nevent:answer\nretry: 100\ndata:ok");
        assert_eq!(event, ParsedEvent::new(EventKind::Answer, "ok"));
    }

    #[test]
    fn test_no_data_line_is_empty() {
        let event = parse("event:answer");
        assert!(event.is_empty());
    }

    #[test]
    fn test_empty_data_lines_join() {
        let event = parse("event:answer\ndata:\ndata:");
        assert_eq!(event.payload, "\n");
        assert!(!event.is_empty());
    }

    #[test]
    fn test_event_kind_serialization() {
        let json = serde_json::to_string(&ParsedEvent::new(EventKind::Debug, "x")).unwrap();
        assert_eq!(json, r#"{"kind":"debug","payload":"x"}"#);
    }
}
