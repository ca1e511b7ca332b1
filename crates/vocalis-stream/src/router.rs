// Event routing: frames in, typed sink calls and the accumulated answer out

use crate::buffer_utils::{Frame, FrameDecoder};
use crate::error::Result;
use crate::streaming::{EventKind, ParsedEvent};
use crate::traits::{ChunkSource, EventSink};

/// Prefix that marks debug text forwarded to the progress sink
pub const DEBUG_MARKER: &str = "[DEBUG] ";

/// Routes parsed events to sinks and accumulates answer payloads
///
/// One router serves one stream. It is never shared between invocations.
#[derive(Debug, Default)]
pub struct EventRouter {
    result: String,
    routed: usize,
    dispatched: usize,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a complete frame into an event
    pub fn route(&mut self, frame: &Frame) -> ParsedEvent {
        self.routed += 1;
        ParsedEvent::from_frame(frame)
    }

    /// Deliver one event
    ///
    /// Empty payloads are dropped. Answers are accumulated and forwarded
    /// as deltas, progress goes out unchanged, debug goes to the progress
    /// sink behind [`DEBUG_MARKER`]. `Message` events are swallowed.
    pub fn dispatch<S>(&mut self, event: ParsedEvent, sinks: &mut S)
    where
        S: EventSink + ?Sized,
    {
        if event.is_empty() {
            tracing::trace!(kind = %event.kind, "Dropping frame without payload");
            return;
        }

        match event.kind {
            EventKind::Answer => {
                self.result.push_str(&event.payload);
                sinks.on_answer(&event.payload);
            }
            EventKind::Progress => sinks.on_progress(&event.payload),
            EventKind::Debug => sinks.on_progress(&format!("{}{}", DEBUG_MARKER, event.payload)),
            EventKind::Message => {
                tracing::trace!("Ignoring untyped event");
                return;
            }
        }

        self.dispatched += 1;
    }

    /// Answer text accumulated so far
    pub fn result(&self) -> &str {
        &self.result
    }

    /// Frames routed so far
    pub fn routed(&self) -> usize {
        self.routed
    }

    /// Events that reached a sink
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    pub fn into_result(self) -> String {
        self.result
    }
}

/// Decode a whole stream, dispatching events as frames complete
///
/// Returns the concatenated answer text at end-of-stream. A failure from
/// the source aborts the run with that error and no partial result; sink
/// calls already made are not undone.
pub async fn run<C, S>(source: &mut C, sinks: &mut S) -> Result<String>
where
    C: ChunkSource + ?Sized,
    S: EventSink + ?Sized,
{
    let mut decoder = FrameDecoder::new();
    let mut router = EventRouter::new();

    loop {
        let chunk = match source.next_chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    routed = router.routed(),
                    "Event stream failed before completion"
                );
                return Err(e);
            }
        };

        decoder.feed(&chunk);
        for frame in decoder.drain() {
            let event = router.route(&frame);
            tracing::debug!(kind = %event.kind, len = event.payload.len(), "Routed frame");
            router.dispatch(event, sinks);
        }
    }

    // Every chunk was drained above; only an unterminated tail can remain
    decoder.finish();

    tracing::info!(
        routed = router.routed(),
        dispatched = router.dispatched(),
        answer_len = router.result().len(),
        "Event stream completed"
    );

    Ok(router.into_result())
}
