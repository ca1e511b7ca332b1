//! Incremental decoder and router for the assistant's event stream.
//!
//! Bytes from any [`ChunkSource`] are cut into frames by [`FrameDecoder`],
//! parsed into [`ParsedEvent`]s and routed by [`EventRouter`] to an
//! [`EventSink`]. [`run`] drives the whole pipeline and returns the
//! concatenated answer text.

pub mod buffer_utils;
pub mod error;
pub mod router;
pub mod streaming;
pub mod traits;

pub use buffer_utils::{decode_events, Frame, FrameDecoder};
pub use error::{Result, StreamError};
pub use router::{run, EventRouter, DEBUG_MARKER};
pub use streaming::{EventKind, ParsedEvent};
pub use traits::{ByteStreamSource, CallbackSink, ChunkSource, EventSink, NoopSink};
