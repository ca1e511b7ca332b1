use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;

use crate::error::{Result, StreamError};

/// Ordered producer of raw byte chunks
///
/// Implemented by the transport. `Ok(None)` signals end-of-stream; an
/// `Err` means the stream failed or was cancelled and no more chunks will
/// follow.
#[async_trait]
pub trait ChunkSource: Send {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

/// Receiver of routed events
///
/// `on_answer` gets each answer delta, never the running total.
/// `on_progress` gets progress text and marked debug text.
pub trait EventSink: Send {
    fn on_answer(&mut self, delta: &str);

    fn on_progress(&mut self, message: &str);
}

/// Adapts any fallible byte stream (e.g. `reqwest::Response::bytes_stream`)
/// into a [`ChunkSource`]. Chunks that already are [`Bytes`] pass through
/// without a copy. Stream errors surface as [`StreamError::Transport`].
pub struct ByteStreamSource<S> {
    inner: S,
}

impl<S> ByteStreamSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S, T, E> ChunkSource for ByteStreamSource<S>
where
    S: Stream<Item = std::result::Result<T, E>> + Unpin + Send,
    T: Into<Bytes> + Send,
    E: Display + Send,
{
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        match self.inner.next().await {
            Some(Ok(chunk)) => Ok(Some(chunk.into())),
            Some(Err(e)) => Err(StreamError::Transport(e.to_string())),
            None => Ok(None),
        }
    }
}

/// Sink built from two closures
pub struct CallbackSink<A, P> {
    on_answer: A,
    on_progress: P,
}

impl<A, P> CallbackSink<A, P>
where
    A: FnMut(&str) + Send,
    P: FnMut(&str) + Send,
{
    pub fn new(on_answer: A, on_progress: P) -> Self {
        Self {
            on_answer,
            on_progress,
        }
    }
}

impl<A, P> EventSink for CallbackSink<A, P>
where
    A: FnMut(&str) + Send,
    P: FnMut(&str) + Send,
{
    fn on_answer(&mut self, delta: &str) {
        (self.on_answer)(delta)
    }

    fn on_progress(&mut self, message: &str) {
        (self.on_progress)(message)
    }
}

/// Sink that ignores every event, for callers that only need the result
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn on_answer(&mut self, _delta: &str) {}

    fn on_progress(&mut self, _message: &str) {}
}
