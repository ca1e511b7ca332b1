use futures::Stream;
use std::pin::Pin;

use super::buffering::FrameDecoder;
use crate::error::Result;
use crate::streaming::ParsedEvent;
use crate::traits::ChunkSource;

/// Event stream decoded from a chunk source
///
/// Yields every parsed event with a non-empty payload, `Message` events
/// included, so callers can apply their own routing. A source failure is
/// yielded once as the last item.
pub fn decode_events<C>(mut source: C) -> Pin<Box<dyn Stream<Item = Result<ParsedEvent>> + Send>>
where
    C: ChunkSource + 'static,
{
    Box::pin(async_stream::stream! {
        let mut decoder = FrameDecoder::new();

        loop {
            match source.next_chunk().await {
                Ok(Some(chunk)) => {
                    decoder.feed(&chunk);

                    // Emit every frame completed by this chunk
                    for frame in decoder.drain() {
                        let event = ParsedEvent::from_frame(&frame);
                        if !event.is_empty() {
                            yield Ok(event);
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        // Frames were yielded per chunk; this only drops an unterminated tail
        decoder.finish();
    })
}
