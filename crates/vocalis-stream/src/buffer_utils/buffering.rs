use std::fmt;

/// Boundary between two frames once `\r\n` has been folded into `\n`.
const FRAME_DELIMITER: &str = "\n\n";

/// One complete, delimiter-bounded unit of the event stream.
///
/// The text excludes the trailing blank line and never contains `\r\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(String);

impl Frame {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental frame decoder for a chunked event stream
///
/// Bytes arrive in whatever pieces the transport hands out. The decoder
/// turns them into text (keeping a split UTF-8 sequence until its tail
/// arrives), folds `\r\n` into `\n`, and cuts a frame at every blank line.
///
/// Everything received but not yet emitted stays in the decoder:
/// `buffer` holds decoded text, `pending` holds at most 3 bytes of an
/// unfinished UTF-8 sequence and `pending_cr` a trailing `\r` whose
/// partner may still be in flight.
///
/// Emitted frames are only marked consumed; the buffer is compacted once
/// no complete frame is left, and a search resumes where the last one
/// stopped.
pub struct FrameDecoder {
    buffer: String,
    /// Start of the first frame not yet emitted
    start: usize,
    /// No delimiter begins before this offset
    scanned: usize,
    pending: Vec<u8>,
    pending_cr: bool,
    finished: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Create a decoder with a preallocated text buffer
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
            start: 0,
            scanned: 0,
            pending: Vec::with_capacity(4),
            pending_cr: false,
            finished: false,
        }
    }

    /// Append a chunk of raw bytes
    ///
    /// Empty chunks and chunks fed after [`finish`](Self::finish) are ignored.
    pub fn feed(&mut self, chunk: &[u8]) {
        if chunk.is_empty() || self.finished {
            return;
        }

        self.pending.extend_from_slice(chunk);
        let decoded = self.decode_pending();
        self.push_text(&decoded);
    }

    /// Decode as much of `pending` as forms complete UTF-8
    ///
    /// Invalid sequences become U+FFFD. An incomplete sequence at the very
    /// end is kept for the next chunk.
    fn decode_pending(&mut self) -> String {
        let mut decoded = String::with_capacity(self.pending.len());
        let mut rest: &[u8] = &self.pending;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // `valid_up_to` marks a UTF-8 prefix
                    decoded.push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match e.error_len() {
                        Some(len) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = rest.to_vec();
        decoded
    }

    /// Normalize line endings and append to the buffer
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let mut joined = String::with_capacity(text.len() + 1);
        if self.pending_cr {
            joined.push('\r');
            self.pending_cr = false;
        }
        joined.push_str(text);

        // A trailing \r may be the first half of a \r\n split across chunks
        if joined.ends_with('\r') {
            joined.pop();
            self.pending_cr = true;
        }

        self.buffer.push_str(&joined.replace("\r\n", "\n"));
    }

    /// Extract the next completed frame, if one is fully buffered
    pub fn next_frame(&mut self) -> Option<Frame> {
        let from = self.scanned.max(self.start);

        match find_delimiter(&self.buffer.as_bytes()[from..]) {
            Some(pos) => {
                let end = from + pos;
                let frame = Frame::new(&self.buffer[self.start..end]);
                self.start = end + FRAME_DELIMITER.len();
                self.scanned = self.start;
                Some(frame)
            }
            None => {
                // The last byte may be the first half of a delimiter
                self.scanned = self
                    .buffer
                    .len()
                    .saturating_sub(FRAME_DELIMITER.len() - 1)
                    .max(self.start);
                self.compact();
                None
            }
        }
    }

    /// Drop consumed frame text from the front of the buffer
    fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        self.buffer.drain(..self.start);
        self.scanned -= self.start;
        self.start = 0;
    }

    /// All frames completed since the last drain, in arrival order
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        frames
    }

    /// Signal that no more chunks will arrive
    ///
    /// Text still buffered without a closing blank line is dropped rather
    /// than promoted to a frame: a frame only exists once it is delimited.
    /// Frames already completed but not yet drained remain available.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        self.compact();

        // End of the last delimited frame; anything after it is unterminated
        let mut keep = 0;
        while let Some(pos) = find_delimiter(&self.buffer.as_bytes()[keep..]) {
            keep += pos + FRAME_DELIMITER.len();
        }

        let discarded = self.buffered_len() - keep;
        if discarded > 0 {
            tracing::debug!(discarded, "Discarding unterminated trailing frame");
        }

        self.buffer.truncate(keep);
        self.scanned = 0;
        self.pending.clear();
        self.pending_cr = false;
    }

    /// Bytes and characters retained but not yet emitted
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() - self.start + self.pending.len() + usize::from(self.pending_cr)
    }

    /// Check if nothing is retained
    pub fn is_empty(&self) -> bool {
        self.buffered_len() == 0
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(FRAME_DELIMITER.len())
        .position(|window| window == FRAME_DELIMITER.as_bytes())
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"event:answer\ndata:hi\n\n");

        assert_eq!(decoder.drain(), vec![Frame::new("event:answer\ndata:hi")]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_partial_frame() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"data: par");
        assert!(decoder.next_frame().is_none());

        decoder.feed(b"tial\n");
        assert!(decoder.next_frame().is_none());

        decoder.feed(b"\n");
        assert_eq!(decoder.next_frame().unwrap().as_str(), "data: partial");
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"data:a\n\ndata:b\n\ndata:c");

        let frames = decoder.drain();
        assert_eq!(frames, vec![Frame::new("data:a"), Frame::new("data:b")]);
        assert_eq!(decoder.buffered_len(), "data:c".len());
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"");
        assert!(decoder.is_empty());
        assert!(decoder.drain().is_empty());
    }

    #[test]
    fn test_crlf_normalized() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"event:progress\r\ndata:x\r\n\r\n");

        assert_eq!(decoder.drain(), vec![Frame::new("event:progress\ndata:x")]);
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"data:x\r");
        decoder.feed(b"\n\r");
        assert!(decoder.drain().is_empty());

        decoder.feed(b"\n");
        assert_eq!(decoder.drain(), vec![Frame::new("data:x")]);
    }

    #[test]
    fn test_lone_carriage_return_kept() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"data:a\rb\n\n");

        assert_eq!(decoder.drain(), vec![Frame::new("data:a\rb")]);
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        let bytes = "data:é€\n\n".as_bytes();

        // 'é' is two bytes, '€' is three; split inside both
        decoder.feed(&bytes[..6]);
        decoder.feed(&bytes[6..8]);
        decoder.feed(&bytes[8..]);

        assert_eq!(decoder.drain(), vec![Frame::new("data:é€")]);
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"data:a\xFFb\n\ndata:ok\n\n");

        let frames = decoder.drain();
        assert_eq!(frames[0].as_str(), "data:a\u{FFFD}b");
        assert_eq!(frames[1].as_str(), "data:ok");
    }

    #[test]
    fn test_finish_discards_unterminated_text() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"event:answer\ndata:partial");
        decoder.finish();

        assert!(decoder.drain().is_empty());
        assert!(decoder.is_empty());
        assert!(decoder.is_finished());
    }

    #[test]
    fn test_finish_keeps_completed_frames() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"data:done\n\ndata:half");
        decoder.finish();

        assert_eq!(decoder.drain(), vec![Frame::new("data:done")]);
    }

    #[test]
    fn test_feed_after_finish_ignored() {
        let mut decoder = FrameDecoder::new();

        decoder.finish();
        decoder.feed(b"data:late\n\n");

        assert!(decoder.drain().is_empty());
    }

    #[test]
    fn test_delimiter_split_across_chunks() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"data:a\n\ndata:b\n");
        assert_eq!(decoder.drain(), vec![Frame::new("data:a")]);

        decoder.feed(b"\n");
        assert_eq!(decoder.drain(), vec![Frame::new("data:b")]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_large_frame_fed_bytewise() {
        let mut decoder = FrameDecoder::new();
        let payload = "é".repeat(20_000);
        let wire = format!("data:{}\n\ndata:next\n\n", payload);

        let mut frames = Vec::new();
        for byte in wire.as_bytes() {
            decoder.feed(std::slice::from_ref(byte));
            frames.extend(decoder.drain());
        }

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_str(), format!("data:{}", payload));
        assert_eq!(frames[1].as_str(), "data:next");
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_buffered_len_excludes_emitted_frames() {
        let mut decoder = FrameDecoder::new();

        decoder.feed(b"data:a\n\ndata:b\n\ndata:c");
        assert_eq!(decoder.next_frame(), Some(Frame::new("data:a")));
        assert_eq!(decoder.buffered_len(), "data:b\n\ndata:c".len());

        decoder.finish();
        assert_eq!(decoder.drain(), vec![Frame::new("data:b")]);
        assert!(decoder.is_empty());
    }
}
