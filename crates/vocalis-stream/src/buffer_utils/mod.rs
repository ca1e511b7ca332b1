mod buffering;
mod sse_parser;

pub use buffering::{Frame, FrameDecoder};
pub use sse_parser::decode_events;
