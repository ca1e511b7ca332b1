use futures::{stream, StreamExt};
use vocalis_stream::{decode_events, ByteStreamSource, EventKind};

/// Replay a captured event stream in small chunks and print each event
///
/// Usage: 01_decode_capture [capture.txt] [chunk_size]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let capture = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read(path).await?,
        None => b"event:progress\ndata:searching\n\nevent:answer\ndata: Hello,\n\n\
                  event:debug\ndata:tokens=3\n\nevent:answer\ndata: world\n\n"
            .to_vec(),
    };
    let chunk_size: usize = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);

    println!("Decoding {} bytes in {}-byte chunks\n", capture.len(), chunk_size);

    let chunks: Vec<Result<Vec<u8>, std::io::Error>> = capture
        .chunks(chunk_size.max(1))
        .map(|c| Ok(c.to_vec()))
        .collect();
    let mut events = decode_events(ByteStreamSource::new(stream::iter(chunks)));

    let mut answer = String::new();
    while let Some(event) = events.next().await {
        let event = event?;
        println!("{:>8} | {:?}", event.kind.as_str(), event.payload);
        if event.kind == EventKind::Answer {
            answer.push_str(&event.payload);
        }
    }

    println!("\nAnswer: {:?}", answer);
    Ok(())
}
