use anyhow::Result;
use vocalis_client::{logging::init_logging, BackendClient, ClientConfig, StreamRequest};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ClientConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    init_logging(&config.logging);

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Berita teknologi hari ini".to_string());

    println!("Search Streaming Example");
    println!("========================\n");
    println!("Query: {}\n", query);

    let client = BackendClient::from_config(&config)?;

    // Collect deltas and progress separately, then print the transcript
    let mut answers: Vec<String> = Vec::new();
    let mut progress: Vec<String> = Vec::new();
    let mut sink = vocalis_client::CallbackSink::new(
        |delta: &str| answers.push(delta.to_string()),
        |message: &str| progress.push(message.to_string()),
    );

    let answer = client
        .stream(&StreamRequest::search(query), &mut sink)
        .await?;
    drop(sink);

    println!("Progress:");
    for (i, message) in progress.iter().enumerate() {
        println!("  {}. {}", i + 1, message);
    }

    println!("\nAnswer ({} deltas):\n{}", answers.len(), answer);

    Ok(())
}
