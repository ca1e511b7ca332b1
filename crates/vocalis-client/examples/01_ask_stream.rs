use anyhow::Result;
use std::io::Write;
use vocalis_client::{logging::init_logging, BackendClient, CallbackSink, ClientConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ClientConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    init_logging(&config.logging);

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Jelaskan komputasi kuantum dalam 3 kalimat.".to_string());

    println!("Ask Streaming Example");
    println!("=====================\n");
    println!("Backend: {}", config.backend.url);
    println!("Prompt: {}\n", prompt);
    println!("---");

    let client = BackendClient::from_config(&config)?;

    let mut sink = CallbackSink::new(
        |delta: &str| {
            print!("{}", delta);
            std::io::stdout().flush().ok();
        },
        |message: &str| println!("\n[{}]", message),
    );

    let answer = client.ask_stream(&prompt, &mut sink).await?;

    println!("\n---\n");
    println!("Answer length: {} chars", answer.chars().count());

    Ok(())
}
