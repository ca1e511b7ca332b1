use anyhow::{Context, Result};
use vocalis_client::{logging::init_logging, BackendClient, ClientConfig, NoopSink};

/// Transcribe a recording, ask the backend, and synthesize the answer
///
/// Usage: 03_speech_roundtrip <recording.webm> [voice]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ClientConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    init_logging(&config.logging);

    let path = std::env::args()
        .nth(1)
        .context("usage: 03_speech_roundtrip <recording.webm> [voice]")?;
    let voice = std::env::args().nth(2);

    let client = BackendClient::from_config(&config)?;

    let health = client.ping().await?;
    println!("Backend health: {} {}", health.status, health.body);

    let audio = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path))?;
    println!("Uploading {} bytes...", audio.len());

    let question = client.transcribe(audio).await?;
    println!("Heard: {}", question);

    if question.is_empty() {
        println!("Nothing recognized, stopping.");
        return Ok(());
    }

    let answer = client.ask_stream(&question, &mut NoopSink).await?;
    println!("Answer: {}", answer);

    let speech = client.synthesize(&answer, voice.as_deref()).await?;
    println!("Synthesized {} base64 chars of audio", speech.audio_base64.len());

    Ok(())
}
