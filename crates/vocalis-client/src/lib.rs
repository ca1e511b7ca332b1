pub mod client;
pub mod config;
pub mod logging;
pub mod request;

pub use client::{BackendClient, HealthStatus, SpeechAudio};
pub use config::{BackendConfig, ClientConfig, LoggingConfig, TtsConfig};
pub use request::{StreamProfile, StreamRequest};

pub use vocalis_stream::{CallbackSink, EventSink, NoopSink, StreamError};
