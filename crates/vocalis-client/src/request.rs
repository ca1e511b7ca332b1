use serde_json::Value;

pub const ASK_PATH: &str = "/api/ask";
pub const SEARCH_PATH: &str = "/api/search";

/// Which backend pipeline answers a streamed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamProfile {
    /// Plain chat completion
    Chat,
    /// Web-search-augmented answer
    Search,
}

impl StreamProfile {
    pub fn path(&self) -> &'static str {
        match self {
            StreamProfile::Chat => ASK_PATH,
            StreamProfile::Search => SEARCH_PATH,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamProfile::Chat => "chat",
            StreamProfile::Search => "search",
        }
    }
}

/// Target resource and JSON body for one streamed answer
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub profile: StreamProfile,
    pub body: Value,
}

impl StreamRequest {
    /// `POST /api/ask` with `{"prompt": ...}`
    pub fn chat(prompt: impl Into<String>) -> Self {
        Self {
            profile: StreamProfile::Chat,
            body: serde_json::json!({ "prompt": prompt.into() }),
        }
    }

    /// `POST /api/search` with `{"query": ...}`
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            profile: StreamProfile::Search,
            body: serde_json::json!({ "query": query.into() }),
        }
    }

    pub fn path(&self) -> &'static str {
        self.profile.path()
    }
}
