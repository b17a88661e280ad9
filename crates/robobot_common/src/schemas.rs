//! Request/response schemas for the HTTP API.

use crate::types::ChatMeta;
use serde::{Deserialize, Serialize};

/// User id recorded when the caller does not send one
pub const ANONYMOUS_USER: &str = "anon";

/// Header carrying a caller-supplied provider credential
pub const CREDENTIAL_HEADER: &str = "x-openai-key";

/// POST /chat body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// POST /chat response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub meta: Option<ChatMeta>,
}

/// GET /health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// "mock" or "real"
    pub mode: String,
    pub kb_entries: usize,
    pub uptime_secs: u64,
}
