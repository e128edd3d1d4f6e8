use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub features: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub redis_connected: bool,
    pub rate_limit_backend: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub total_active_sessions: usize,
    pub timestamp: String,
}
