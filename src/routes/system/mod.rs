mod handler;
mod model;

pub use handler::{analytics, health_check, rate_limit_info, root};
pub use model::{AnalyticsResponse, HealthResponse};
