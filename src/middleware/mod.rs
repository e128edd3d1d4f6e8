mod auth;
mod error_handler;
mod rate_limit;

pub use auth::{Caller, auth_middleware, identify_caller};
pub use error_handler::log_errors;
pub use rate_limit::{apply_rate_limit, get_rate_limit_info, rate_limit};
