mod cache;
mod error_handler;
mod rate_limit;
mod readiness;

pub use cache::cache_gate;
pub use error_handler::log_errors;
pub use rate_limit::{RateLimitDecision, RateLimitRule, RateLimiter, rate_limit};
pub use readiness::readiness_gate;
