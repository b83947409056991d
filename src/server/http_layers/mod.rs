mod cors;
mod requests_logging;

pub use cors::{build_cors_layer, DEFAULT_CORS_ORIGIN};
pub use requests_logging::{log_requests, RequestsLoggingLevel};
