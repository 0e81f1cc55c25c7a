//! Domain types for the API Gateway: configuration and error handling.

pub mod config;
pub mod error;

pub use config::{ConfigError, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, TimeoutConfig};
pub use error::{ApiError, ApiResult, GatewayError};
