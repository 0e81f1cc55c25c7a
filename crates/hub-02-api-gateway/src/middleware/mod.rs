//! Middleware stack for the API Gateway.
//!
//! Layer order: Request → CORS → Timeout → Trace → BodyLimit → Handler

pub mod cors;

pub use cors::create_cors_layer;
