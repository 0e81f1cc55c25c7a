//! # Bandwidth Hub Test Suite
//!
//! Cross-crate tests that no single crate can own.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── lifecycle.rs   # keeper + query service over one store
//! │   ├── rest_api.rs    # full node runtime behind HTTP
//! │   └── properties.rs  # proptest: quota, monotonic metering, paging
//! │
//! └── benches/
//!     └── registry_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hub-tests
//! cargo test -p hub-tests integration::properties
//! cargo bench -p hub-tests
//! ```

pub mod integration;
