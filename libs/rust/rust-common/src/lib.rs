//! Shared library for cross-cutting concerns in the session token service.
//!
//! This crate provides centralized implementations for:
//! - Error types with retryability classification
//! - Outbound HTTP client configuration for best-effort callbacks
//! - Tracing subscriber initialisation (JSON or text output)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod tracing_config;

pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client};
pub use tracing_config::{LogFormat, TracingConfig, init_tracing};
