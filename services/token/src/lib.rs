//! Session token service library.
//!
//! Issues short-lived access tokens paired with single-use refresh secrets,
//! rotates them on refresh, and binds each session to the device that
//! created it.

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod jwt;
pub mod metrics;
pub mod notify;
pub mod refresh;
pub mod storage;

// Re-exports for convenience
pub use config::Config;
pub use engine::{RotationEngine, TokenPair};
pub use error::TokenError;
