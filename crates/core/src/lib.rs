//! Core types and shared functionality for reflekt.
//!
//! This crate provides:
//! - Versioned cache store with SQLite backend
//! - Request/response model shared by the worker and the fetch pipeline
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;

pub use cache::{CacheDb, CachedEntry};
pub use config::{AppConfig, ConfigError, SwipeConfig};
pub use error::Error;
pub use request::{Request, RequestMode, Response};
