//! SQLite-backed storage for named, versioned cache stores.
//!
//! This module provides a persistent request/response cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named cache stores, one per deployment generation
//! - Request identity keys (method + URL) hashed with SHA-256
//! - Atomic, all-or-nothing population of a store
//! - Wholesale invalidation by deleting stores of older generations

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedEntry;
