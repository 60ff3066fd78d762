//! Linkstash Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for the Linkstash bookmark
//! sync server. It is database-agnostic and defines traits that are
//! implemented by the `storage-sqlite` crate (persistence) and the server
//! runtime (event delivery).

pub mod bookmarks;
pub mod errors;
pub mod events;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
