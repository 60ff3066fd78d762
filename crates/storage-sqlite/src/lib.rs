//! SQLite storage implementation for Linkstash.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository trait defined in
//! `linkstash-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The bookmark repository implementation
//! - Database-specific model types (with Diesel derives)
//!
//! This crate is the only place in the application where Diesel dependencies
//! exist. All other crates are database-agnostic and work with traits.

pub mod bookmarks;
pub mod db;
pub mod errors;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, write_actor, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors
pub use errors::StorageError;

// Re-export from linkstash-core for convenience
pub use linkstash_core::errors::{DatabaseError, Error, Result};
