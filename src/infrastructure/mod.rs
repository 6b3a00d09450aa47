//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and migrations (db)
//! - HTTP server setup (server)
//! - Configuration loading (config)
//! - Authentication primitives (auth)
//! - Cover image storage (storage)
//! - Per-IP rate limiting (rate_limit)
//! - Repository implementations (repositories)
//! - Application state (state)

pub mod auth;
pub mod config;
pub mod db;
pub mod rate_limit;
pub mod repositories;
pub mod seed;
pub mod server;
pub mod state;
pub mod storage;

pub use repositories::*;
pub use state::AppState;
