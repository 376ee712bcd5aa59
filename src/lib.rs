//! # users-service
//!
//! HTTP CRUD service for a single `users` table in PostgreSQL, with a Redis
//! cache dependency acquired at startup.
//!
//! Startup dials every dependency under a bounded, fixed-delay retry policy
//! and refuses to serve traffic until all of them answered and the schema
//! exists.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── UserStore (persistence/)
//!     ├── QueryExecutor (persistence/)
//!     │
//!     ├── PostgreSQL            Redis (held, unused)
//!     │        ▲                   ▲
//!     └── Dependency Connector (connector/), at startup only
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod connector;
pub mod error;
pub mod persistence;
pub mod startup;
