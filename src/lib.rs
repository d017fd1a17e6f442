//! # Warren
//!
//! A multi-site wiki server, usable both as a standalone binary and as a
//! library. Each site is an isolated content tenant: it owns its own page
//! and file tables inside one shared SQLite database, created and dropped
//! together with the site's registry row.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! warren = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warren::server::{AppState, create_router};
//! use warren::store::SqliteStore;
//!
//! let store = SqliteStore::open("./data/warren.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store)));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod render;
pub mod server;
pub mod store;
pub mod types;
