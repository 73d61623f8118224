//! Persistence layer for todos backed by a single SQLite table, with a thin
//! axum surface on top.

pub mod config;
pub mod domain;
pub mod http;
pub mod infrastructure;
