//! Database module: account models and SQLite storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `migrations.rs`: embedded schema migrations (see `/migrations`)
//! - `sqlite.rs`: pool construction and account queries

pub mod migrations;
pub mod models;
pub mod sqlite;

pub use models::{DbAccount, NewSuperuser, ProfileRole};
pub use sqlite::{AccountsStorage, SqlitePool};
