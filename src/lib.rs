pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use config::Config;
pub use error::BootError;
