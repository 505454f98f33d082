//! Startup sequence: readiness gate, migrations, superuser, serve.

pub mod orchestrator;
pub mod provisioning;
pub mod readiness;
pub mod store;

pub use orchestrator::{BootReport, bootstrap, run, run_with};
pub use provisioning::{Provisioned, ensure_superuser};
pub use readiness::{ReadinessPolicy, wait_until_ready};
pub use store::Store;
