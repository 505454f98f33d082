use crate::bootstrap::provisioning::{Provisioned, ensure_superuser};
use crate::bootstrap::readiness::wait_until_ready;
use crate::bootstrap::store::Store;
use crate::config::Config;
use crate::db::AccountsStorage;
use crate::db::sqlite::lazy_pool;
use crate::error::BootError;
use crate::server;
use std::time::Duration;
use tracing::info;

/// Upper bound for a single connectivity probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// What the first three steps did.
#[derive(Debug, Clone, PartialEq)]
pub struct BootReport {
    pub readiness_attempts: usize,
    pub migrations_applied: usize,
    /// `None` when no superuser is configured.
    pub superuser: Option<Provisioned>,
}

/// Readiness gate, migrations, then superuser provisioning, strictly in order.
/// The first failing step ends the sequence; nothing is rolled back.
pub async fn bootstrap<S: Store>(store: &S, config: &Config) -> Result<BootReport, BootError> {
    let readiness_attempts = wait_until_ready(|| store.ping(), &config.readiness).await?;

    let migrations_applied = store.migrate().await?;

    let superuser = match &config.superuser {
        Some(settings) => Some(ensure_superuser(store, settings).await?),
        None => {
            info!("no superuser configured; skipping provisioning");
            None
        }
    };

    Ok(BootReport {
        readiness_attempts,
        migrations_applied,
        superuser,
    })
}

/// Run [`bootstrap`] and hand the store to `serve` once it succeeded.
pub async fn run_with<S, F, Fut>(store: S, config: &Config, serve: F) -> Result<(), BootError>
where
    S: Store,
    F: FnOnce(S) -> Fut,
    Fut: Future<Output = Result<(), BootError>>,
{
    let report = bootstrap(&store, config).await?;
    info!(
        readiness_attempts = report.readiness_attempts,
        migrations_applied = report.migrations_applied,
        superuser_created = report.superuser.as_ref().map(Provisioned::was_created),
        "bootstrap complete"
    );
    serve(store).await
}

/// Production entry: SQLite store from `config.database_url`, HTTP on `host:port`.
pub async fn run(config: Config) -> Result<(), BootError> {
    let pool = lazy_pool(&config.database_url, PROBE_TIMEOUT)?;
    let storage = AccountsStorage::new(pool);
    let addr = config.listen_addr();
    run_with(storage, &config, |storage| server::serve(storage, addr)).await
}
