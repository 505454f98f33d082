use mimalloc::MiMalloc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = assignmate_boot::Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen = %cfg.listen_addr(),
        loglevel = %cfg.loglevel,
        ready_interval = ?cfg.readiness.interval,
        ready_max_attempts = ?cfg.readiness.max_attempts,
        superuser = %cfg.superuser.as_ref().map(|s| s.username.as_str()).unwrap_or("<none>")
    );

    if let Err(e) = assignmate_boot::bootstrap::run(cfg).await {
        error!(error = %e, "startup failed");
        return Err(e.into());
    }
    Ok(())
}
