//! ChargeNet billing core
//!
//! Loads configuration, prepares the database schema and reports the
//! migration state. Reads `$CHARGENET_CONFIG` or
//! `~/.config/chargenet/config.toml`.

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chargenet::config::LoggingConfig;
use chargenet::domain::AutoApproveGateway;
use chargenet::infrastructure::database::migrator::Migrator;
use chargenet::{default_config_path, init_database, AppConfig, ChargingCore};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = default_config_path();
    let (app_cfg, load_error) = match AppConfig::load_or_default(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_tracing(&app_cfg.logging);

    match load_error {
        None => info!(path = %config_path.display(), "Configuration loaded"),
        Some(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&app_cfg.database).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    let pending = Migrator::get_pending_migrations(&db).await?.len();
    let applied = Migrator::get_applied_migrations(&db).await?.len();
    info!(applied, pending, "Migrations completed");

    // Wiring check: fails fast on an unusable billing section.
    ChargingCore::new(db.clone(), &app_cfg.billing, Arc::new(AutoApproveGateway))?;
    info!(
        rate_per_kwh = app_cfg.billing.rate_per_kwh,
        auto_issue_invoice = app_cfg.billing.auto_issue_invoice,
        "Billing core ready"
    );

    db.close().await?;
    Ok(())
}
