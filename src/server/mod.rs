pub mod app;
pub mod handlers;

use std::sync::Arc;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

use crate::config::PortalConfig;
use crate::database::{connection::*, migrations::Migrator};
use crate::remote::{ConfigServiceApi, HttpConfigServiceApi};
use anyhow::Result;
use sea_orm_migration::prelude::*;
use tracing::info;

pub async fn start_server(config: PortalConfig) -> Result<()> {
    let database_url = get_database_url(Some(&config.server.database));
    let db = establish_connection(&database_url).await?;

    // Run migrations
    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let config_service: Arc<dyn ConfigServiceApi> =
        Arc::new(HttpConfigServiceApi::new(config.admin_service.clone())?);

    let app = app::create_app(
        db,
        config.portal.clone(),
        config_service,
        config.server.cors_origin.as_deref(),
    )
    .await?;

    log_routes();

    let port = config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                              - Health check");
    info!("  /docs                                - Swagger UI documentation");
    info!("  POST /server/config                  - Create or update a config (super admin)");
    info!("  POST /server/config/addConfigService - Push a config to the remote config service");
    info!("  GET  /server/config/findAll          - List local configs (super admin)");
    info!("  GET  /server/config/findAllConfigService - List remote configs");
    info!("  GET  /server/config/{{key}}            - Fetch one config by key (super admin)");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
