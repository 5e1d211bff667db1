use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use portal_config::config::PortalConfig;
use portal_config::server;
use portal_config::server::MigrateDirection;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve {
        #[clap(short, long, default_value = "portal.toml")]
        config: String,
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = "portal.db")]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
        #[clap(short, long, default_value = "portal.db")]
        database: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Serve {
            config,
            port,
            database,
            cors_origin,
        } => {
            let mut config = PortalConfig::load(&config)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(database) = database {
                config.server.database = database;
            }
            if let Some(cors_origin) = cors_origin {
                config.server.cors_origin = Some(cors_origin);
            }

            info!("Starting server on port {}", config.server.port);
            server::start_server(config).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                info!("Initializing database: {}", database);
                server::migrate_database(&database, MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Running database migration: {:?}", direction);
                server::migrate_database(&database, direction).await?;
            }
        },
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_string()))
        .without_time()
        .init();
}
