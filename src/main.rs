use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use warren::config::ServerConfig;
use warren::server::{AppState, create_router};
use warren::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "warren")]
#[command(about = "A multi-site wiki server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and seed a new wiki database file
    Init {
        /// Path of the database file to create
        db_file: PathBuf,
    },

    /// Start the server
    Serve {
        /// Path of an initialized database file
        db_file: PathBuf,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8000")]
        port: u16,
    },
}

fn run_init(db_file: PathBuf) -> anyhow::Result<()> {
    if db_file.exists() {
        bail!(
            "File '{}' already exists. Can't initialize it.",
            db_file.display()
        );
    }

    let store = SqliteStore::open(&db_file)?;
    store.initialize()?;
    store.create_site("main", "This is the main website")?;

    println!("Initialized wiki database at {}", db_file.display());
    println!("Start the server with: warren serve {}", db_file.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warren=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_file } => {
            run_init(db_file)?;
        }
        Commands::Serve {
            db_file,
            host,
            port,
        } => {
            if !db_file.exists() {
                bail!(
                    "Database file '{}' doesn't exist. Create one with: warren init {}",
                    db_file.display(),
                    db_file.display()
                );
            }

            let config = ServerConfig {
                host,
                port,
                db_file,
            };

            let store = SqliteStore::open(&config.db_file)?;
            store.initialize()?;

            let state = Arc::new(AppState::new(Arc::new(store)));
            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Listening on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
