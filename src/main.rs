use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use larder::{api, db};

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "A personal recipe box with a local HTTP editing API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the larder server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "7140")]
        port: u16,

        /// Path to the recipe database (defaults to the platform data directory)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "larder=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();

    match cli.command {
        Some(Commands::Serve { port, db: db_path }) => {
            tracing::info!("Starting larder server on port {}", port);

            let db = match db_path {
                Some(path) => db::Database::open(path)?,
                None => db::Database::open_default()?,
            };
            db.migrate()?;

            let app = api::create_router(db);

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("larder server listening on http://127.0.0.1:{}", port);

            axum::serve(listener, app).await?;
        }
        None => {
            // Default: start server
            tracing::info!("Starting larder server on port 7140");

            let db = db::Database::open_default()?;
            db.migrate()?;

            let app = api::create_router(db);

            let listener = tokio::net::TcpListener::bind("127.0.0.1:7140").await?;
            tracing::info!("larder server listening on http://127.0.0.1:7140");

            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
