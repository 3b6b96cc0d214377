use clap::Parser;
use std::process::ExitCode;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use travels::cli::Cli;
use travels::config::Config;
use travels::error::StartupError;
use travels::{build_app, db, loader};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let config = Config::load(&cli.config)?;

    let pool = db::connect(&config.db).await?;
    db::apply_schema(&pool, &config.db.schema).await?;

    if let Some(archive) = &config.data {
        loader::load_archive(&pool, archive).await?;
    }

    let app = build_app(pool);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await.map_err(StartupError::Bind)?;

    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await.map_err(StartupError::Serve)
}
