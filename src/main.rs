use anyhow::{Context, Result};
use clap::Parser;
use mailing_list::db::{self, SqliteStore, SubscriberStore};
use mailing_list::service::MailingList;
use mailing_list::{api, config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about = "Mailing list subscriber registry server")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Listen address, overrides `server.bind`
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?
        .with_overrides(std::env::var("DATABASE_URL").ok(), args.bind)?;
    let addr = cfg.bind_addr()?;

    let pool = db::init_pool(&cfg.database.url, cfg.database.max_connections)
        .await
        .context("failed to open subscriber database")?;
    let store = SqliteStore::new(pool);
    store
        .ensure_schema()
        .await
        .context("failed to create subscribers table")?;

    let app = api::router(MailingList::new(Arc::new(store)));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "mailing list RPC server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;

    Ok(())
}
