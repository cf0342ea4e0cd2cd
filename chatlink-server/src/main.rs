//! chatlink - standalone relay server
//!
//! Serves the webhook and lookup routes from `chatlink-axum` and carries a few operator
//! commands for troubleshooting a deployment.

use anyhow::{Context, Result};
use chatlink::{
    ActivationCode, ExpiringStore, SqliteStore, TelegramClient, TelegramConfig,
    crypto::derive_verification_code,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod serve;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Derive { code, secret } => {
            let activation = ActivationCode::parse(&code)?;
            let code = derive_verification_code(secret.as_bytes(), &activation)?;
            println!("{code}");
            Ok(())
        }
        Commands::Migrate { database_url } => {
            let store = SqliteStore::connect(&database_url)
                .await
                .context("Failed to connect to database")?;
            store.migrate().await.context("Migration failed")?;
            tracing::info!("Database migrations completed");
            Ok(())
        }
        Commands::SetWebhook {
            url,
            bot_token,
            webhook_secret,
            api_base,
        } => {
            let mut config = TelegramConfig::new(bot_token);
            if let Some(api_base) = api_base {
                config = config.with_api_base(api_base);
            }
            let client = TelegramClient::new(config)?;
            client
                .set_webhook(&url, webhook_secret.as_deref().filter(|s| !s.is_empty()))
                .await
                .context("setWebhook failed")?;
            tracing::info!(%url, "Webhook registered");
            Ok(())
        }
        Commands::Version => {
            println!("chatlink {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
