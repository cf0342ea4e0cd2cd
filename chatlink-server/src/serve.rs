use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result, ensure};
use chatlink::{
    ChatLink, ChatLinkBuilder, ExpiringStore, InMemoryStore, LogNotifier, Notifier, SqliteStore,
    TelegramClient, TelegramConfig,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::cli::ServeArgs;

type Relay = ChatLink<Arc<dyn ExpiringStore>, Arc<dyn Notifier>>;

pub async fn run(args: ServeArgs) -> Result<()> {
    let store: Arc<dyn ExpiringStore> = match &args.database_url {
        Some(url) => {
            info!("Using SQLite storage");
            Arc::new(
                SqliteStore::connect(url)
                    .await
                    .context("Failed to connect to database")?,
            )
        }
        None => {
            info!("Using in-memory storage; records are lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let notifier: Arc<dyn Notifier> = if args.dry_run {
        info!("Dry run: outgoing chat messages are only logged");
        Arc::new(LogNotifier::new())
    } else {
        let bot_token = args
            .bot_token
            .clone()
            .context("A bot token is required unless --dry-run is set")?;
        let mut config = TelegramConfig::new(bot_token);
        if let Some(api_base) = &args.api_base {
            config = config.with_api_base(api_base);
        }
        Arc::new(TelegramClient::new(config)?)
    };

    let ttl = code_ttl(args.ttl_seconds)?;

    let chatlink: Arc<Relay> = Arc::new(
        ChatLinkBuilder::new()
            .with_secret(args.secret.as_bytes())
            .with_ttl(ttl)
            .with_commands(args.commands.iter().map(String::as_str))
            .with_store(store)
            .with_notifier(notifier)
            .apply_migrations(true)
            .build()
            .await?,
    );

    let mut routes = chatlink_axum::routes(chatlink.clone()).with_webhook_path(&args.webhook_path);
    if let Some(secret) = &args.webhook_secret {
        routes = routes.with_webhook_secret(secret);
    }
    ensure!(
        routes.webhook_path() != chatlink_axum::LOOKUP_PATH,
        "webhook path must differ from {}",
        chatlink_axum::LOOKUP_PATH
    );
    let webhook_path = routes.webhook_path().to_string();
    let app = routes.build();

    let purge = tokio::spawn(purge_expired(
        chatlink.clone(),
        Duration::from_secs(args.purge_interval_secs.max(1)),
    ));

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("Server starting on http://{}", listener.local_addr()?);
    info!("  POST {webhook_path:<14} - Telegram webhook");
    info!("  GET  {:<14} - Resolve a verification code", chatlink_axum::LOOKUP_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    info!("Server stopped");
    Ok(())
}

fn code_ttl(seconds: i64) -> Result<chrono::Duration> {
    chrono::Duration::try_seconds(seconds)
        .with_context(|| format!("--ttl-seconds {seconds} is out of range"))
}

async fn purge_expired(chatlink: Arc<Relay>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        match chatlink.purge_expired().await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!(purged, "Purged expired verification codes"),
            Err(e) => tracing::warn!(error = %e, "Failed to purge expired verification codes"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_ttl_range() {
        assert_eq!(code_ttl(600).unwrap(), chrono::Duration::seconds(600));
        assert!(code_ttl(i64::MAX).is_err());
    }
}
