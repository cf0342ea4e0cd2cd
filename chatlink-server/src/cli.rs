use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

/// chatlink - link bot chats to external automations with short-lived codes
#[derive(Parser, Debug)]
#[command(name = "chatlink")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info,chatlink=debug")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP relay
    Serve(ServeArgs),

    /// Print the verification code for an activation code
    Derive {
        /// Activation code as the user would send it
        code: String,

        #[arg(long, env = "HMAC_SECRET", hide_env_values = true)]
        secret: String,
    },

    /// Create the SQLite schema
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },

    /// Register the relay's webhook URL with Telegram
    SetWebhook {
        /// Public URL of the webhook endpoint
        url: String,

        #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
        bot_token: String,

        #[arg(long, env = "TELEGRAM_WEBHOOK_SECRET", hide_env_values = true)]
        webhook_secret: Option<String>,

        #[arg(long, env = "TELEGRAM_API_BASE")]
        api_base: Option<String>,
    },

    /// Print the version
    Version,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Secret used to derive verification codes
    #[arg(long, env = "HMAC_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Telegram bot token; not needed with --dry-run
    #[arg(
        long,
        env = "TELEGRAM_BOT_TOKEN",
        hide_env_values = true,
        required_unless_present = "dry_run"
    )]
    pub bot_token: Option<String>,

    /// SQLite URL; records are kept in memory when absent
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Secret token Telegram must send with every webhook call
    #[arg(long, env = "TELEGRAM_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// How long an issued code stays valid
    #[arg(long, env = "CODE_TTL_SECONDS", default_value_t = 600)]
    pub ttl_seconds: i64,

    #[arg(long, env = "WEBHOOK_PATH", default_value = chatlink_axum::DEFAULT_WEBHOOK_PATH)]
    pub webhook_path: String,

    #[arg(long, env = "TELEGRAM_API_BASE")]
    pub api_base: Option<String>,

    /// Commands that carry an activation code
    #[arg(
        long = "command",
        env = "ACTIVATION_COMMANDS",
        value_delimiter = ',',
        default_value = "/start"
    )]
    pub commands: Vec<String>,

    /// Seconds between sweeps of expired records
    #[arg(long, default_value_t = 60)]
    pub purge_interval_secs: u64,

    /// Log outgoing chat messages instead of calling Telegram
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "chatlink",
            "serve",
            "--secret",
            "s3cr3t",
            "--dry-run",
            "--bind",
            "127.0.0.1:9000",
            "--ttl-seconds",
            "120",
            "--command",
            "/start,/link",
        ])
        .unwrap();

        let Commands::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(args.secret, "s3cr3t");
        assert!(args.dry_run);
        assert_eq!(args.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(args.ttl_seconds, 120);
        assert_eq!(args.commands, ["/start", "/link"]);
    }

    #[test]
    fn test_derive_command() {
        let cli =
            Cli::try_parse_from(["chatlink", "derive", "abc123", "--secret", "s3cr3t"]).unwrap();

        let Commands::Derive { code, secret } = cli.command else {
            panic!("expected derive command");
        };
        assert_eq!(code, "abc123");
        assert_eq!(secret, "s3cr3t");
    }
}
