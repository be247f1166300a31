use clap::Parser;

use crate::config::{normalize_run_address, ServerConfig};

/// Bonus market loyalty service.
///
/// Every option can also be given as an environment variable (or in a `.env` file). Options given on the command line
/// win.
#[derive(Parser, Debug, Default)]
#[command(name = "bonus_market_server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on, e.g. `127.0.0.1:8080` or `:8080`.
    #[arg(short = 'a', long, env = "RUN_ADDRESS")]
    pub run_address: Option<String>,
    /// Base URL of the accrual service.
    #[arg(short = 'r', long, env = "ACCRUAL_SYSTEM_ADDRESS")]
    pub accrual_address: Option<String>,
    /// SQLite database URL, e.g. `sqlite://data/bonus_market.db`.
    #[arg(short = 'd', long, env = "DATABASE_URI")]
    pub database_uri: Option<String>,
    /// Log level used when RUST_LOG is not set.
    #[arg(short = 'l', long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    /// Secret used to sign access tokens.
    #[arg(short = 'k', long, env = "BM_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,
}

impl Cli {
    /// Overrides the values in `config` with any that were given on the command line.
    pub fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(address) = self.run_address {
            config.run_address = normalize_run_address(&address);
        }
        if let Some(address) = self.accrual_address {
            config.accrual_address = address;
        }
        if let Some(uri) = self.database_uri {
            config.database_url = uri;
        }
        if let Some(secret) = self.jwt_secret.filter(|s| !s.trim().is_empty()) {
            config.auth.set_secret(secret.trim());
        }
        config
    }
}
