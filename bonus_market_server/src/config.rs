use std::{env, fmt::Display, str::FromStr, time::Duration};

use bm_common::{parse_boolean_flag, Secret};
use bonus_market_engine::{
    accrual::DEFAULT_ACCRUAL_TIMEOUT,
    reconciliation::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT},
};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_RUN_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_ACCRUAL_ADDRESS: &str = "http://127.0.0.1:8081";
const DEFAULT_DATABASE_URL: &str = "sqlite://data/bonus_market.db";
const DEFAULT_TOKEN_LIFETIME: chrono::Duration = chrono::Duration::hours(10);
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// The `host:port` the HTTP server listens on. A bare `:port` listens on all interfaces.
    pub run_address: String,
    /// Base URL of the accrual service.
    pub accrual_address: String,
    pub database_url: String,
    pub auth: AuthConfig,
    /// The number of reconciliation workers.
    pub worker_count: usize,
    /// How many orders can wait for a worker before order uploads start to block.
    pub queue_capacity: usize,
    /// Per-request timeout for calls to the accrual service.
    pub accrual_timeout: Duration,
    /// Re-queue unfinished orders and repair missing credits when the server starts.
    pub recover_on_startup: bool,
    pub db_max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            run_address: DEFAULT_RUN_ADDRESS.to_string(),
            accrual_address: DEFAULT_ACCRUAL_ADDRESS.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            accrual_timeout: DEFAULT_ACCRUAL_TIMEOUT,
            recover_on_startup: true,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        }
    }
}

impl ServerConfig {
    pub fn new(run_address: &str) -> Self {
        Self { run_address: normalize_run_address(run_address), ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let run_address = env::var("RUN_ADDRESS").map(|s| normalize_run_address(&s)).unwrap_or_else(|_| {
            info!("🪛️ RUN_ADDRESS is not set. Listening on {DEFAULT_RUN_ADDRESS}.");
            DEFAULT_RUN_ADDRESS.to_string()
        });
        let accrual_address = env::var("ACCRUAL_SYSTEM_ADDRESS").unwrap_or_else(|_| {
            warn!("🪛️ ACCRUAL_SYSTEM_ADDRESS is not set. Using {DEFAULT_ACCRUAL_ADDRESS}.");
            DEFAULT_ACCRUAL_ADDRESS.to_string()
        });
        let database_url = env::var("DATABASE_URI").unwrap_or_else(|_| {
            info!("🪛️ DATABASE_URI is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            info!("🪛️ Could not load the authentication configuration from environment variables. {e}");
            AuthConfig::default()
        });
        let worker_count = env_or_default("BM_WORKER_COUNT", DEFAULT_WORKER_COUNT);
        let queue_capacity = env_or_default("BM_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY);
        let accrual_timeout =
            Duration::from_secs(env_or_default("BM_ACCRUAL_TIMEOUT", DEFAULT_ACCRUAL_TIMEOUT.as_secs()));
        let recover_on_startup = parse_boolean_flag(env::var("BM_RECOVER_ON_STARTUP").ok(), true);
        let db_max_connections = env_or_default("BM_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        Self {
            run_address,
            accrual_address,
            database_url,
            auth,
            worker_count,
            queue_capacity,
            accrual_timeout,
            recover_on_startup,
            db_max_connections,
        }
    }
}

/// Reads and parses an environment variable, falling back to `default` if it is missing or invalid.
fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ Invalid configuration value for {name} ({s}). {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
    }
}

/// `:8080` means "all interfaces, port 8080".
pub fn normalize_run_address(address: &str) -> String {
    let address = address.trim();
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    /// How long an access token stays valid after login.
    pub token_lifetime: chrono::Duration,
    /// Set when no secret was configured and `jwt_secret` was generated for this session only.
    pub random_secret: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret), token_lifetime: DEFAULT_TOKEN_LIFETIME, random_secret: true }
    }
}

impl AuthConfig {
    pub fn new(secret: &str, token_lifetime: chrono::Duration) -> Self {
        Self { jwt_secret: Secret::new(secret.to_string()), token_lifetime, random_secret: false }
    }

    /// Replaces the signing secret with one supplied by the operator.
    pub fn set_secret(&mut self, secret: &str) {
        self.jwt_secret = Secret::new(secret.to_string());
        self.random_secret = false;
    }

    /// Logs a loud warning if the server is about to run with a per-session secret.
    pub fn warn_if_random_secret(&self) {
        if self.random_secret {
            warn!(
                "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate \
                 on production like this, since every user will be logged out when the server restarts. 🚨️🚨️🚨️"
            );
        }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("BM_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [BM_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("BM_JWT_SECRET is empty".to_string()));
        }
        let hours = env_or_default("BM_TOKEN_LIFETIME", DEFAULT_TOKEN_LIFETIME.num_hours());
        Ok(Self::new(secret.trim(), chrono::Duration::hours(hours)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn run_address_without_host() {
        assert_eq!(normalize_run_address(":8080"), "0.0.0.0:8080");
        assert_eq!(normalize_run_address(" localhost:8080 "), "localhost:8080");
        assert_eq!(ServerConfig::new(":9000").run_address, "0.0.0.0:9000");
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        env::set_var("BM_TEST_WORKER_COUNT", "lots");
        assert_eq!(env_or_default("BM_TEST_WORKER_COUNT", 10usize), 10);
        env::set_var("BM_TEST_WORKER_COUNT", " 4 ");
        assert_eq!(env_or_default("BM_TEST_WORKER_COUNT", 10usize), 4);
        assert_eq!(env_or_default("BM_TEST_NOT_SET", 7u32), 7);
    }

    #[test]
    fn random_secret_is_never_empty() {
        let config = AuthConfig::default();
        assert_eq!(config.jwt_secret.reveal().len(), 48);
        assert_eq!(format!("{:?}", config.jwt_secret), "****");
        assert_eq!(config.token_lifetime, chrono::Duration::hours(10));
        assert!(config.random_secret);
    }

    #[test]
    fn configured_secret_is_not_random() {
        assert!(!AuthConfig::new("s3cr3t", chrono::Duration::hours(1)).random_secret);
        let mut config = ServerConfig::new(":8080");
        assert!(config.auth.random_secret);
        config.auth.set_secret("from-the-command-line");
        assert!(!config.auth.random_secret);
        assert_eq!(config.auth.jwt_secret.reveal(), "from-the-command-line");
    }
}
