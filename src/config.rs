use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Unset means coordination runs on the in-process store; only safe for
    /// a single server instance.
    pub redis_url: Option<String>,
    pub jwt_key_path: String,
    pub jwt_previous_key_path: Option<String>,
    pub token_lifetime_minutes: i64,
    pub dedup_window_secs: u64,
    pub dedup_result_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://catnap.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let redis_url = env::var("REDIS_URL").ok();

        let jwt_key_path = env::var("JWT_KEY_PATH").map_err(|_| ConfigError::MissingJwtKeyPath)?;

        let jwt_previous_key_path = env::var("JWT_PREVIOUS_KEY_PATH").ok().filter(|p| !p.is_empty());

        let token_lifetime_minutes = env::var("TOKEN_LIFETIME_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let dedup_window_secs = env::var("DEDUP_WINDOW_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let dedup_result_ttl_secs = env::var("DEDUP_RESULT_TTL_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        Ok(Config {
            database_url,
            server_host,
            server_port,
            redis_url,
            jwt_key_path,
            jwt_previous_key_path,
            token_lifetime_minutes,
            dedup_window_secs,
            dedup_result_ttl_secs,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_KEY_PATH environment variable not set")]
    MissingJwtKeyPath,

    #[error("Invalid port number")]
    InvalidPort,
}
