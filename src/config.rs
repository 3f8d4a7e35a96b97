use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// Upper bound applied to every store call made by the scheduling service.
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let store_timeout_ms: u64 = env::var("STORE_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .expect("STORE_TIMEOUT_MS must be a number");

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            store_timeout: Duration::from_millis(store_timeout_ms),
        }
    }
}
