use std::env;
use std::net::SocketAddr;

use axum::http::HeaderValue;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub cors_origin: HeaderValue,
    /// Upper bound on waiting for a pool connection; a stall surfaces as a
    /// retryable storage error instead of a hung request.
    pub db_acquire_timeout_secs: u64,
    pub sweep_interval_secs: u64,
    pub sweep_batch_size: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or("127.0.0.1:3001".to_string())
            .parse()
            .expect("BIND_ADDR must be a valid socket address");

        let cors_origin: HeaderValue = env::var("CORS_ORIGIN")
            .unwrap_or("http://localhost:3000".to_string())
            .parse()
            .expect("CORS_ORIGIN must be a valid header value");

        let db_acquire_timeout_secs: u64 = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or("5".to_string())
            .parse()
            .expect("DB_ACQUIRE_TIMEOUT_SECS must be a valid number");

        let sweep_interval_secs: u64 = env::var("SWEEP_INTERVAL_SECS")
            .unwrap_or("60".to_string())
            .parse()
            .expect("SWEEP_INTERVAL_SECS must be a valid number");

        let sweep_batch_size: i64 = env::var("SWEEP_BATCH_SIZE")
            .unwrap_or("500".to_string())
            .parse()
            .expect("SWEEP_BATCH_SIZE must be a valid number");

        Self {
            bind_addr,
            database_url,
            cors_origin,
            db_acquire_timeout_secs,
            sweep_interval_secs,
            sweep_batch_size,
        }
    }
}
