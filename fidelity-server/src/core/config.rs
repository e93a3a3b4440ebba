//! Server Configuration
//!
//! Every field can be overridden through an environment variable:
//!
//! | Variable      | Default              | Meaning                     |
//! |---------------|----------------------|-----------------------------|
//! | WORK_DIR      | /var/lib/fidelity    | Working directory           |
//! | HTTP_PORT     | 3000                 | HTTP API port               |
//! | DATABASE_PATH | {WORK_DIR}/fidelity.db | SQLite database file      |
//! | LOG_LEVEL     | info                 | tracing level               |
//! | LOG_DIR       | (unset)              | daily log files when set    |
//! | ENVIRONMENT   | development          | development \| production   |

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// SQLite database file path
    pub database_path: String,
    /// Log level for the tracing subscriber
    pub log_level: String,
    /// Optional directory for daily-rolled log files
    pub log_dir: Option<String>,
    /// Runtime environment: development | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/fidelity".into());
        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| format!("{work_dir}/fidelity.db"));
        Self {
            work_dir,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
