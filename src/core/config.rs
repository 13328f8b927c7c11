use dotenv::dotenv;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "un segreto meno bello";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub connection_lifetime_secs: u64,
    pub app_env: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub allowed_origins: Vec<String>,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Come `from_env`, ma legge i valori da `lookup` (usato nei test)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| "DATABASE_URL must be set in .env file".to_string())?;

        // il default viene segnalato da print_info, a tracing inizializzato
        let jwt_secret = var("JWT_SECRET", DEFAULT_JWT_SECRET);

        let jwt_expires_in = parse_duration(&var("JWT_EXPIRES_IN", "24h"))
            .map_err(|e| format!("Invalid JWT_EXPIRES_IN: {e}"))?;

        let server_host = var("SERVER_HOST", "127.0.0.1");

        let server_port = var("SERVER_PORT", "8080")
            .parse::<u16>()
            .map_err(|_| "Invalid SERVER_PORT: must be a number between 0-65535".to_string())?;

        let max_connections = var("MAX_DB_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|_| "Invalid MAX_DB_CONNECTIONS: must be a positive number".to_string())?;

        let connection_lifetime_secs = var("DB_CONNECTION_LIFETIME_SECS", "1800")
            .parse::<u64>()
            .map_err(|_| "Invalid DB_CONNECTION_LIFETIME_SECS: must be a positive number".to_string())?;

        let app_env = var("APP_ENV", "development");

        let log_level = var("LOG_LEVEL", "info");

        let log_format = match var("LOG_FORMAT", "text").to_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => return Err(format!("Invalid LOG_FORMAT: '{other}' (expected text or json)")),
        };

        let allowed_origins = var("ALLOWED_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        let bcrypt_cost = var("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())
            .parse::<u32>()
            .ok()
            .filter(|c| (4..=31).contains(c))
            .ok_or_else(|| "Invalid BCRYPT_COST: must be a number between 4-31".to_string())?;

        let config = Config {
            database_url,
            jwt_secret,
            jwt_expires_in,
            server_host,
            server_port,
            max_connections,
            connection_lifetime_secs,
            app_env,
            log_level,
            log_format,
            allowed_origins,
            bcrypt_cost,
        };

        if config.is_production() && config.jwt_secret == DEFAULT_JWT_SECRET {
            return Err("JWT_SECRET must be set when APP_ENV=production".to_string());
        }
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        info!("Server Configuration:");
        info!("   Environment: {}", self.app_env);
        info!("   Server Address: {}:{}", self.server_host, self.server_port);
        info!("   Database: {}", Self::mask_url(&self.database_url));
        info!("   Max DB Connections: {}", self.max_connections);
        info!("   Connection Lifetime: {}s", self.connection_lifetime_secs);
        info!("   Token Lifetime: {:?}", self.jwt_expires_in);
        info!("   Allowed Origins: {}", self.allowed_origins.join(", "));
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("   JWT Secret: USING DEFAULT (INSECURE!)");
        } else {
            info!("   JWT Secret: custom secret configured");
        }
    }

    /// Maschera l'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        "***".to_string()
    }
}

/// Interpreta durate tipo `24h`, `30m`, `15s`, `500ms`, `7d`; un numero senza
/// suffisso vale come secondi.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);

    let amount: u64 = amount
        .parse()
        .map_err(|_| format!("'{value}' is not a valid duration"))?;

    let seconds_per_unit: u64 = match unit {
        "ms" => return non_zero(Duration::from_millis(amount)),
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        _ => return Err(format!("unknown unit in '{value}'")),
    };

    let seconds = amount
        .checked_mul(seconds_per_unit)
        .ok_or_else(|| format!("'{value}' is too large"))?;
    non_zero(Duration::from_secs(seconds))
}

fn non_zero(duration: Duration) -> Result<Duration, String> {
    if duration.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(duration)
}
