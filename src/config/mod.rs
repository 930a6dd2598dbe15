use serde::{Deserialize, Serialize};
use std::env;

/// Immutable application configuration, built once at startup from the
/// process environment and handed to components through axum `State`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payment: PaymentConfig,
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Signing key for short-lived access tokens.
    pub access_secret: String,
    /// Signing key for long-lived refresh tokens.
    pub refresh_secret: String,
    pub access_expiry_secs: i64,
    pub refresh_expiry_secs: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub stripe_secret_key: String,
    /// Overridable so tests can point the client at a stub server.
    pub api_base: String,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub default_page: i64,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env::var("DRAPEGEAR_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        if let Ok(v) = env::var("ACCESS_TOKEN_SECRET") {
            self.auth.access_secret = v;
        }
        if let Ok(v) = env::var("REFRESH_TOKEN_SECRET") {
            self.auth.refresh_secret = v;
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_EXPIRY_SECS") {
            self.auth.access_expiry_secs = v.parse().unwrap_or(self.auth.access_expiry_secs);
        }
        if let Ok(v) = env::var("REFRESH_TOKEN_EXPIRY_SECS") {
            self.auth.refresh_expiry_secs = v.parse().unwrap_or(self.auth.refresh_expiry_secs);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.auth.bcrypt_cost = v.parse().unwrap_or(self.auth.bcrypt_cost);
        }

        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            self.payment.stripe_secret_key = v;
        }
        if let Ok(v) = env::var("STRIPE_API_BASE") {
            self.payment.api_base = v;
        }

        if let Ok(v) = env::var("LISTING_DEFAULT_PAGE_SIZE") {
            self.listing.default_page_size = v.parse().unwrap_or(self.listing.default_page_size);
        }
        if let Ok(v) = env::var("LISTING_MAX_PAGE_SIZE") {
            self.listing.max_page_size = v.parse().unwrap_or(self.listing.max_page_size);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 5000 },
            database: DatabaseConfig {
                url: "postgres://localhost/drapegear".to_string(),
                max_connections: 10,
                connect_timeout_secs: 30,
            },
            auth: AuthConfig {
                // Dev-only fallbacks; real deployments override via env.
                access_secret: "drapegear-dev-access-secret".to_string(),
                refresh_secret: "drapegear-dev-refresh-secret".to_string(),
                access_expiry_secs: 60 * 60,
                refresh_expiry_secs: 7 * 24 * 60 * 60,
                bcrypt_cost: 10,
            },
            payment: PaymentConfig {
                stripe_secret_key: String::new(),
                api_base: "https://api.stripe.com".to_string(),
                currency: "usd".to_string(),
            },
            listing: ListingConfig {
                default_page: 1,
                default_page_size: 12,
                max_page_size: 100,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: "postgres://localhost/drapegear".to_string(),
                max_connections: 20,
                connect_timeout_secs: 10,
            },
            auth: AuthConfig {
                access_secret: String::new(),
                refresh_secret: String::new(),
                ..Self::development().auth
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "postgres://localhost/drapegear".to_string(),
                max_connections: 50,
                connect_timeout_secs: 5,
            },
            auth: AuthConfig {
                access_secret: String::new(),
                refresh_secret: String::new(),
                ..Self::development().auth
            },
            ..Self::development()
        }
    }
}
