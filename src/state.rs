use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::payment::PaymentGateway;

/// Shared per-process state handed to handlers via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: PgPool,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(config: AppConfig, db: PgPool, payments: Arc<dyn PaymentGateway>) -> Self {
        Self {
            config: Arc::new(config),
            db,
            payments,
        }
    }
}
