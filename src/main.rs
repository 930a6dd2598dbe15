use std::sync::Arc;

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use drapegear_api::config::AppConfig;
use drapegear_api::database;
use drapegear_api::handlers::{protected, public};
use drapegear_api::middleware as mw;
use drapegear_api::services::payment::{PaymentGateway, StripeGateway};
use drapegear_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL and secrets.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("starting DrapeGear API in {:?} mode", config.environment);

    let pool = database::manager::connect(&config.database)
        .unwrap_or_else(|e| panic!("failed to configure database pool: {}", e));

    // Lazy pool: a missing database degrades /health instead of aborting.
    database::manager::migrate_best_effort(&pool).await;

    let payments: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(&config.payment));
    let port = config.server.port;
    let state = AppState::new(config, pool, payments);

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("DrapeGear API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(catalog_routes())
        // Protected API
        .merge(cart_routes(state.clone()))
        .merge(order_routes(state.clone()))
        .merge(payment_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(public::register))
        .route("/auth/login", post(public::login))
        .route("/auth/refresh", post(public::refresh))
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(public::list_products))
        .route("/products/facets", get(public::product_facets))
        .route("/wishlist", post(public::resolve_wishlist))
}

fn cart_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(protected::cart::get_cart).post(protected::cart::add_to_cart))
        .route(
            "/api/cart/:id",
            patch(protected::cart::update_cart_item).delete(protected::cart::remove_cart_item),
        )
        .layer(from_fn_with_state(state.clone(), mw::require_role::require_user))
        .layer(from_fn_with_state(state, mw::auth::verify_token))
}

fn order_routes(state: AppState) -> Router<AppState> {
    // Listing is open to both roles; the handler branches on the stored role.
    Router::new()
        .route("/api/orders", get(protected::orders::list_orders))
        .layer(from_fn_with_state(state.clone(), mw::require_role::attach_current_user))
        .merge(
            Router::new()
                .route("/api/orders", post(protected::orders::create_order))
                .layer(from_fn_with_state(state.clone(), mw::require_role::require_user)),
        )
        .layer(from_fn_with_state(state, mw::auth::verify_token))
}

fn payment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/payments/intent", post(protected::payments::create_intent))
        .layer(from_fn_with_state(state.clone(), mw::require_role::require_user))
        .layer(from_fn_with_state(state, mw::auth::verify_token))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/products", post(protected::products_admin::create_product))
        .route(
            "/api/products/:id",
            patch(protected::products_admin::update_product)
                .delete(protected::products_admin::delete_product),
        )
        .layer(from_fn_with_state(state.clone(), mw::require_role::require_admin))
        .layer(from_fn_with_state(state, mw::auth::verify_token))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "DrapeGear API",
            "version": version,
            "description": "Storefront backend: catalog, cart, wishlist, checkout",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login, /auth/refresh (public)",
                "catalog": "/products, /products/facets, /wishlist (public)",
                "cart": "/api/cart[/:id] (user)",
                "orders": "/api/orders (authenticated)",
                "payments": "/api/payments/intent (user)",
                "admin": "/api/products[/:id] (admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::health_check(&state.db).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "message": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
