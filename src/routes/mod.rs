// Routes module - builds the HTTP router
// Each sub-module handles a specific domain

pub mod ledger;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::app_state::SharedState;
use crate::handlers::*;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // ===== TOKEN LEDGER =====
        .route("/accounts", get(ledger::get_accounts))
        .route("/balance/:account", get(ledger::get_balance))
        .route("/approve", post(ledger::approve))
        .route("/transfer", post(ledger::transfer))
        .route("/ledger", get(ledger::get_ledger_activity))

        // ===== FIXED-PARTY ESCROW =====
        .route("/escrows/fixed", get(get_fixed_escrow))
        .route("/escrows/fixed/deposit", post(fixed_deposit))
        .route("/escrows/fixed/settle", post(fixed_settle))

        // ===== POOLED MARKET ESCROW =====
        .route("/escrows/pooled", get(get_pooled_escrow))
        .route("/escrows/pooled/deposit", post(pooled_deposit))
        .route("/escrows/pooled/settle", post(pooled_settle))

        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))

        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "BlackBook Escrow - Online"
}
