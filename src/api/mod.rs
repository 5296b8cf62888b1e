pub mod balance;
pub mod events;
pub mod health;
pub mod positions;
pub mod transactions;

use crate::db::MirrorRepository;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<MirrorRepository>,
}

pub fn create_router(state: AppState) -> Router {
    // Webhook deliveries come from the external event source's origin;
    // everything is open per the published contract.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/webhook/events", post(events::handle_event))
        .route("/v1/balance", get(balance::get_balance))
        .route("/v1/positions", get(positions::get_positions))
        .route("/v1/transactions", get(transactions::get_transactions))
        .layer(cors)
        .with_state(state)
}
