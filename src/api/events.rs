//! Reconciliation webhook: applies finalized blockchain events to the
//! server-side mirror.

use crate::api::AppState;
use crate::db::JournalEntry;
use crate::domain::{BlockchainEvent, Decimal, EventKind, TimeMs};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub event: BlockchainEvent,
    pub chain_id: i64,
    pub contract_address: String,
}

#[derive(Debug, Error)]
enum EventError {
    #[error("malformed event payload: {0}")]
    Malformed(String),
    #[error("missing required field {0} for {1} event")]
    MissingField(&'static str, EventKind),
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

/// POST /webhook/events
///
/// The body is read as raw bytes and parsed here so invalid JSON and
/// unrecognized events map to the contract's 500 `{ success: false,
/// error }` shape instead of a framework extractor rejection.
pub async fn handle_event(State(state): State<AppState>, body: Bytes) -> Response {
    let payload = match serde_json::from_slice::<WebhookPayload>(&body) {
        Ok(p) => p,
        Err(e) => return failure(EventError::Malformed(e.to_string())),
    };

    let event_type = payload.event.event_type;
    let result = dispatch(&state, &payload).await;
    // The journal records every parsed delivery, failed dispatches included.
    journal(&state, &payload).await;

    match result {
        Ok(message) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": message,
                "eventType": event_type.to_string(),
            })),
        )
            .into_response(),
        Err(e) => failure(e),
    }
}

fn failure(error: EventError) -> Response {
    warn!(error = %error, "webhook event rejected");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": error.to_string(),
        })),
    )
        .into_response()
}

/// Apply the event to the mirror.
///
/// Each `apply_*` call commits the event-keyed replay guard and the
/// mutation in one transaction, so a replayed delivery (at-least-once
/// source) skips the mutation and a storage failure leaves neither half
/// behind.
async fn dispatch(state: &AppState, payload: &WebhookPayload) -> Result<String, EventError> {
    let event = &payload.event;
    let kind = event.event_type;
    let event_key = event.event_key();
    let user = event.user_address.as_str();
    let now_ms = TimeMs::now().as_ms();

    match kind {
        EventKind::TokenExchange => {
            let brx = require(event.data.brx_amount, "brxAmount", kind)?;
            let fresh = state
                .repo
                .apply_token_exchange(&event_key, user, brx, now_ms)
                .await?;
            if !fresh {
                return Ok(already_processed(&event_key));
            }
            info!(user = %user, amount = %brx, "token exchange reconciled");
            Ok("Token exchange processed".to_string())
        }
        EventKind::PropertyInvestment => {
            let brx = require(event.data.brx_amount, "brxAmount", kind)?;
            let property_id = event
                .data
                .property_id
                .ok_or(EventError::MissingField("propertyId", kind))?;
            let fresh = state
                .repo
                .apply_property_investment(
                    &event_key,
                    user,
                    property_id,
                    brx,
                    event.data.token_amount,
                    now_ms,
                )
                .await?;
            if !fresh {
                return Ok(already_processed(&event_key));
            }
            info!(user = %user, property_id, amount = %brx, "property investment reconciled");
            Ok("Property investment processed".to_string())
        }
        EventKind::PropertyWithdrawal => {
            let brx = require(event.data.brx_amount, "brxAmount", kind)?;
            let property_id = event
                .data
                .property_id
                .ok_or(EventError::MissingField("propertyId", kind))?;
            let remaining = match state
                .repo
                .apply_property_withdrawal(
                    &event_key,
                    user,
                    property_id,
                    brx,
                    event.data.token_amount,
                    now_ms,
                )
                .await?
            {
                Some(remaining) => remaining,
                None => return Ok(already_processed(&event_key)),
            };
            info!(
                user = %user,
                property_id,
                amount = %brx,
                remaining = %remaining,
                "property withdrawal reconciled"
            );
            Ok("Property withdrawal processed".to_string())
        }
    }
}

/// Journal the raw event. Attempted for every parsed delivery whether or
/// not the dispatch succeeded; a failure here is logged but never fails
/// the request.
async fn journal(state: &AppState, payload: &WebhookPayload) {
    let event = &payload.event;
    let entry = JournalEntry {
        event_key: event.event_key(),
        event_type: event.event_type.to_string(),
        user_address: event.user_address.clone(),
        transaction_hash: Some(event.transaction_hash.clone()).filter(|h| !h.trim().is_empty()),
        block_number: event.block_number,
        chain_id: payload.chain_id,
        contract_address: payload.contract_address.clone(),
        event_data: serde_json::to_string(&event.data).unwrap_or_else(|_| "{}".to_string()),
        processed_at_ms: TimeMs::now().as_ms(),
    };

    if let Err(e) = state.repo.insert_journal_entry(&entry).await {
        warn!(event_key = %entry.event_key, error = %e, "event journal insert failed");
    }
}

fn require(
    value: Option<Decimal>,
    field: &'static str,
    kind: EventKind,
) -> Result<Decimal, EventError> {
    value.ok_or(EventError::MissingField(field, kind))
}

fn already_processed(event_key: &str) -> String {
    info!(event_key = %event_key, "replayed event skipped");
    "Event already processed".to_string()
}
