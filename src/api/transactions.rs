use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::balance::validated_user;
use crate::api::AppState;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub user: String,
    pub transaction_count: i64,
    pub transactions: Vec<TransactionDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub event_key: String,
    pub tx_type: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<i64>,
    pub status: String,
    pub created_at_ms: i64,
}

/// Mirrored transactions for a user, newest first.
pub async fn get_transactions(
    Query(params): Query<TransactionsQuery>,
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let user = validated_user(&params.user)?;

    let rows = state.repo.get_transactions(user).await?;
    let transaction_count = rows.len() as i64;
    let transactions = rows
        .into_iter()
        .map(|t| TransactionDto {
            event_key: t.event_key,
            tx_type: t.tx_type,
            amount: t.amount.to_canonical_string(),
            property_id: t.property_id,
            status: t.status,
            created_at_ms: t.created_at_ms,
        })
        .collect();

    Ok(Json(TransactionsResponse {
        user: user.to_string(),
        transaction_count,
        transactions,
    }))
}
