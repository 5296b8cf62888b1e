use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::Decimal;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub user: String,
    pub brx_balance: String,
}

/// Mirrored balance for a user; 0 when never reconciled.
pub async fn get_balance(
    Query(params): Query<BalanceQuery>,
    State(state): State<AppState>,
) -> Result<Json<BalanceResponse>, AppError> {
    let user = validated_user(&params.user)?;

    let balance = state
        .repo
        .get_balance(user)
        .await?
        .unwrap_or_else(Decimal::zero);

    Ok(Json(BalanceResponse {
        user: user.to_string(),
        brx_balance: balance.to_canonical_string(),
    }))
}

pub(crate) fn validated_user(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("user must be non-empty".into()));
    }
    Ok(trimmed)
}
