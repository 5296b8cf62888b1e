use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::balance::validated_user;
use crate::api::AppState;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct PositionsQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsResponse {
    pub user: String,
    pub positions: Vec<PositionDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    pub property_id: i64,
    pub brx_invested: String,
    pub tokens_owned: String,
}

/// Mirrored positions for a user, ordered by property id.
pub async fn get_positions(
    Query(params): Query<PositionsQuery>,
    State(state): State<AppState>,
) -> Result<Json<PositionsResponse>, AppError> {
    let user = validated_user(&params.user)?;

    let positions = state
        .repo
        .get_positions(user)
        .await?
        .into_iter()
        .map(|p| PositionDto {
            property_id: p.property_id,
            brx_invested: p.brx_invested.to_canonical_string(),
            tokens_owned: p.tokens_owned.to_canonical_string(),
        })
        .collect();

    Ok(Json(PositionsResponse {
        user: user.to_string(),
        positions,
    }))
}
