//! Fidelity Code API Handlers

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::fidelity_code::{self, CodeFilter};
use crate::loyalty;
use crate::utils::{AppError, AppResult};
use shared::models::{FidelityCode, FidelityCodeCreate};

#[derive(Deserialize)]
pub struct ListQuery {
    /// `used` | `unused`; absent means all codes
    pub filter: Option<String>,
}

/// GET /api/codes?filter=used|unused - administrator listings
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<FidelityCode>>> {
    let filter = match query.filter.as_deref() {
        None => CodeFilter::All,
        Some("used") => CodeFilter::Used,
        Some("unused") => CodeFilter::Unused,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Unknown filter '{other}' (expected 'used' or 'unused')"
            )));
        }
    };
    let codes = fidelity_code::find(&state.pool, filter).await?;
    Ok(Json(codes))
}

/// POST /api/codes - issue a code bound to one customer (administrator)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<FidelityCodeCreate>,
) -> AppResult<(StatusCode, Json<FidelityCode>)> {
    let code = loyalty::issue_code(
        &state.pool,
        &payload.customer_name,
        &payload.customer_phone,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(code)))
}

#[derive(Deserialize)]
pub struct RedeemPayload {
    pub code: String,
    pub customer_name: String,
    pub customer_phone: String,
}

#[derive(Serialize)]
pub struct RedeemOutcome {
    pub redeemed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// POST /api/codes/redeem - redeem a code for a stamp.
///
/// A non-matching or already-used code is a normal outcome (200 with
/// `redeemed = false`), not an error status - the customer corrects and
/// retries.
pub async fn redeem(
    State(state): State<ServerState>,
    Json(payload): Json<RedeemPayload>,
) -> AppResult<Json<RedeemOutcome>> {
    let redeemed = loyalty::redeem_code(
        &state.pool,
        &payload.code,
        &payload.customer_name,
        &payload.customer_phone,
    )
    .await?;
    Ok(Json(RedeemOutcome {
        redeemed,
        message: (!redeemed).then_some("Code invalid or already used"),
    }))
}
