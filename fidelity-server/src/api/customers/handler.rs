//! Customer API Handlers
//!
//! Expected, user-correctable outcomes (insufficient points, unknown
//! customer during authentication) come back as plain response data or 404;
//! precondition violations and infrastructure failures flow through
//! [`AppError`].

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::loyalty;
use crate::utils::{AppError, AppResult};
use shared::loyalty::{REWARD_COST_POINTS, STAMPS_FOR_FREE_ITEM, level_name};
use shared::models::{Customer, CustomerCreate, CustomerIdentity};

/// Look up a customer or 404 - shared by the per-customer routes.
async fn require_customer(state: &ServerState, phone: &str) -> AppResult<Customer> {
    loyalty::authenticate_customer(&state.pool, phone)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {phone}")))
}

/// GET /api/customers - list all customers (administrator view)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Customer>>> {
    let customers = crate::db::repository::customer::find_all(&state.pool).await?;
    Ok(Json(customers))
}

/// POST /api/customers - register a new customer (409 on duplicate phone)
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let customer = loyalty::register_customer(&state.pool, &payload.name, &payload.phone).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// POST /api/customers/authenticate - identification lookup by phone
pub async fn authenticate(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerIdentity>,
) -> AppResult<Json<Customer>> {
    let customer = require_customer(&state, &payload.phone).await?;
    Ok(Json(customer))
}

/// Stamp ledger status for one customer
#[derive(Serialize)]
pub struct StampStatus {
    pub stamps: i64,
    pub stamps_required: i64,
    pub can_claim_free_item: bool,
}

/// GET /api/customers/{phone}/stamps - stamp count + free-item gate
pub async fn stamps(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
) -> AppResult<Json<StampStatus>> {
    let customer = require_customer(&state, &phone).await?;
    let stamps = loyalty::stamp_count(&state.pool, &customer.name, &customer.phone).await?;
    Ok(Json(StampStatus {
        stamps,
        stamps_required: STAMPS_FOR_FREE_ITEM,
        can_claim_free_item: stamps >= STAMPS_FOR_FREE_ITEM,
    }))
}

#[derive(Serialize)]
pub struct ResetOutcome {
    pub reset: i64,
}

/// POST /api/customers/{phone}/stamps/reset - administrative reset.
/// Flips the used codes back and reverses their point credits.
pub async fn reset_stamps(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
) -> AppResult<Json<ResetOutcome>> {
    let customer = require_customer(&state, &phone).await?;
    let reset = loyalty::reset_stamps(&state.pool, &customer.name, &customer.phone).await?;
    Ok(Json(ResetOutcome { reset }))
}

#[derive(Deserialize)]
pub struct PointsPayload {
    pub points: i64,
}

/// POST /api/customers/{phone}/points - direct point credit (integrations)
pub async fn credit_points(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
    Json(payload): Json<PointsPayload>,
) -> AppResult<Json<Customer>> {
    let customer = loyalty::credit_points(&state.pool, &phone, payload.points).await?;
    Ok(Json(customer))
}

#[derive(Deserialize)]
pub struct PurchasePayload {
    pub amount: f64,
}

/// POST /api/customers/{phone}/purchases - convert a purchase to points
/// (422 when the amount is below the conversion minimum)
pub async fn credit_purchase(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
    Json(payload): Json<PurchasePayload>,
) -> AppResult<Json<Customer>> {
    let customer = loyalty::credit_purchase(&state.pool, &phone, payload.amount).await?;
    Ok(Json(customer))
}

/// Points-based reward outcome
#[derive(Serialize)]
pub struct RewardOutcome {
    pub claimed: bool,
    pub points: i64,
    pub level: i64,
    pub level_name: &'static str,
    /// Points still missing when the claim was refused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_missing: Option<i64>,
}

/// POST /api/customers/{phone}/rewards - spend 100 points on a reward.
/// Insufficient balance is a normal outcome: `claimed = false` plus how many
/// points are missing, never an error status.
pub async fn claim_reward(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
) -> AppResult<Json<RewardOutcome>> {
    let claimed = loyalty::claim_reward(&state.pool, &phone).await?;
    let customer = require_customer(&state, &phone).await?;
    Ok(Json(RewardOutcome {
        claimed,
        points: customer.points,
        level: customer.level,
        level_name: level_name(customer.level),
        points_missing: (!claimed).then(|| REWARD_COST_POINTS - customer.points),
    }))
}

#[derive(Serialize, Deserialize)]
pub struct ProfileImagePayload {
    pub profile_image: Option<String>,
}

/// GET /api/customers/{phone}/profile-image
pub async fn get_profile_image(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
) -> AppResult<Json<ProfileImagePayload>> {
    let customer = require_customer(&state, &phone).await?;
    Ok(Json(ProfileImagePayload {
        profile_image: customer.profile_image,
    }))
}

/// PUT /api/customers/{phone}/profile-image - set or clear
pub async fn set_profile_image(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
    Json(payload): Json<ProfileImagePayload>,
) -> AppResult<Json<ProfileImagePayload>> {
    let customer = require_customer(&state, &phone).await?;
    crate::db::repository::customer::update_profile_image(
        &state.pool,
        &customer.phone,
        payload.profile_image.as_deref(),
    )
    .await?;
    Ok(Json(payload))
}
