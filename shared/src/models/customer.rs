//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer entity - keyed by canonical (digits-only) phone number.
///
/// `level` is always the deterministic function of `points`
/// ([`crate::loyalty::level_for_points`]); no code path persists a level
/// inconsistent with the current balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub phone: String,
    pub name: String,
    pub level: i64,
    pub points: i64,
    pub total_spent: f64,
    pub rewards_claimed: i64,
    pub last_reward_at: Option<i64>,
    pub last_activity_at: Option<i64>,
    pub registered_at: i64,
    pub profile_image: Option<String>,
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub phone: String,
}

/// Name + phone pair presented by a customer for identification.
///
/// Not a security boundary - matching the stored phone is the whole check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub name: String,
    pub phone: String,
}
