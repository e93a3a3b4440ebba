//! Fidelity Code Model

use serde::{Deserialize, Serialize};

/// Single-use redemption code bound to one customer at issuance.
///
/// Transitions `used = false → true` exactly once (compare-and-set on the
/// unique `code` key) and is never deleted - redeemed codes are the stamp
/// ledger's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FidelityCode {
    pub code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub used: bool,
    pub used_at: Option<i64>,
    pub created_at: i64,
}

/// Code issuance payload (administrator action)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FidelityCodeCreate {
    pub customer_name: String,
    pub customer_phone: String,
}
