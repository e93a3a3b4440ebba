//! Fidelity Code Repository

use super::{RepoError, RepoResult};
use shared::models::FidelityCode;
use sqlx::SqlitePool;

const CODE_SELECT: &str =
    "SELECT code, customer_name, customer_phone, used, used_at, created_at FROM fidelity_code";

/// Listing filter for the administrator views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeFilter {
    All,
    Used,
    Unused,
}

pub async fn find(pool: &SqlitePool, filter: CodeFilter) -> RepoResult<Vec<FidelityCode>> {
    let sql = match filter {
        CodeFilter::All => format!("{CODE_SELECT} ORDER BY created_at DESC"),
        CodeFilter::Used => format!("{CODE_SELECT} WHERE used = 1 ORDER BY created_at DESC"),
        CodeFilter::Unused => format!("{CODE_SELECT} WHERE used = 0 ORDER BY created_at DESC"),
    };
    let rows = sqlx::query_as::<_, FidelityCode>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<FidelityCode>> {
    let sql = format!("{CODE_SELECT} WHERE code = ?");
    let row = sqlx::query_as::<_, FidelityCode>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert a new unused code. The PRIMARY KEY on `code` rejects collisions as
/// [`RepoError::Duplicate`], which the issuing service retries with a fresh
/// code rather than overwriting.
pub async fn insert(
    pool: &SqlitePool,
    code: &str,
    customer_name: &str,
    customer_phone: &str,
) -> RepoResult<FidelityCode> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO fidelity_code (code, customer_name, customer_phone, used, created_at) VALUES (?1, ?2, ?3, 0, ?4)",
    )
    .bind(code)
    .bind(customer_name)
    .bind(customer_phone)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_code(pool, code)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create fidelity code".into()))
}

/// Count of redeemed codes for a customer - the stamp ledger is this derived
/// view, not a separate counter.
pub async fn count_used(pool: &SqlitePool, name: &str, phone: &str) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM fidelity_code WHERE customer_name = ?1 AND customer_phone = ?2 AND used = 1",
    )
    .bind(name)
    .bind(phone)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
