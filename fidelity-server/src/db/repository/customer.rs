//! Customer Repository

use super::{RepoError, RepoResult};
use shared::models::Customer;
use sqlx::SqlitePool;

pub(crate) const CUSTOMER_SELECT: &str = "SELECT phone, name, level, points, total_spent, rewards_claimed, last_reward_at, last_activity_at, registered_at, profile_image FROM customer";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} ORDER BY registered_at DESC");
    let rows = sqlx::query_as::<_, Customer>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_phone(pool: &SqlitePool, phone: &str) -> RepoResult<Option<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE phone = ?");
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(phone)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert a fresh customer record. `phone` must already be canonical.
/// Duplicate phone surfaces as [`RepoError::Duplicate`] (unique constraint).
pub async fn create(pool: &SqlitePool, name: &str, phone: &str) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "INSERT INTO customer (phone, name, level, points, total_spent, rewards_claimed, registered_at) VALUES (?1, ?2, 1, 0, 0, 0, ?3)",
    )
    .bind(phone)
    .bind(name)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        Err(e) => {
            return match RepoError::from(e) {
                RepoError::Duplicate(_) => Err(RepoError::Duplicate(format!(
                    "Customer {phone} already registered"
                ))),
                other => Err(other),
            };
        }
    }

    find_by_phone(pool, phone)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

pub async fn update_profile_image(
    pool: &SqlitePool,
    phone: &str,
    profile_image: Option<&str>,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE customer SET profile_image = ?1, last_activity_at = ?2 WHERE phone = ?3",
    )
    .bind(profile_image)
    .bind(now)
    .bind(phone)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {phone} not found")));
    }
    Ok(())
}
