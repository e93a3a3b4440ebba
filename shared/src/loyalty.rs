//! Loyalty Rules
//!
//! Pure functions and constants for the fidelity program: level thresholds,
//! purchase-to-points conversion and code generation. No I/O here - the
//! server composes these with the repositories.

use thiserror::Error;

/// Points credited per redeemed fidelity code (one stamp).
pub const POINTS_PER_STAMP: i64 = 10;

/// Cost of one points-based reward redemption.
pub const REWARD_COST_POINTS: i64 = 100;

/// Stamps required for the stamp-based free item gate.
///
/// Independent from the 100-point redemption; the two gates never interact.
pub const STAMPS_FOR_FREE_ITEM: i64 = 5;

/// Currency units per point when converting a purchase.
const CURRENCY_UNITS_PER_POINT: f64 = 10.0;

/// Level tiers: (minimum points, level, display name).
pub const CUSTOMER_LEVELS: [(i64, i64, &str); 5] = [
    (1000, 5, "Diamante"),
    (500, 4, "Ouro"),
    (250, 3, "Prata"),
    (100, 2, "Bronze"),
    (0, 1, "Iniciante"),
];

/// Loyalty rule violations surfaced to callers as explicit errors.
#[derive(Debug, Error, PartialEq)]
pub enum LoyaltyError {
    /// Purchase too small to yield any points (amount below 10 currency units)
    #[error("insufficient purchase value to add points: {amount}")]
    InsufficientPurchase { amount: f64 },
}

/// Derive the customer level (1-5) from a point balance.
///
/// Boundaries are inclusive-lower: exactly 100 points is level 2, exactly
/// 1000 points is level 5. Level 5 is the maximum regardless of balance.
pub fn level_for_points(points: i64) -> i64 {
    for (min, level, _) in CUSTOMER_LEVELS {
        if points >= min {
            return level;
        }
    }
    1
}

/// Display name for a level (1-5). Out-of-range levels fall back to level 1.
pub fn level_name(level: i64) -> &'static str {
    CUSTOMER_LEVELS
        .iter()
        .find(|(_, l, _)| *l == level)
        .map(|(_, _, name)| *name)
        .unwrap_or("Iniciante")
}

/// Convert a purchase amount to points: 1 point per 10 currency units,
/// floor division. Amounts below 10 yield no points and are rejected as an
/// explicit error rather than a silent no-op.
pub fn points_from_purchase(amount: f64) -> Result<i64, LoyaltyError> {
    let points = (amount / CURRENCY_UNITS_PER_POINT).floor() as i64;
    if points <= 0 {
        return Err(LoyaltyError::InsufficientPurchase { amount });
    }
    Ok(points)
}

/// Canonicalize a phone number to digits only - the single natural key for
/// all loyalty state.
pub fn canonical_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

const CODE_PREFIX: &str = "FID-";
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_RANDOM_LEN: usize = 6;

/// Generate a fidelity code: `FID-` + 6 characters drawn uniformly from
/// `[A-Z0-9]`. Uniqueness is enforced by the persistence layer (PRIMARY KEY
/// on `code`); callers retry on collision.
pub fn generate_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(CODE_PREFIX.len() + CODE_RANDOM_LEN);
    code.push_str(CODE_PREFIX);
    for _ in 0..CODE_RANDOM_LEN {
        let idx = rng.gen_range(0..CODE_ALPHABET.len());
        code.push(CODE_ALPHABET[idx] as char);
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_points(0), 1);
        assert_eq!(level_for_points(99), 1);
        assert_eq!(level_for_points(100), 2);
        assert_eq!(level_for_points(249), 2);
        assert_eq!(level_for_points(250), 3);
        assert_eq!(level_for_points(499), 3);
        assert_eq!(level_for_points(500), 4);
        assert_eq!(level_for_points(999), 4);
        assert_eq!(level_for_points(1000), 5);
        assert_eq!(level_for_points(5000), 5);
    }

    #[test]
    fn level_is_monotonic() {
        let mut last = 0;
        for p in 0..1500 {
            let level = level_for_points(p);
            assert!(level >= last, "level decreased at {p} points");
            last = level;
        }
    }

    #[test]
    fn level_names() {
        assert_eq!(level_name(1), "Iniciante");
        assert_eq!(level_name(2), "Bronze");
        assert_eq!(level_name(3), "Prata");
        assert_eq!(level_name(4), "Ouro");
        assert_eq!(level_name(5), "Diamante");
        // unknown level falls back
        assert_eq!(level_name(9), "Iniciante");
    }

    #[test]
    fn purchase_conversion_floors() {
        assert_eq!(points_from_purchase(95.0), Ok(9));
        assert_eq!(points_from_purchase(10.0), Ok(1));
        assert_eq!(points_from_purchase(19.99), Ok(1));
        assert_eq!(points_from_purchase(100.0), Ok(10));
    }

    #[test]
    fn purchase_below_minimum_is_error() {
        assert_eq!(
            points_from_purchase(5.0),
            Err(LoyaltyError::InsufficientPurchase { amount: 5.0 })
        );
        assert!(points_from_purchase(0.0).is_err());
        assert!(points_from_purchase(9.99).is_err());
    }

    #[test]
    fn code_format() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 10);
            assert!(code.starts_with("FID-"));
            assert!(
                code[4..]
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn phone_canonicalization() {
        assert_eq!(canonical_phone("11988887777"), "11988887777");
        assert_eq!(canonical_phone("(11) 98888-7777"), "11988887777");
        assert_eq!(canonical_phone("+55 11 98888 7777"), "5511988887777");
    }
}
