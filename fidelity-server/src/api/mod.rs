//! API route modules
//!
//! - [`health`] - liveness check
//! - [`customers`] - registration, identification, stamps, points, rewards
//! - [`codes`] - fidelity code issuance, listings and redemption

pub mod codes;
pub mod customers;
pub mod health;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
