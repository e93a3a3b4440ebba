//! Shared types for the fidelity program
//!
//! Domain models and the pure loyalty rules (level thresholds, purchase
//! conversion, reward costs) used by both the server and any future client.

pub mod loyalty;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use loyalty::{
    CUSTOMER_LEVELS, POINTS_PER_STAMP, REWARD_COST_POINTS, STAMPS_FOR_FREE_ITEM,
    canonical_phone, generate_code, level_for_points, level_name, points_from_purchase,
};
