//! Fidelity Server
//!
//! Loyalty program backend for the restaurant ordering site: customers keyed
//! by phone number earn stamps by redeeming single-use `FID-XXXXXX` codes,
//! accumulate points (10 per stamp, 1 per 10 currency units spent) and spend
//! 100 points on rewards. The tier level (1-5) is always derived from the
//! point balance.

pub mod api;
pub mod core;
pub mod db;
pub mod loyalty;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use utils::logger::init_logger_with_file;
