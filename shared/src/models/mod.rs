//! Domain Models

pub mod customer;
pub mod fidelity_code;

pub use customer::{Customer, CustomerCreate, CustomerIdentity};
pub use fidelity_code::{FidelityCode, FidelityCodeCreate};
