//! Equipment domain module.
//!
//! This crate contains the business rules for the controlled equipment
//! ledger (firearms, ballistic vests, ammunition), implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod allocation;
pub mod equipment;
pub mod guard;

pub use allocation::Allocation;
pub use equipment::{Equipment, EquipmentUpdate, NewEquipment, ReturnOutcome};
pub use guard::{ConsistencyGuard, EquipmentCategory, ReturnEffect, Shape};
