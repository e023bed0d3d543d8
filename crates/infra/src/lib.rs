//! `sentinela-infra` — persistence seam and application services for the
//! controlled equipment ledger.
//!
//! The domain crates stay pure; this crate wires them to a store with
//! per-equipment compare-and-swap semantics and exposes the operations the
//! UI/controller layer calls: `createEquipment`/`updateEquipment` through
//! [`catalog::EquipmentCatalog`], `destinar`/`devolver` and the read
//! operations through [`ledger::AllocationLedger`].

pub mod catalog;
pub mod ledger;
pub mod posts;
pub mod store;

mod txn;

mod integration_tests;
