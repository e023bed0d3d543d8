//! Persistent store seam for equipment records.
//!
//! The contract the core requires of its backing store: atomic
//! read-modify-write per equipment id, expressed here as versioned
//! snapshots plus compare-and-swap commits. The in-memory
//! implementation is the reference semantics; a SQL backend would map
//! `commit` to a conditional `UPDATE ... WHERE version = ?`.

pub mod in_memory;

pub use in_memory::InMemoryEquipmentStore;

use std::sync::Arc;

use thiserror::Error;

use sentinela_core::{AllocationId, DomainError, EquipmentId, ExpectedVersion};
use sentinela_equipment::Equipment;

/// A record snapshot together with the store version it was read at.
///
/// Writers pass the version back as `ExpectedVersion::Exact` so the store can
/// reject commits against state that moved in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub record: T,
    pub version: u64,
}

/// Store operation error (infrastructure-level, as opposed to domain errors).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("equipment not found: {0}")]
    NotFound(String),

    #[error("duplicate equipment id: {0}")]
    Duplicate(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => DomainError::conflict(msg),
            StoreError::NotFound(msg) => DomainError::not_found(msg),
            StoreError::Duplicate(msg) => DomainError::conflict(msg),
            StoreError::Storage(msg) => DomainError::conflict(msg),
            StoreError::Other(e) => DomainError::conflict(e.to_string()),
        }
    }
}

/// Versioned equipment store with per-id compare-and-swap writes.
///
/// Implementations must:
/// - keep one versioned record per equipment id, starting at version 1
/// - reject `commit`/`remove` when the stored version differs from the
///   caller's expectation (`StoreError::Concurrency`)
/// - bump the version on every successful commit
/// - apply each commit atomically with respect to concurrent readers
pub trait EquipmentStore: Send + Sync {
    /// Insert a brand-new record at version 1. Fails on a duplicate id.
    fn insert(&self, equipment: Equipment) -> Result<(), StoreError>;

    /// Snapshot a record together with its current version.
    fn get(&self, id: EquipmentId) -> Result<Versioned<Equipment>, StoreError>;

    /// Replace a record if the stored version matches the expectation.
    /// Returns the new version.
    fn commit(
        &self,
        equipment: Equipment,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError>;

    /// Delete a record if the stored version matches the expectation.
    fn remove(&self, id: EquipmentId, expected: ExpectedVersion) -> Result<(), StoreError>;

    /// Snapshot every record.
    fn list(&self) -> Result<Vec<Versioned<Equipment>>, StoreError>;

    /// Reverse lookup: which equipment currently carries this allocation row.
    fn locate_allocation(&self, allocation_id: AllocationId) -> Result<EquipmentId, StoreError>;
}

impl<S> EquipmentStore for Arc<S>
where
    S: EquipmentStore + ?Sized,
{
    fn insert(&self, equipment: Equipment) -> Result<(), StoreError> {
        (**self).insert(equipment)
    }

    fn get(&self, id: EquipmentId) -> Result<Versioned<Equipment>, StoreError> {
        (**self).get(id)
    }

    fn commit(&self, equipment: Equipment, expected: ExpectedVersion) -> Result<u64, StoreError> {
        (**self).commit(equipment, expected)
    }

    fn remove(&self, id: EquipmentId, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).remove(id, expected)
    }

    fn list(&self) -> Result<Vec<Versioned<Equipment>>, StoreError> {
        (**self).list()
    }

    fn locate_allocation(&self, allocation_id: AllocationId) -> Result<EquipmentId, StoreError> {
        (**self).locate_allocation(allocation_id)
    }
}
