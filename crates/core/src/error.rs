//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// stock invariants, referential integrity). Infrastructure concerns belong
/// elsewhere. Every variant is recoverable and surfaced to the caller; a
/// failed operation is a no-op, never a partial mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input: missing field, non-positive quantity, wrong category shape.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Requested allocation quantity exceeds the equipment's availability.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// A serialized item (firearm, vest) already has an active allocation.
    #[error("already allocated: {0}")]
    AlreadyAllocated(String),

    /// Inactive equipment cannot receive new allocations.
    #[error("equipment is inactive: {0}")]
    InactiveEquipment(String),

    /// A requested resource (equipment, allocation, post) was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Deletion blocked by existing allocation rows.
    #[error("referential integrity violated: {0}")]
    ReferentialIntegrity(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_stock(requested: u32, available: u32) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn already_allocated(msg: impl Into<String>) -> Self {
        Self::AlreadyAllocated(msg.into())
    }

    pub fn inactive_equipment(msg: impl Into<String>) -> Self {
        Self::InactiveEquipment(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn referential_integrity(msg: impl Into<String>) -> Self {
        Self::ReferentialIntegrity(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
