//! Aggregate root: Equipment.
//!
//! One record per controlled item (or ammunition lot), carrying its active
//! allocation rows. Keeping the rows inside the aggregate means the capacity
//! invariant, the serialized single-instance rule, and total-quantity updates
//! are all checked against the same snapshot the persistence layer commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sentinela_core::{AllocationId, DomainError, DomainResult, Entity, EquipmentId, PostId};

use crate::allocation::Allocation;
use crate::guard::{ConsistencyGuard, EquipmentCategory, ReturnEffect};

/// Input for registering a new piece of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEquipment {
    pub category: EquipmentCategory,
    pub description: String,
    pub serial_number: Option<String>,
    pub total_quantity: u32,
}

/// Partial update of an equipment record. `None` fields are left unchanged.
///
/// The serial number cannot be cleared directly; switching the category to
/// ammunition clears it through shape normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentUpdate {
    pub category: Option<EquipmentCategory>,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub total_quantity: Option<u32>,
}

/// Result of a `devolver` call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnOutcome {
    /// Partial return: the allocation row remains with `remaining` units.
    Reduced { remaining: u32 },
    /// Full return: the allocation row was removed. Terminal; no re-open.
    Closed,
}

/// Aggregate root: a controlled equipment record and its active allocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    id: EquipmentId,
    category: EquipmentCategory,
    description: String,
    serial_number: Option<String>,
    total_quantity: u32,
    active: bool,
    allocations: Vec<Allocation>,
    created_at: DateTime<Utc>,
}

impl Equipment {
    /// Register a new equipment record, applying category shape rules.
    pub fn register(
        id: EquipmentId,
        input: NewEquipment,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let description = input.description.trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }

        let shape = ConsistencyGuard::normalize_shape(
            input.category,
            input.serial_number,
            input.total_quantity,
        )?;

        Ok(Self {
            id,
            category: input.category,
            description,
            serial_number: shape.serial_number,
            total_quantity: shape.total_quantity,
            active: true,
            allocations: Vec::new(),
            created_at,
        })
    }

    pub fn id_typed(&self) -> EquipmentId {
        self.id
    }

    pub fn category(&self) -> EquipmentCategory {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    pub fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of active allocation quantities.
    pub fn allocated_total(&self) -> u32 {
        self.allocations.iter().map(Allocation::quantity).sum()
    }

    /// Derived stock not currently destined to any post. Computed on read,
    /// never stored.
    pub fn available(&self) -> u32 {
        self.total_quantity.saturating_sub(self.allocated_total())
    }

    /// Apply a partial update, re-normalizing the category shape.
    ///
    /// Lowering `total_quantity` below the current allocated sum is rejected,
    /// so a committed update can never leave the ledger over-committed.
    pub fn apply_update(&mut self, update: EquipmentUpdate) -> DomainResult<()> {
        let category = update.category.unwrap_or(self.category);
        let serial_number = update.serial_number.or_else(|| self.serial_number.clone());
        let total_quantity = update.total_quantity.unwrap_or(self.total_quantity);

        let shape = ConsistencyGuard::normalize_shape(category, serial_number, total_quantity)?;

        let allocated = self.allocated_total();
        if shape.total_quantity < allocated {
            return Err(DomainError::validation(format!(
                "total quantity {} is below the allocated sum {allocated}",
                shape.total_quantity
            )));
        }

        if let Some(description) = update.description {
            let description = description.trim().to_string();
            if description.is_empty() {
                return Err(DomainError::validation("description cannot be empty"));
            }
            self.description = description;
        }

        self.category = category;
        self.serial_number = shape.serial_number;
        self.total_quantity = shape.total_quantity;
        Ok(())
    }

    /// Stop accepting new allocations. Existing allocations remain valid and
    /// can still be returned. Idempotent.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Deletion guard: equipment is never hard-deleted while allocation rows
    /// reference it.
    pub fn ensure_deletable(&self) -> DomainResult<()> {
        if !self.allocations.is_empty() {
            return Err(DomainError::referential_integrity(format!(
                "equipment {} has {} active allocation(s)",
                self.id,
                self.allocations.len()
            )));
        }
        Ok(())
    }

    /// Destine `quantity` units to a work post, creating a new allocation row.
    pub fn destinar(
        &mut self,
        allocation_id: AllocationId,
        post_id: PostId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Allocation> {
        ConsistencyGuard::check_destinar(self, quantity)?;

        let allocation = Allocation::new(allocation_id, self.id, post_id, quantity, now);
        self.allocations.push(allocation.clone());
        Ok(allocation)
    }

    /// Return previously destined units to central stock.
    ///
    /// Serialized allocations are always removed whole; ammunition supports
    /// partial returns that decrement the row in place.
    pub fn devolver(
        &mut self,
        allocation_id: AllocationId,
        quantity: Option<u32>,
    ) -> DomainResult<ReturnOutcome> {
        let index = self
            .allocations
            .iter()
            .position(|a| a.id_typed() == allocation_id)
            .ok_or_else(|| DomainError::not_found(format!("allocation {allocation_id}")))?;

        let allocated = self.allocations[index].quantity();
        match ConsistencyGuard::return_effect(self.category, allocated, quantity)? {
            ReturnEffect::Full => {
                self.allocations.remove(index);
                Ok(ReturnOutcome::Closed)
            }
            ReturnEffect::Partial { remaining } => {
                self.allocations[index].reduce_to(remaining);
                Ok(ReturnOutcome::Reduced { remaining })
            }
        }
    }
}

impl Entity for Equipment {
    type Id = EquipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
