//! Allocation rows: equipment destined to a work post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sentinela_core::{AllocationId, Entity, EquipmentId, PostId};

/// An active allocation of equipment to a work post.
///
/// Rows are created whole by `destinar`, optionally reduced by partial
/// returns (ammunition only), and removed once the quantity reaches zero;
/// there is no other update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    id: AllocationId,
    equipment_id: EquipmentId,
    post_id: PostId,
    quantity: u32,
    created_at: DateTime<Utc>,
}

impl Allocation {
    pub(crate) fn new(
        id: AllocationId,
        equipment_id: EquipmentId,
        post_id: PostId,
        quantity: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            equipment_id,
            post_id,
            quantity,
            created_at,
        }
    }

    pub fn id_typed(&self) -> AllocationId {
        self.id
    }

    pub fn equipment_id(&self) -> EquipmentId {
        self.equipment_id
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reduce the row to `remaining` units after a partial return.
    ///
    /// Callers (the aggregate) guarantee `1 <= remaining < quantity`.
    pub(crate) fn reduce_to(&mut self, remaining: u32) {
        self.quantity = remaining;
    }
}

impl Entity for Allocation {
    type Id = AllocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
