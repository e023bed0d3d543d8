//! Allocation ledger service: `destinar`, `devolver`, and the derived reads.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sentinela_core::{AllocationId, DomainError, DomainResult, EquipmentId, PostId};
use sentinela_equipment::{Allocation, Equipment, EquipmentCategory, ReturnOutcome};

use crate::posts::{PostDirectory, WorkPost};
use crate::store::EquipmentStore;
use crate::txn;

/// Allocation row joined with equipment and post display data, for read-only
/// consumers (screens, reports).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationView {
    pub id: AllocationId,
    pub equipment_id: EquipmentId,
    pub equipment_description: String,
    pub category: EquipmentCategory,
    pub post_id: PostId,
    pub post_name: Option<String>,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

impl AllocationView {
    fn join(allocation: &Allocation, equipment: &Equipment, post_name: Option<String>) -> Self {
        Self {
            id: allocation.id_typed(),
            equipment_id: allocation.equipment_id(),
            equipment_description: equipment.description().to_string(),
            category: equipment.category(),
            post_id: allocation.post_id(),
            post_name,
            quantity: allocation.quantity(),
            created_at: allocation.created_at(),
        }
    }
}

/// Ledger service: the only writer of allocation rows.
///
/// The availability check and the allocation write happen inside the same
/// compare-and-swap scope per equipment id, so two callers racing over the
/// last unit can never both succeed; the client-visible `available` value is
/// a display hint only, never the basis for a commit decision.
#[derive(Debug)]
pub struct AllocationLedger<S, P> {
    store: S,
    posts: P,
}

impl<S, P> AllocationLedger<S, P>
where
    S: EquipmentStore,
    P: PostDirectory,
{
    pub fn new(store: S, posts: P) -> Self {
        Self { store, posts }
    }

    /// Destine `quantity` units of equipment to a work post.
    pub fn destinar(
        &self,
        equipment_id: EquipmentId,
        post_id: PostId,
        quantity: u32,
    ) -> DomainResult<AllocationView> {
        let post = self.resolve_active_post(post_id)?;

        let view = txn::update_equipment(&self.store, equipment_id, |equipment| {
            let allocation =
                equipment.destinar(AllocationId::new(), post_id, quantity, Utc::now())?;
            Ok(AllocationView::join(
                &allocation,
                equipment,
                Some(post.name.clone()),
            ))
        })?;

        tracing::info!(
            equipment_id = %equipment_id,
            post_id = %post_id,
            quantity,
            allocation_id = %view.id,
            "equipment destined to post"
        );
        Ok(view)
    }

    /// Return previously destined units to central stock.
    ///
    /// For ammunition a quantity below the allocated amount performs a
    /// partial return; omitted means full. Serialized returns are always
    /// full, regardless of any supplied quantity.
    pub fn devolver(
        &self,
        allocation_id: AllocationId,
        quantity: Option<u32>,
    ) -> DomainResult<ReturnOutcome> {
        let equipment_id = self.store.locate_allocation(allocation_id)?;

        let outcome = txn::update_equipment(&self.store, equipment_id, |equipment| {
            equipment.devolver(allocation_id, quantity)
        })?;

        tracing::info!(
            equipment_id = %equipment_id,
            allocation_id = %allocation_id,
            outcome = ?outcome,
            "allocation returned"
        );
        Ok(outcome)
    }

    /// Derived availability for one equipment record. Pure read.
    pub fn available(&self, equipment_id: EquipmentId) -> DomainResult<u32> {
        let snapshot = self.store.get(equipment_id)?;
        Ok(snapshot.record.available())
    }

    /// All active allocation rows, joined with equipment and post display
    /// data.
    pub fn list_allocations(&self) -> DomainResult<Vec<AllocationView>> {
        let mut views: Vec<AllocationView> = self
            .store
            .list()?
            .iter()
            .flat_map(|v| {
                v.record.allocations().iter().map(|allocation| {
                    let post_name = self.posts.find(allocation.post_id()).map(|p| p.name);
                    AllocationView::join(allocation, &v.record, post_name)
                })
            })
            .collect();
        views.sort_by_key(|v| v.created_at);
        Ok(views)
    }

    fn resolve_active_post(&self, post_id: PostId) -> DomainResult<WorkPost> {
        let post = self
            .posts
            .find(post_id)
            .ok_or_else(|| DomainError::not_found(format!("work post {post_id}")))?;
        if !post.active {
            return Err(DomainError::validation(format!(
                "work post {post_id} is not active"
            )));
        }
        Ok(post)
    }
}
