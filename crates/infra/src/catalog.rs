//! Equipment catalog service: identity, category shape, and lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sentinela_core::{DomainResult, EquipmentId, ExpectedVersion};
use sentinela_equipment::{Equipment, EquipmentCategory, EquipmentUpdate, NewEquipment};

use crate::store::{EquipmentStore, StoreError};
use crate::txn;

/// Equipment as presented to read-only consumers, annotated with the derived
/// `available` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentView {
    pub id: EquipmentId,
    pub category: EquipmentCategory,
    pub description: String,
    pub serial_number: Option<String>,
    pub total_quantity: u32,
    pub available: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl EquipmentView {
    fn from_equipment(equipment: &Equipment) -> Self {
        Self {
            id: equipment.id_typed(),
            category: equipment.category(),
            description: equipment.description().to_string(),
            serial_number: equipment.serial_number().map(str::to_string),
            total_quantity: equipment.total_quantity(),
            available: equipment.available(),
            active: equipment.is_active(),
            created_at: equipment.created_at(),
        }
    }
}

/// Listing filter. The default lists active equipment of every category.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EquipmentFilter {
    pub category: Option<EquipmentCategory>,
    pub include_inactive: bool,
}

/// Catalog service: owns equipment identity and category-dependent shape.
///
/// Only this service mutates identity fields (category, serial number,
/// total quantity); allocation rows belong to the ledger. Every mutation runs
/// through the compare-and-swap write path, so a `total_quantity` change is
/// checked against the allocation rows committed at that moment.
#[derive(Debug)]
pub struct EquipmentCatalog<S> {
    store: S,
}

impl<S> EquipmentCatalog<S>
where
    S: EquipmentStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create(&self, input: NewEquipment) -> DomainResult<EquipmentView> {
        let id = EquipmentId::new();
        let equipment = Equipment::register(id, input, Utc::now())?;
        let view = EquipmentView::from_equipment(&equipment);
        self.store.insert(equipment)?;
        tracing::info!(equipment_id = %id, category = %view.category, "equipment registered");
        Ok(view)
    }

    pub fn update(&self, id: EquipmentId, update: EquipmentUpdate) -> DomainResult<EquipmentView> {
        let view = txn::update_equipment(&self.store, id, |equipment| {
            equipment.apply_update(update.clone())?;
            Ok(EquipmentView::from_equipment(equipment))
        })?;
        tracing::info!(equipment_id = %id, "equipment updated");
        Ok(view)
    }

    /// Stop accepting new allocations for this equipment. Existing
    /// allocations remain valid.
    pub fn deactivate(&self, id: EquipmentId) -> DomainResult<()> {
        txn::update_equipment(&self.store, id, |equipment| {
            equipment.deactivate();
            Ok(())
        })?;
        tracing::info!(equipment_id = %id, "equipment deactivated");
        Ok(())
    }

    /// Hard-delete an equipment record. Refused while any active allocation
    /// references it.
    pub fn delete(&self, id: EquipmentId) -> DomainResult<()> {
        for _ in 0..txn::MAX_COMMIT_ATTEMPTS {
            let snapshot = self.store.get(id)?;
            snapshot.record.ensure_deletable()?;

            match self.store.remove(id, ExpectedVersion::Exact(snapshot.version)) {
                Ok(()) => {
                    tracing::info!(equipment_id = %id, "equipment deleted");
                    return Ok(());
                }
                // The record moved (e.g. a destinar landed first); re-check
                // deletability against the new state.
                Err(StoreError::Concurrency(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(sentinela_core::DomainError::conflict(format!(
            "commit contention on equipment {id}"
        )))
    }

    pub fn get(&self, id: EquipmentId) -> DomainResult<EquipmentView> {
        let snapshot = self.store.get(id)?;
        Ok(EquipmentView::from_equipment(&snapshot.record))
    }

    pub fn list(&self, filter: EquipmentFilter) -> DomainResult<Vec<EquipmentView>> {
        let mut views: Vec<EquipmentView> = self
            .store
            .list()?
            .iter()
            .filter(|v| filter.include_inactive || v.record.is_active())
            .filter(|v| {
                filter
                    .category
                    .map(|c| v.record.category() == c)
                    .unwrap_or(true)
            })
            .map(|v| EquipmentView::from_equipment(&v.record))
            .collect();
        views.sort_by_key(|v| v.created_at);
        Ok(views)
    }
}
