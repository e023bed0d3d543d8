use std::collections::HashMap;
use std::sync::RwLock;

use sentinela_core::{AllocationId, EquipmentId, ExpectedVersion};
use sentinela_equipment::Equipment;

use super::{EquipmentStore, StoreError, Versioned};

/// In-memory versioned equipment store.
///
/// Intended for tests/dev. All writes take the map write lock, so each
/// commit is atomic with respect to concurrent readers and writers.
#[derive(Debug, Default)]
pub struct InMemoryEquipmentStore {
    records: RwLock<HashMap<EquipmentId, Versioned<Equipment>>>,
}

impl InMemoryEquipmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EquipmentStore for InMemoryEquipmentStore {
    fn insert(&self, equipment: Equipment) -> Result<(), StoreError> {
        let id = equipment.id_typed();
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Storage("store lock poisoned".to_string()))?;

        if records.contains_key(&id) {
            return Err(StoreError::Duplicate(id.to_string()));
        }
        records.insert(
            id,
            Versioned {
                record: equipment,
                version: 1,
            },
        );
        Ok(())
    }

    fn get(&self, id: EquipmentId) -> Result<Versioned<Equipment>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Storage("store lock poisoned".to_string()))?;

        records
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn commit(&self, equipment: Equipment, expected: ExpectedVersion) -> Result<u64, StoreError> {
        let id = equipment.id_typed();
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Storage("store lock poisoned".to_string()))?;

        let current = records
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if !expected.matches(current.version) {
            return Err(StoreError::Concurrency(format!(
                "expected {expected:?}, found {}",
                current.version
            )));
        }

        let version = current.version + 1;
        records.insert(
            id,
            Versioned {
                record: equipment,
                version,
            },
        );
        Ok(version)
    }

    fn remove(&self, id: EquipmentId, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Storage("store lock poisoned".to_string()))?;

        let current = records
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if !expected.matches(current.version) {
            return Err(StoreError::Concurrency(format!(
                "expected {expected:?}, found {}",
                current.version
            )));
        }

        records.remove(&id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Versioned<Equipment>>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Storage("store lock poisoned".to_string()))?;

        Ok(records.values().cloned().collect())
    }

    fn locate_allocation(&self, allocation_id: AllocationId) -> Result<EquipmentId, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Storage("store lock poisoned".to_string()))?;

        records
            .values()
            .find(|v| {
                v.record
                    .allocations()
                    .iter()
                    .any(|a| a.id_typed() == allocation_id)
            })
            .map(|v| v.record.id_typed())
            .ok_or_else(|| StoreError::NotFound(format!("allocation {allocation_id}")))
    }
}
