//! Shared write path: load → domain decision → compare-and-swap commit.
//!
//! Both services mutate equipment through this loop. On a concurrency
//! rejection the record is re-read and the decision re-evaluated against the
//! committed state, so a writer that lost a race fails (or succeeds) on the
//! real availability, never on a stale read. Attempts are bounded to rule
//! out livelock under pathological contention.

use sentinela_core::{DomainError, DomainResult, EquipmentId, ExpectedVersion};
use sentinela_equipment::Equipment;

use crate::store::{EquipmentStore, StoreError, Versioned};

pub(crate) const MAX_COMMIT_ATTEMPTS: u32 = 16;

pub(crate) fn update_equipment<S, T>(
    store: &S,
    id: EquipmentId,
    mut decide: impl FnMut(&mut Equipment) -> DomainResult<T>,
) -> DomainResult<T>
where
    S: EquipmentStore,
{
    for attempt in 0..MAX_COMMIT_ATTEMPTS {
        let Versioned {
            record: mut equipment,
            version,
        } = store.get(id)?;

        let outcome = decide(&mut equipment)?;

        match store.commit(equipment, ExpectedVersion::Exact(version)) {
            Ok(_) => return Ok(outcome),
            Err(StoreError::Concurrency(_)) => {
                tracing::debug!(equipment_id = %id, attempt, "commit conflict, retrying");
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(DomainError::conflict(format!(
        "commit contention on equipment {id}"
    )))
}
