//! Integration tests for the full catalog + ledger + store pipeline.
//!
//! Verifies:
//! - Catalog mutations and ledger allocations agree on derived availability
//! - The double-allocation hazard: concurrent `destinar` over the last unit
//!   yields exactly one success
//! - Concurrent partial returns serialize their decrements

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use sentinela_core::{DomainError, PostId};
    use sentinela_equipment::{
        EquipmentCategory, EquipmentUpdate, NewEquipment, ReturnOutcome,
    };

    use crate::catalog::{EquipmentCatalog, EquipmentFilter};
    use crate::ledger::AllocationLedger;
    use crate::posts::{InMemoryPostDirectory, WorkPost};
    use crate::store::InMemoryEquipmentStore;

    struct Harness {
        catalog: EquipmentCatalog<Arc<InMemoryEquipmentStore>>,
        ledger: AllocationLedger<Arc<InMemoryEquipmentStore>, Arc<InMemoryPostDirectory>>,
        posts: Arc<InMemoryPostDirectory>,
    }

    fn setup() -> Harness {
        sentinela_observability::init();
        let store = Arc::new(InMemoryEquipmentStore::new());
        let posts = Arc::new(InMemoryPostDirectory::new());
        Harness {
            catalog: EquipmentCatalog::new(store.clone()),
            ledger: AllocationLedger::new(store, posts.clone()),
            posts,
        }
    }

    fn active_post(posts: &InMemoryPostDirectory, name: &str) -> PostId {
        let id = PostId::new();
        posts.upsert(WorkPost {
            id,
            name: name.to_string(),
            active: true,
        });
        id
    }

    fn ammo_input(total: u32) -> NewEquipment {
        NewEquipment {
            category: EquipmentCategory::Ammunition,
            description: "9mm rounds".to_string(),
            serial_number: None,
            total_quantity: total,
        }
    }

    fn vest_input() -> NewEquipment {
        NewEquipment {
            category: EquipmentCategory::BallisticVest,
            description: "Level III-A vest".to_string(),
            serial_number: Some("VST-0001".to_string()),
            total_quantity: 1,
        }
    }

    #[test]
    fn create_and_list_reports_available() {
        let h = setup();
        let post = active_post(&h.posts, "Posto Centro");

        let ammo = h.catalog.create(ammo_input(100)).unwrap();
        h.catalog.create(vest_input()).unwrap();

        h.ledger.destinar(ammo.id, post, 40).unwrap();

        let listed = h.catalog.list(EquipmentFilter::default()).unwrap();
        assert_eq!(listed.len(), 2);
        let ammo_view = listed.iter().find(|v| v.id == ammo.id).unwrap();
        assert_eq!(ammo_view.available, 60);
        assert_eq!(ammo_view.total_quantity, 100);

        let only_vests = h
            .catalog
            .list(EquipmentFilter {
                category: Some(EquipmentCategory::BallisticVest),
                include_inactive: false,
            })
            .unwrap();
        assert_eq!(only_vests.len(), 1);
        assert_eq!(only_vests[0].available, 1);
    }

    #[test]
    fn destinar_and_devolver_through_services() {
        let h = setup();
        let post = active_post(&h.posts, "Posto Norte");
        let ammo = h.catalog.create(ammo_input(100)).unwrap();

        let allocation = h.ledger.destinar(ammo.id, post, 40).unwrap();
        assert_eq!(allocation.quantity, 40);
        assert_eq!(h.ledger.available(ammo.id).unwrap(), 60);

        let outcome = h.ledger.devolver(allocation.id, Some(15)).unwrap();
        assert_eq!(outcome, ReturnOutcome::Reduced { remaining: 25 });
        assert_eq!(h.ledger.available(ammo.id).unwrap(), 75);

        let outcome = h.ledger.devolver(allocation.id, Some(25)).unwrap();
        assert_eq!(outcome, ReturnOutcome::Closed);
        assert_eq!(h.ledger.available(ammo.id).unwrap(), 100);
        assert!(h.ledger.list_allocations().unwrap().is_empty());
    }

    #[test]
    fn destinar_validates_the_post() {
        let h = setup();
        let ammo = h.catalog.create(ammo_input(100)).unwrap();

        let err = h.ledger.destinar(ammo.id, PostId::new(), 10).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let inactive = PostId::new();
        h.posts.upsert(WorkPost {
            id: inactive,
            name: "Posto encerrado".to_string(),
            active: false,
        });
        let err = h.ledger.destinar(ammo.id, inactive, 10).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        assert!(h.ledger.list_allocations().unwrap().is_empty());
    }

    #[test]
    fn deactivated_equipment_rejects_new_allocations() {
        let h = setup();
        let post = active_post(&h.posts, "Posto Sul");
        let ammo = h.catalog.create(ammo_input(50)).unwrap();
        let allocation = h.ledger.destinar(ammo.id, post, 20).unwrap();

        h.catalog.deactivate(ammo.id).unwrap();
        let err = h.ledger.destinar(ammo.id, post, 5).unwrap_err();
        assert!(matches!(err, DomainError::InactiveEquipment(_)));

        // The existing allocation is still valid and returnable.
        assert_eq!(h.ledger.devolver(allocation.id, None).unwrap(), ReturnOutcome::Closed);
        assert_eq!(h.ledger.available(ammo.id).unwrap(), 50);
    }

    #[test]
    fn delete_blocked_while_allocated() {
        let h = setup();
        let post = active_post(&h.posts, "Posto Leste");
        let ammo = h.catalog.create(ammo_input(50)).unwrap();
        let allocation = h.ledger.destinar(ammo.id, post, 20).unwrap();

        let err = h.catalog.delete(ammo.id).unwrap_err();
        assert!(matches!(err, DomainError::ReferentialIntegrity(_)));

        h.ledger.devolver(allocation.id, None).unwrap();
        h.catalog.delete(ammo.id).unwrap();
        assert!(matches!(
            h.catalog.get(ammo.id).unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[test]
    fn update_total_quantity_checked_against_the_ledger() {
        let h = setup();
        let post = active_post(&h.posts, "Posto Oeste");
        let ammo = h.catalog.create(ammo_input(100)).unwrap();
        h.ledger.destinar(ammo.id, post, 40).unwrap();

        let err = h
            .catalog
            .update(
                ammo.id,
                EquipmentUpdate {
                    total_quantity: Some(30),
                    ..EquipmentUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let updated = h
            .catalog
            .update(
                ammo.id,
                EquipmentUpdate {
                    total_quantity: Some(60),
                    ..EquipmentUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.available, 20);
    }

    #[test]
    fn concurrent_destinar_over_last_unit_yields_single_success() {
        let h = setup();
        let post_a = active_post(&h.posts, "Posto A");
        let post_b = active_post(&h.posts, "Posto B");
        let ammo = h.catalog.create(ammo_input(1)).unwrap();

        let barrier = Barrier::new(2);
        let results = std::thread::scope(|s| {
            let run = |post| {
                let ledger = &h.ledger;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    ledger.destinar(ammo.id, post, 1)
                })
            };
            let a = run(post_a);
            let b = run(post_b);
            [a.join().unwrap(), b.join().unwrap()]
        });

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let loser = results.iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            loser.as_ref().unwrap_err(),
            DomainError::InsufficientStock {
                requested: 1,
                available: 0
            }
        ));
        assert_eq!(h.ledger.list_allocations().unwrap().len(), 1);
        assert_eq!(h.ledger.available(ammo.id).unwrap(), 0);
    }

    #[test]
    fn concurrent_destinar_on_serialized_item_yields_single_success() {
        let h = setup();
        let post_a = active_post(&h.posts, "Posto A");
        let post_b = active_post(&h.posts, "Posto B");
        let vest = h.catalog.create(vest_input()).unwrap();

        let barrier = Barrier::new(2);
        let results = std::thread::scope(|s| {
            let run = |post| {
                let ledger = &h.ledger;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    ledger.destinar(vest.id, post, 1)
                })
            };
            let a = run(post_a);
            let b = run(post_b);
            [a.join().unwrap(), b.join().unwrap()]
        });

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let loser = results.iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            loser.as_ref().unwrap_err(),
            DomainError::AlreadyAllocated(_)
        ));
        assert_eq!(h.ledger.list_allocations().unwrap().len(), 1);
    }

    #[test]
    fn concurrent_partial_returns_serialize_their_decrements() {
        let h = setup();
        let post = active_post(&h.posts, "Posto Centro");
        let ammo = h.catalog.create(ammo_input(100)).unwrap();
        let allocation = h.ledger.destinar(ammo.id, post, 40).unwrap();

        let barrier = Barrier::new(2);
        let results = std::thread::scope(|s| {
            let run = |quantity| {
                let ledger = &h.ledger;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    ledger.devolver(allocation.id, Some(quantity))
                })
            };
            let a = run(10);
            let b = run(15);
            [a.join().unwrap(), b.join().unwrap()]
        });

        // Neither decrement may be lost.
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(h.ledger.available(ammo.id).unwrap(), 85);
        let rows = h.ledger.list_allocations().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 15);
    }

    #[test]
    fn allocation_views_serialize_for_ui_consumers() {
        let h = setup();
        let post = active_post(&h.posts, "Posto Centro");
        let ammo = h.catalog.create(ammo_input(100)).unwrap();
        h.ledger.destinar(ammo.id, post, 40).unwrap();

        let views = h.ledger.list_allocations().unwrap();
        let json = serde_json::to_value(&views).unwrap();
        let row = &json[0];
        assert_eq!(row["equipment_description"], "9mm rounds");
        assert_eq!(row["category"], "ammunition");
        assert_eq!(row["post_name"], "Posto Centro");
        assert_eq!(row["quantity"], 40);
    }
}
