//! Unit tests for amr-fleet.

use amr_core::{ItemId, RobotId, SegmentId, Vec3};

use crate::{FleetError, ItemStore, PropertyValue, RobotProperty, RobotStoreBuilder};

// ── RobotStore ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use super::*;

    #[test]
    fn defaults_after_build() {
        let (store, rngs) = RobotStoreBuilder::new(3, 7).build().unwrap();
        assert_eq!(store.count, 3);
        assert_eq!(rngs.len(), 3);
        assert_eq!(store.priority, vec![1, 2, 3]);
        assert_eq!(store.battery, vec![100; 3]);
        assert!(store.target.iter().all(Option::is_none));
        assert!(store.stop.iter().all(|s| !s));
        assert_eq!(store.max_speed, vec![800.0; 3]);
    }

    #[test]
    fn fallback_spawn_spacing_from_origin() {
        let (store, _) = RobotStoreBuilder::new(3, 0)
            .origin(Vec3::planar(100.0, 200.0))
            .pose(1, Vec3::planar(-5.0, -5.0), 90.0)
            .build()
            .unwrap();
        assert_eq!(store.position[0], Vec3::planar(100.0, 200.0));
        assert_eq!(store.position[1], Vec3::planar(-5.0, -5.0));
        assert_eq!(store.position[2], Vec3::planar(4100.0, 200.0));
        assert!((store.heading[1].y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn too_many_robots() {
        let err = RobotStoreBuilder::new(16, 0).build().err().unwrap();
        assert!(matches!(err, FleetError::TooManyRobots { requested: 16, max: 15 }));
        assert!(RobotStoreBuilder::new(16, 0).max_robots(20).build().is_ok());
    }

    #[test]
    fn reset_restores_spawn_state() {
        let (mut store, _) = RobotStoreBuilder::new(2, 0).build().unwrap();
        store.position[1] = Vec3::planar(9.0, 9.0);
        store.target[1] = Some(SegmentId(3));
        store.priority[1] = 9;
        store.stop[1] = true;
        store.carried[1] = Some(ItemId(0));
        store.location[1] = Some(SegmentId(1));
        store.reset(800.0);
        assert_eq!(store.position[1], Vec3::planar(2000.0, 0.0));
        assert_eq!(store.target[1], None);
        assert_eq!(store.priority[1], 2);
        assert!(!store.stop[1]);
        assert!(!store.is_carrying(RobotId(1)));
        assert_eq!(store.location[1], None);
    }
}

// ── Items ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod items {
    use super::*;

    fn two_items() -> ItemStore {
        let mut items = ItemStore::new();
        items.add("Box", Vec3::planar(1000.0, 0.0), None).unwrap();
        items.add("Box #2", Vec3::planar(3000.0, 0.0), None).unwrap();
        items
    }

    #[test]
    fn claim_rejects_other_owner() {
        let mut items = two_items();
        let r1 = RobotId(0);
        let r2 = RobotId(1);
        items.claim(ItemId(0), r2).unwrap();
        let err = items.claim(ItemId(0), r1).unwrap_err();
        assert!(matches!(err, FleetError::ItemOwned { item: ItemId(0), owner } if owner == r2));
        assert_eq!(items.owner(ItemId(0)), Some(r2));
        // Re-claim by the owner is fine.
        items.claim(ItemId(0), r2).unwrap();
    }

    #[test]
    fn claim_records_original_position() {
        let mut items = two_items();
        items.claim(ItemId(1), RobotId(0)).unwrap();
        items.set_position(ItemId(1), Vec3::planar(0.0, 0.0));
        let item = items.get(ItemId(1)).unwrap();
        assert_eq!(item.original_position, Some(Vec3::planar(3000.0, 0.0)));
    }

    #[test]
    fn nearest_unowned_within_radius() {
        let mut items = two_items();
        assert_eq!(items.nearest_unowned(Vec3::ZERO, 8000.0), Some(ItemId(0)));
        items.claim(ItemId(0), RobotId(0)).unwrap();
        assert_eq!(items.nearest_unowned(Vec3::ZERO, 8000.0), Some(ItemId(1)));
        assert_eq!(items.nearest_unowned(Vec3::ZERO, 2000.0), None);
    }

    #[test]
    fn release_and_clear() {
        let mut items = two_items();
        items.claim(ItemId(0), RobotId(0)).unwrap();
        items.claim(ItemId(1), RobotId(1)).unwrap();
        items.release_at(ItemId(0), Vec3::new(5.0, 5.0, 700.0)).unwrap();
        assert_eq!(items.owner(ItemId(0)), None);
        assert_eq!(items.get(ItemId(0)).unwrap().position.z, 700.0);
        items.clear_ownership();
        assert_eq!(items.owner(ItemId(1)), None);
    }

    #[test]
    fn duplicate_and_unknown() {
        let mut items = two_items();
        assert!(matches!(items.add("Box", Vec3::ZERO, None), Err(FleetError::DuplicateItem(_))));
        assert!(matches!(items.claim(ItemId(9), RobotId(0)), Err(FleetError::UnknownItem(_))));
        assert_eq!(items.lookup("Box #2"), Some(ItemId(1)));
        assert_eq!(items.name(ItemId(9)), "");
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod property {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for p in RobotProperty::ALL {
            assert_eq!(p.as_str().parse::<RobotProperty>().unwrap(), p);
        }
        assert!(matches!("Speed".parse::<RobotProperty>(), Err(FleetError::UnknownProperty(_))));
    }

    #[test]
    fn only_commands_are_writable() {
        assert!(RobotProperty::Target.is_writable());
        assert!(RobotProperty::Stop.is_writable());
        assert!(!RobotProperty::Location.is_writable());
        assert!(!RobotProperty::MaxSpeed.is_writable());
    }

    #[test]
    fn value_coercions() {
        assert_eq!(PropertyValue::Real(3.0).as_int(), Some(3));
        assert_eq!(PropertyValue::Real(3.5).as_int(), None);
        assert_eq!(PropertyValue::Int(2).as_real(), Some(2.0));
        assert_eq!(PropertyValue::from("x").as_str(), Some("x"));
        assert_eq!(PropertyValue::Bool(true).as_str(), None);
        assert_eq!(PropertyValue::from(true).to_string(), "true");
    }
}
