//! Cargo items and their ownership tags.
//!
//! An item is attached to at most one robot.  Every attach goes through
//! [`ItemStore::claim`], which refuses items already tagged by another robot.

use std::collections::HashMap;

use amr_core::{ItemId, RobotId, SegmentId, Vec3};

use crate::{FleetError, FleetResult};

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub name:              String,
    pub position:          Vec3,
    pub owner:             Option<RobotId>,
    /// Where the item was when it was last picked up.
    pub original_position: Option<Vec3>,
    /// Conveyor that produced the item.
    pub source:            Option<SegmentId>,
}

#[derive(Default, Debug)]
pub struct ItemStore {
    pub items: Vec<Item>,
    by_name:   HashMap<String, ItemId>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.items.len() as u32).map(ItemId)
    }

    /// Register a newly produced item.
    pub fn add(&mut self, name: &str, position: Vec3, source: Option<SegmentId>) -> FleetResult<ItemId> {
        if self.by_name.contains_key(name) {
            return Err(FleetError::DuplicateItem(name.to_string()));
        }
        let id = ItemId(self.items.len() as u32);
        self.by_name.insert(name.to_string(), id);
        self.items.push(Item {
            name: name.to_string(),
            position,
            owner: None,
            original_position: None,
            source,
        });
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.index())
    }

    pub fn lookup(&self, name: &str) -> Option<ItemId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: ItemId) -> &str {
        self.items.get(id.index()).map_or("", |i| i.name.as_str())
    }

    #[inline]
    pub fn owner(&self, id: ItemId) -> Option<RobotId> {
        self.items.get(id.index()).and_then(|i| i.owner)
    }

    /// Tag `id` as carried by `robot` and remember where it was picked up.
    ///
    /// Re-claiming an item the robot already owns succeeds.
    pub fn claim(&mut self, id: ItemId, robot: RobotId) -> FleetResult<()> {
        let item = self.items.get_mut(id.index()).ok_or(FleetError::UnknownItem(id))?;
        match item.owner {
            Some(owner) if owner != robot => Err(FleetError::ItemOwned { item: id, owner }),
            _ => {
                item.owner = Some(robot);
                item.original_position = Some(item.position);
                Ok(())
            }
        }
    }

    /// Clear the ownership tag and place the item at `position`.
    pub fn release_at(&mut self, id: ItemId, position: Vec3) -> FleetResult<()> {
        let item = self.items.get_mut(id.index()).ok_or(FleetError::UnknownItem(id))?;
        item.owner = None;
        item.position = position;
        Ok(())
    }

    pub fn set_position(&mut self, id: ItemId, position: Vec3) {
        if let Some(item) = self.items.get_mut(id.index()) {
            item.position = position;
        }
    }

    /// The unowned item nearest to `center`, if any lies within `radius`.
    pub fn nearest_unowned(&self, center: Vec3, radius: f64) -> Option<ItemId> {
        self.ids()
            .filter(|&id| self.items[id.index()].owner.is_none())
            .map(|id| (id, self.items[id.index()].position.planar_distance(center)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Drop every ownership tag.
    pub fn clear_ownership(&mut self) {
        for item in &mut self.items {
            item.owner = None;
        }
    }
}
