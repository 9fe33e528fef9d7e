//! Spatial Index Module
//!
//! Provides the R-tree broad phase for drag intersection. A fresh index is
//! bulk-loaded from the accept-filtered candidates on every intersection
//! pass, since live hitboxes move with scrolling and are never cached.

use crate::entity::EntityRef;
use crate::types::Hitbox;
use rstar::{AABB, RTree, RTreeObject};

/// A spatial entry pointing back at a candidate by slot.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub slot: usize,
    pub hitbox: Hitbox,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.hitbox.min_x, self.hitbox.min_y],
            [self.hitbox.max_x, self.hitbox.max_y],
        )
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

/// Broad-phase index over one pass's candidates.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
    entities: Vec<EntityRef>,
}

impl SpatialIndex {
    /// Build from candidates, measuring each live hitbox once.
    pub fn from_entities(entities: Vec<EntityRef>) -> Self {
        let entries: Vec<SpatialEntry> = entities
            .iter()
            .enumerate()
            .map(|(slot, entity)| SpatialEntry {
                slot,
                hitbox: entity.hitbox(),
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
            entities,
        }
    }

    /// Candidates whose rectangle overlaps `hitbox` with positive area,
    /// in registration order.
    pub fn query_overlapping(&self, hitbox: Hitbox) -> Vec<EntityRef> {
        let envelope = AABB::from_corners([hitbox.min_x, hitbox.min_y], [hitbox.max_x, hitbox.max_y]);

        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.hitbox.overlaps(&hitbox))
            .map(|entry| entry.slot)
            .collect();
        slots.sort_unstable();

        slots
            .into_iter()
            .map(|slot| self.entities[slot].clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
