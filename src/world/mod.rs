//! Static level contents and the queries the body runs against them.
//!
//! Colliders live in a plain `Vec` (their order is the resolution order);
//! interactables and ability pickups are hecs entities so they can be
//! consumed individually.

pub mod block;
pub mod level;
pub mod rect;

pub use block::{BlockCatalog, BlockKind, BlockProperties, BounceDirection, Collider};
pub use level::{InteractableDef, InteractableKind, LevelDef, LevelError, LevelSet, PickupDef};
pub use rect::Rect;

use crate::player::Ability;
use crate::spatial::SpatialGrid;

/// Broadphase cell size (pixels).
const SPATIAL_CELL_SIZE: f32 = 64.0;
/// Broadphase table size.
const SPATIAL_TABLE_SIZE: usize = 1024;

/// World-space bounds of a level object.
#[derive(Debug, Clone, Copy)]
pub struct Bounds(pub Rect);

/// Exit or button the body can use.
#[derive(Debug, Clone, Copy)]
pub struct Interactable {
    pub kind: InteractableKind,
    /// Toggle state for buttons. Persists until the level reloads.
    pub on: bool,
}

/// Grants an ability on touch, then disappears.
#[derive(Debug, Clone, Copy)]
pub struct AbilityPickup {
    pub ability: Ability,
}

pub struct World {
    colliders: Vec<Collider>,
    grid: SpatialGrid,
    objects: hecs::World,
}

impl World {
    pub fn new() -> Self {
        Self {
            colliders: Vec::new(),
            grid: SpatialGrid::new(SPATIAL_CELL_SIZE, SPATIAL_TABLE_SIZE),
            objects: hecs::World::new(),
        }
    }

    /// Build everything a level defines.
    pub fn from_level(def: &LevelDef) -> Self {
        let mut world = Self::new();
        for block in &def.blocks {
            world.add_collider(*block);
        }
        for interactable in &def.interactables {
            world.add_interactable(interactable.rect, interactable.kind);
        }
        for pickup in &def.pickups {
            world.add_pickup(pickup.rect, pickup.ability);
        }
        log::info!(
            "Built level '{}': {} blocks, {} interactables, {} pickups",
            def.name,
            def.blocks.len(),
            def.interactables.len(),
            def.pickups.len()
        );
        world
    }

    pub fn add_collider(&mut self, collider: Collider) -> usize {
        let index = self.colliders.len();
        self.grid.insert(&collider.rect, index as u32);
        self.colliders.push(collider);
        index
    }

    pub fn add_interactable(&mut self, rect: Rect, kind: InteractableKind) -> hecs::Entity {
        self.objects
            .spawn((Bounds(rect), Interactable { kind, on: false }))
    }

    pub fn add_pickup(&mut self, rect: Rect, ability: Ability) -> hecs::Entity {
        self.objects.spawn((Bounds(rect), AbilityPickup { ability }))
    }

    /// Drop every collider, interactable and pickup.
    pub fn clear(&mut self) {
        self.colliders.clear();
        self.grid.clear();
        self.objects.clear();
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn collider(&self, index: usize) -> &Collider {
        &self.colliders[index]
    }

    /// Broadphase candidates for `rect`, in world order. May contain
    /// colliders that do not actually overlap.
    pub fn candidates(&self, rect: &Rect) -> Vec<usize> {
        let mut out = Vec::new();
        self.grid.query_rect(rect, &mut out);
        out.into_iter().map(|i| i as usize).collect()
    }

    /// Indices of colliders overlapping `rect`, in world order.
    pub fn colliders_overlapping(&self, rect: &Rect) -> Vec<usize> {
        self.candidates(rect)
            .into_iter()
            .filter(|&i| self.colliders[i].rect.overlaps(rect))
            .collect()
    }

    /// Pickups overlapping `rect`, in spawn order.
    pub fn pickups_overlapping(&self, rect: &Rect) -> Vec<(hecs::Entity, Ability)> {
        let mut hits: Vec<_> = self
            .objects
            .query::<(&Bounds, &AbilityPickup)>()
            .iter()
            .filter(|(_, (bounds, _))| bounds.0.overlaps(rect))
            .map(|(entity, (_, pickup))| (entity, pickup.ability))
            .collect();
        hits.sort_by_key(|(entity, _)| entity.id());
        hits
    }

    /// Interactables overlapping `rect`, in spawn order.
    pub fn interactables_overlapping(&self, rect: &Rect) -> Vec<(hecs::Entity, Interactable)> {
        let mut hits: Vec<_> = self
            .objects
            .query::<(&Bounds, &Interactable)>()
            .iter()
            .filter(|(_, (bounds, _))| bounds.0.overlaps(rect))
            .map(|(entity, (_, interactable))| (entity, *interactable))
            .collect();
        hits.sort_by_key(|(entity, _)| entity.id());
        hits
    }

    pub fn pickup_count(&self) -> usize {
        self.objects.query::<&AbilityPickup>().iter().count()
    }

    /// Remove a collected pickup. Returns its ability if it still existed.
    pub fn consume_pickup(&mut self, entity: hecs::Entity) -> Option<Ability> {
        let ability = self.objects.get::<&AbilityPickup>(entity).ok()?.ability;
        self.objects.despawn(entity).ok()?;
        Some(ability)
    }

    /// Flip a button. Returns the new state, or `None` for a missing entity.
    pub fn toggle_interactable(&mut self, entity: hecs::Entity) -> Option<bool> {
        let mut interactable = self.objects.get::<&mut Interactable>(entity).ok()?;
        interactable.on = !interactable.on;
        Some(interactable.on)
    }

    pub fn interactable(&self, entity: hecs::Entity) -> Option<Interactable> {
        self.objects
            .get::<&Interactable>(entity)
            .ok()
            .map(|interactable| *interactable)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn sample_level() -> LevelDef {
        LevelDef::new("sample", Vec2::new(32.0, 32.0))
            .with_block(Collider::new(
                BlockKind::Wall,
                Rect::new(0.0, 600.0, 640.0, 40.0),
            ))
            .with_block(Collider::new(
                BlockKind::Ice,
                Rect::new(300.0, 568.0, 64.0, 32.0),
            ))
            .with_pickup(Rect::new(100.0, 568.0, 16.0, 16.0), Ability::DoubleJump)
            .with_interactable(
                Rect::new(600.0, 568.0, 32.0, 32.0),
                InteractableKind::Exit,
            )
    }

    #[test]
    fn overlap_query_respects_world_order() {
        let world = World::from_level(&sample_level());
        let probe = Rect::new(310.0, 580.0, 32.0, 32.0);
        assert_eq!(world.colliders_overlapping(&probe), vec![0, 1]);
    }

    #[test]
    fn far_rect_hits_nothing() {
        let world = World::from_level(&sample_level());
        assert!(world
            .colliders_overlapping(&Rect::new(5000.0, 5000.0, 32.0, 32.0))
            .is_empty());
    }

    #[test]
    fn pickup_consumed_once() {
        let mut world = World::from_level(&sample_level());
        let hits = world.pickups_overlapping(&Rect::new(96.0, 560.0, 32.0, 32.0));
        assert_eq!(hits.len(), 1);
        let (entity, ability) = hits[0];
        assert_eq!(ability, Ability::DoubleJump);

        assert_eq!(world.consume_pickup(entity), Some(Ability::DoubleJump));
        assert_eq!(world.consume_pickup(entity), None);
        assert_eq!(world.pickup_count(), 0);
    }

    #[test]
    fn buttons_toggle() {
        let mut world = World::new();
        let button = world.add_interactable(
            Rect::new(0.0, 0.0, 32.0, 32.0),
            InteractableKind::Button { grants: None },
        );
        assert_eq!(world.toggle_interactable(button), Some(true));
        assert_eq!(world.toggle_interactable(button), Some(false));
        assert!(!world.interactable(button).unwrap().on);
    }

    #[test]
    fn clear_empties_everything() {
        let mut world = World::from_level(&sample_level());
        world.clear();
        assert!(world.colliders().is_empty());
        assert_eq!(world.pickup_count(), 0);
        assert!(world
            .interactables_overlapping(&Rect::new(600.0, 568.0, 32.0, 32.0))
            .is_empty());
    }
}
