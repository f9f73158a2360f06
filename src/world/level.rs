//! Level definitions.
//!
//! Parsing map files is the level layer's job; it hands the core these plain
//! data records. Every (re)load rebuilds the [`World`](super::World) from one.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::block::Collider;
use super::rect::Rect;
use crate::player::Ability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractableKind {
    /// Using it finishes the level.
    Exit,
    /// Toggles on use; may grant an ability the first time.
    Button { grants: Option<Ability> },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractableDef {
    pub rect: Rect,
    pub kind: InteractableKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupDef {
    pub rect: Rect,
    pub ability: Ability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    /// Top-left of the body's hit box on (re)spawn.
    pub spawn: Vec2,
    /// Static geometry, in the order collisions are resolved.
    #[serde(default)]
    pub blocks: Vec<Collider>,
    #[serde(default)]
    pub interactables: Vec<InteractableDef>,
    #[serde(default)]
    pub pickups: Vec<PickupDef>,
}

impl LevelDef {
    pub fn new(name: impl Into<String>, spawn: Vec2) -> Self {
        Self {
            name: name.into(),
            spawn,
            blocks: Vec::new(),
            interactables: Vec::new(),
            pickups: Vec::new(),
        }
    }

    pub fn with_block(mut self, block: Collider) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_interactable(mut self, rect: Rect, kind: InteractableKind) -> Self {
        self.interactables.push(InteractableDef { rect, kind });
        self
    }

    pub fn with_pickup(mut self, rect: Rect, ability: Ability) -> Self {
        self.pickups.push(PickupDef { rect, ability });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("a level set needs at least one level")]
    Empty,
    #[error("no level after {current} (of {count})")]
    NoMoreLevels { current: usize, count: usize },
}

/// Ordered levels plus a cursor on the one being played.
#[derive(Debug, Clone)]
pub struct LevelSet {
    levels: Vec<LevelDef>,
    current: usize,
}

impl LevelSet {
    pub fn new(levels: Vec<LevelDef>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        Ok(Self { levels, current: 0 })
    }

    pub fn current(&self) -> &LevelDef {
        &self.levels[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LevelDef> {
        self.levels.get(index)
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.levels.len()
    }

    /// Move the cursor to the next level.
    pub fn advance(&mut self) -> Result<&LevelDef, LevelError> {
        if self.is_last() {
            return Err(LevelError::NoMoreLevels {
                current: self.current,
                count: self.levels.len(),
            });
        }
        self.current += 1;
        Ok(&self.levels[self.current])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::BlockKind;

    fn level(name: &str) -> LevelDef {
        LevelDef::new(name, Vec2::ZERO)
    }

    #[test]
    fn empty_set_is_rejected() {
        assert_eq!(LevelSet::new(Vec::new()).unwrap_err(), LevelError::Empty);
    }

    #[test]
    fn advance_walks_then_stops() {
        let mut set = LevelSet::new(vec![level("a"), level("b")]).unwrap();
        assert_eq!(set.current().name, "a");
        assert!(!set.is_last());

        assert_eq!(set.advance().unwrap().name, "b");
        assert!(set.is_last());
        assert_eq!(
            set.advance().unwrap_err(),
            LevelError::NoMoreLevels {
                current: 1,
                count: 2
            }
        );
        assert_eq!(set.current_index(), 1);
    }

    #[test]
    fn builder_keeps_block_order() {
        let def = level("order")
            .with_block(Collider::new(BlockKind::Wall, Rect::new(0.0, 0.0, 1.0, 1.0)))
            .with_block(Collider::new(BlockKind::Ice, Rect::new(1.0, 0.0, 1.0, 1.0)));
        assert_eq!(def.blocks[0].kind, BlockKind::Wall);
        assert_eq!(def.blocks[1].kind, BlockKind::Ice);
    }
}
