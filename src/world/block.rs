//! Block kinds and their material table.
//!
//! Every collider carries a [`BlockKind`] tag; friction, bounce and lethality
//! are looked up from [`BlockCatalog`] so all material data lives in one place.

use serde::{Deserialize, Serialize};

use super::rect::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Wall,
    /// One-way: only blocks a body landing on its top.
    Platform,
    Ice,
    Bounce,
    Death,
}

/// Face of a bounce block that reflects instead of stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BounceDirection {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

/// Material properties shared by every collider of one kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockProperties {
    /// Signed horizontal friction factor, applied as `accel.x += vel.x * friction`.
    pub friction: f32,
    /// Extra speed added on a matching bounce face.
    pub bounce_magnitude: f32,
    pub lethal: bool,
    /// Stops a body moving through it (platforms are one-way, see [`BlockKind::Platform`]).
    pub blocking: bool,
    /// Can be wall-grabbed.
    pub grabbable: bool,
}

/// Static table from [`BlockKind`] to [`BlockProperties`].
pub struct BlockCatalog;

impl BlockCatalog {
    const WALL: BlockProperties = BlockProperties {
        friction: -0.12,
        bounce_magnitude: 0.0,
        lethal: false,
        blocking: true,
        grabbable: true,
    };

    const PLATFORM: BlockProperties = BlockProperties {
        friction: -0.12,
        bounce_magnitude: 0.0,
        lethal: false,
        blocking: true,
        grabbable: false,
    };

    const ICE: BlockProperties = BlockProperties {
        friction: -0.02,
        bounce_magnitude: 0.0,
        lethal: false,
        blocking: true,
        grabbable: true,
    };

    const BOUNCE: BlockProperties = BlockProperties {
        friction: -0.12,
        bounce_magnitude: 12.0,
        lethal: false,
        blocking: true,
        grabbable: true,
    };

    const DEATH: BlockProperties = BlockProperties {
        friction: 0.0,
        bounce_magnitude: 0.0,
        lethal: true,
        blocking: false,
        grabbable: false,
    };

    pub const fn properties(kind: BlockKind) -> &'static BlockProperties {
        match kind {
            BlockKind::Wall => &Self::WALL,
            BlockKind::Platform => &Self::PLATFORM,
            BlockKind::Ice => &Self::ICE,
            BlockKind::Bounce => &Self::BOUNCE,
            BlockKind::Death => &Self::DEATH,
        }
    }
}

/// A piece of static level geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub rect: Rect,
    pub kind: BlockKind,
    /// Only read for [`BlockKind::Bounce`].
    #[serde(default)]
    pub direction: BounceDirection,
}

impl Collider {
    pub fn new(kind: BlockKind, rect: Rect) -> Self {
        Self {
            rect,
            kind,
            direction: BounceDirection::default(),
        }
    }

    pub fn bounce(rect: Rect, direction: BounceDirection) -> Self {
        Self {
            rect,
            kind: BlockKind::Bounce,
            direction,
        }
    }

    #[inline]
    pub fn properties(&self) -> &'static BlockProperties {
        BlockCatalog::properties(self.kind)
    }

    pub fn friction(&self) -> f32 {
        self.properties().friction
    }

    pub fn bounce_magnitude(&self) -> f32 {
        self.properties().bounce_magnitude
    }

    pub fn is_lethal(&self) -> bool {
        self.properties().lethal
    }

    pub fn is_blocking(&self) -> bool {
        self.properties().blocking
    }

    pub fn is_grabbable(&self) -> bool {
        self.properties().grabbable
    }

    /// The reflecting face, if this is a bounce block.
    pub fn bounce_direction(&self) -> Option<BounceDirection> {
        (self.kind == BlockKind::Bounce).then_some(self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_follow_kind() {
        let a = Collider::new(BlockKind::Ice, Rect::new(0.0, 0.0, 32.0, 32.0));
        let b = Collider::new(BlockKind::Ice, Rect::new(500.0, 90.0, 8.0, 8.0));
        assert_eq!(a.properties(), b.properties());
        assert!(a.friction() > BlockCatalog::properties(BlockKind::Wall).friction);
    }

    #[test]
    fn only_death_is_lethal() {
        for kind in [
            BlockKind::Wall,
            BlockKind::Platform,
            BlockKind::Ice,
            BlockKind::Bounce,
        ] {
            assert!(!BlockCatalog::properties(kind).lethal);
            assert!(BlockCatalog::properties(kind).blocking);
        }
        assert!(BlockCatalog::properties(BlockKind::Death).lethal);
        assert!(!BlockCatalog::properties(BlockKind::Death).blocking);
    }

    #[test]
    fn bounce_direction_only_for_bounce() {
        let rect = Rect::new(0.0, 0.0, 32.0, 32.0);
        assert_eq!(
            Collider::bounce(rect, BounceDirection::Left).bounce_direction(),
            Some(BounceDirection::Left)
        );
        assert_eq!(Collider::new(BlockKind::Wall, rect).bounce_direction(), None);
    }
}
