//! Axis-separated move-and-resolve.
//!
//! The body moves along x, then along y, and after each shift every
//! overlapping collider reacts according to its kind. When several colliders
//! overlap in one pass their reactions all apply, in world order, so the last
//! one wins where they conflict.

use glam::Vec2;

use crate::world::{BlockKind, BounceDirection, Collider, Rect, World};

use super::abilities::{Ability, AbilityState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn offset(self, amount: f32) -> Vec2 {
        match self {
            Axis::X => Vec2::new(amount, 0.0),
            Axis::Y => Vec2::new(0.0, amount),
        }
    }

    fn extent(self, rect: &Rect) -> f32 {
        match self {
            Axis::X => rect.size.x,
            Axis::Y => rect.size.y,
        }
    }
}

/// What happened during one resolved move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// Where the body ends up. Not meaningful if `died` is set.
    pub rect: Rect,
    /// The body touched a lethal collider.
    pub died: bool,
    /// A downward move came to rest on blocking ground.
    pub landed: bool,
    /// Pickups overlapping the final rect, still present in the world.
    pub pickups: Vec<(hecs::Entity, Ability)>,
}

impl MoveOutcome {
    fn at(rect: Rect) -> Self {
        Self {
            rect,
            died: false,
            landed: false,
            pickups: Vec::new(),
        }
    }
}

/// Resolves proposed moves against a frozen world.
pub struct CollisionResolver<'a> {
    world: &'a World,
    /// One-way platforms are ignored for this move.
    drop_through: bool,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(world: &'a World, drop_through: bool) -> Self {
        Self {
            world,
            drop_through,
        }
    }

    /// Move `rect` by `delta`, mutating velocity and ability flags as the
    /// colliders dictate.
    ///
    /// A zero delta moves nothing and mutates nothing; it only reports lethal
    /// overlap and pickups at the current rect.
    pub fn resolve(
        &self,
        rect: Rect,
        delta: Vec2,
        velocity: &mut Vec2,
        abilities: &mut AbilityState,
    ) -> MoveOutcome {
        let mut outcome = MoveOutcome::at(rect);
        if delta == Vec2::ZERO {
            outcome.died = self.touches_lethal(&rect);
            if !outcome.died {
                outcome.pickups = self.world.pickups_overlapping(&rect);
            }
            return outcome;
        }

        if delta.x != 0.0 {
            self.move_axis(Axis::X, delta.x, &mut outcome, velocity, abilities);
            if outcome.died {
                return outcome;
            }
        }
        if delta.y != 0.0 {
            self.move_axis(Axis::Y, delta.y, &mut outcome, velocity, abilities);
            if outcome.died {
                return outcome;
            }
        }

        outcome.pickups = self.world.pickups_overlapping(&outcome.rect);
        outcome
    }

    fn touches_lethal(&self, rect: &Rect) -> bool {
        self.world
            .colliders_overlapping(rect)
            .into_iter()
            .any(|i| self.world.collider(i).is_lethal())
    }

    /// Moves larger than the body are split into body-sized steps so nothing
    /// thinner than the body can be skipped over. A clamped step ends the pass.
    fn move_axis(
        &self,
        axis: Axis,
        amount: f32,
        outcome: &mut MoveOutcome,
        velocity: &mut Vec2,
        abilities: &mut AbilityState,
    ) {
        let extent = axis.extent(&outcome.rect);
        let steps = if extent > 0.0 {
            (amount.abs() / extent).ceil().max(1.0) as u32
        } else {
            1
        };
        let step = amount / steps as f32;

        for _ in 0..steps {
            let before = outcome.rect;
            let moved = before.translated(axis.offset(step));
            let candidates = self.world.candidates(&union(&before, &moved));

            // Death wins over any clamping this tick
            if candidates.iter().any(|&i| {
                let collider = self.world.collider(i);
                collider.is_lethal() && collider.rect.overlaps(&moved)
            }) {
                outcome.died = true;
                return;
            }

            // Overlaps are gathered once against the moved rect, then every
            // reaction applies in order.
            outcome.rect = moved;
            let mut clamped = false;
            for &i in &candidates {
                let collider = self.world.collider(i);
                if !collider.rect.overlaps(&moved) {
                    continue;
                }
                clamped |= self.react(axis, step, &before, collider, outcome, velocity, abilities);
            }
            if clamped {
                break;
            }
        }
    }

    /// Apply one collider's reaction. Returns `true` if the rect was clamped.
    #[allow(clippy::too_many_arguments)]
    fn react(
        &self,
        axis: Axis,
        step: f32,
        before: &Rect,
        collider: &Collider,
        outcome: &mut MoveOutcome,
        velocity: &mut Vec2,
        abilities: &mut AbilityState,
    ) -> bool {
        match collider.kind {
            BlockKind::Death => false,
            BlockKind::Platform => {
                let landing = axis == Axis::Y
                    && step > 0.0
                    && !self.drop_through
                    && before.bottom() <= collider.rect.top();
                if landing {
                    block(axis, step, collider, outcome, velocity, abilities);
                }
                landing
            }
            BlockKind::Wall | BlockKind::Ice => {
                block(axis, step, collider, outcome, velocity, abilities);
                true
            }
            BlockKind::Bounce => {
                if face_hit(axis, step) == collider.direction {
                    bounce(axis, step, collider, outcome, velocity, abilities);
                } else {
                    block(axis, step, collider, outcome, velocity, abilities);
                }
                true
            }
        }
    }
}

/// Face of a collider struck by a move along `axis`.
fn face_hit(axis: Axis, step: f32) -> BounceDirection {
    match (axis, step > 0.0) {
        (Axis::X, true) => BounceDirection::Left,
        (Axis::X, false) => BounceDirection::Right,
        (Axis::Y, true) => BounceDirection::Up,
        (Axis::Y, false) => BounceDirection::Down,
    }
}

/// Put the moving edge flush against the collider's near face.
fn clamp_to_face(axis: Axis, step: f32, collider: &Collider, rect: &mut Rect) {
    match (axis, step > 0.0) {
        (Axis::X, true) => rect.set_right(collider.rect.left()),
        (Axis::X, false) => rect.set_left(collider.rect.right()),
        (Axis::Y, true) => rect.set_bottom(collider.rect.top()),
        (Axis::Y, false) => rect.set_top(collider.rect.bottom()),
    }
}

/// Solid reaction: clamp and stop. Landing on top performs the landing reset.
fn block(
    axis: Axis,
    step: f32,
    collider: &Collider,
    outcome: &mut MoveOutcome,
    velocity: &mut Vec2,
    abilities: &mut AbilityState,
) {
    clamp_to_face(axis, step, collider, &mut outcome.rect);
    match axis {
        Axis::X => velocity.x = 0.0,
        Axis::Y => {
            velocity.y = 0.0;
            if step > 0.0 {
                abilities.landing_reset();
                outcome.landed = true;
            }
        }
    }
}

/// Matching bounce face: clamp, then reflect away from the surface.
fn bounce(
    axis: Axis,
    step: f32,
    collider: &Collider,
    outcome: &mut MoveOutcome,
    velocity: &mut Vec2,
    abilities: &mut AbilityState,
) {
    clamp_to_face(axis, step, collider, &mut outcome.rect);
    let magnitude = collider.bounce_magnitude();
    match collider.direction {
        BounceDirection::Up => {
            velocity.y = -velocity.y - magnitude;
            abilities.landing_reset();
        }
        BounceDirection::Down => velocity.y = -velocity.y + magnitude,
        BounceDirection::Left => velocity.x = -velocity.x - magnitude,
        BounceDirection::Right => velocity.x = -velocity.x + magnitude,
    }
}

fn union(a: &Rect, b: &Rect) -> Rect {
    let min = a.min.min(b.min);
    let max = a.max().max(b.max());
    Rect::from_min_size(min, max - min)
}
