//! Acceleration and velocity integration.
//!
//! Per-tick units: gravity and thrust are added straight onto velocity each
//! tick. Friction is an impulse-style term proportional to horizontal speed.

use glam::Vec2;

use crate::config::MovementConfig;
use crate::world::{BlockKind, Collider, Rect, World};

/// Collider the body is standing on, if any.
///
/// Probes one unit below the body. Platforms only count when the body is on
/// top of them (not inside) and no drop-through is active; death blocks
/// never support.
pub fn ground_support(world: &World, rect: &Rect, drop_through: bool) -> Option<usize> {
    let probe = rect.translated(Vec2::Y);
    world
        .colliders_overlapping(&probe)
        .into_iter()
        .find(|&i| supports(world.collider(i), rect, drop_through))
}

fn supports(collider: &Collider, rect: &Rect, drop_through: bool) -> bool {
    if !collider.is_blocking() {
        return false;
    }
    match collider.kind {
        BlockKind::Platform => !drop_through && rect.bottom() <= collider.rect.top(),
        _ => true,
    }
}

pub struct KinematicIntegrator<'a> {
    config: &'a MovementConfig,
}

impl<'a> KinematicIntegrator<'a> {
    pub fn new(config: &'a MovementConfig) -> Self {
        Self { config }
    }

    /// Gravity when airborne, nothing when grounded.
    pub fn base_acceleration(&self, grounded: bool) -> Vec2 {
        if grounded {
            Vec2::ZERO
        } else {
            Vec2::new(0.0, self.config.gravity)
        }
    }

    /// Input-driven horizontal acceleration. `direction` is -1, 0 or 1.
    pub fn thrust(&self, grounded: bool, direction: f32) -> f32 {
        direction * self.config.thrust(grounded)
    }

    /// Air drag on the whole acceleration, or ground friction on x.
    pub fn apply_resistance(
        &self,
        acceleration: &mut Vec2,
        velocity: Vec2,
        support: Option<&Collider>,
    ) {
        match support {
            None => *acceleration *= self.config.drag,
            Some(ground) => acceleration.x += velocity.x * ground.friction(),
        }
    }

    /// Advance velocity by one tick and return the positional delta.
    pub fn integrate(&self, velocity: &mut Vec2, acceleration: Vec2) -> Vec2 {
        *velocity += acceleration;
        if velocity.x.abs() < self.config.velocity_snap {
            velocity.x = 0.0;
        }
        velocity.y = self.clamp_vertical(velocity.y);
        *velocity + 0.5 * acceleration
    }

    pub fn clamp_vertical(&self, vy: f32) -> f32 {
        vy.clamp(-self.config.max_jump_velocity, self.config.max_fall_velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_world(kind: BlockKind) -> World {
        let mut world = World::new();
        world.add_collider(Collider::new(kind, Rect::new(0.0, 100.0, 400.0, 32.0)));
        world
    }

    #[test]
    fn standing_on_wall_is_grounded() {
        let world = floor_world(BlockKind::Wall);
        assert_eq!(
            ground_support(&world, &Rect::new(10.0, 68.0, 32.0, 32.0), false),
            Some(0)
        );
        assert_eq!(
            ground_support(&world, &Rect::new(10.0, 60.0, 32.0, 32.0), false),
            None
        );
    }

    #[test]
    fn platform_supports_only_from_above() {
        let world = floor_world(BlockKind::Platform);
        let on_top = Rect::new(10.0, 68.0, 32.0, 32.0);
        assert_eq!(ground_support(&world, &on_top, false), Some(0));
        assert_eq!(ground_support(&world, &on_top, true), None);

        // Halfway through while jumping up from below
        let inside = Rect::new(10.0, 90.0, 32.0, 32.0);
        assert_eq!(ground_support(&world, &inside, false), None);
    }

    #[test]
    fn death_never_supports() {
        let world = floor_world(BlockKind::Death);
        assert_eq!(
            ground_support(&world, &Rect::new(10.0, 68.0, 32.0, 32.0), false),
            None
        );
    }

    #[test]
    fn air_thrust_is_a_fifth() {
        let config = MovementConfig::default();
        let k = KinematicIntegrator::new(&config);
        assert_eq!(k.thrust(true, -1.0), -config.ground_acceleration);
        assert!((k.thrust(false, 1.0) - 0.2 * config.ground_acceleration).abs() < 1e-6);
        assert_eq!(k.thrust(true, 0.0), 0.0);
    }

    #[test]
    fn drag_scales_gravity_in_air() {
        let config = MovementConfig::default();
        let k = KinematicIntegrator::new(&config);
        let mut acc = k.base_acceleration(false);
        k.apply_resistance(&mut acc, Vec2::ZERO, None);
        assert!((acc.y - config.gravity * config.drag).abs() < 1e-6);
    }

    #[test]
    fn ice_decays_slower_than_wall() {
        let config = MovementConfig::default();
        let k = KinematicIntegrator::new(&config);
        let wall = Collider::new(BlockKind::Wall, Rect::new(0.0, 0.0, 1.0, 1.0));
        let ice = Collider::new(BlockKind::Ice, Rect::new(0.0, 0.0, 1.0, 1.0));

        let coast = |ground: &Collider| {
            let mut velocity = Vec2::new(10.0, 0.0);
            for _ in 0..20 {
                let mut acc = k.base_acceleration(true);
                k.apply_resistance(&mut acc, velocity, Some(ground));
                k.integrate(&mut velocity, acc);
            }
            velocity.x
        };
        let on_wall = coast(&wall);
        let on_ice = coast(&ice);
        assert!(on_wall < on_ice);
        assert!(on_ice < 10.0);
    }

    #[test]
    fn integrate_snaps_and_clamps() {
        let config = MovementConfig::default();
        let k = KinematicIntegrator::new(&config);

        let mut velocity = Vec2::new(0.05, 14.5);
        let delta = k.integrate(&mut velocity, Vec2::new(0.0, 1.0));
        assert_eq!(velocity, Vec2::new(0.0, config.max_fall_velocity));
        assert_eq!(delta, Vec2::new(0.0, config.max_fall_velocity + 0.5));

        let mut velocity = Vec2::new(0.0, -30.0);
        k.integrate(&mut velocity, Vec2::ZERO);
        assert_eq!(velocity.y, -config.max_jump_velocity);
    }
}
