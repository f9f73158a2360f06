//! The controllable body.
//!
//! [`PlayerBody::update`] runs one fixed tick in a strict order: energy
//! bookkeeping, ground probe, facing, discrete actions, acceleration, sprint,
//! resistance, integration, wall grab, the resolved move, and finally the
//! world mutations that follow from it (pickups, interactions).

pub mod abilities;
pub mod collision;
pub mod kinematics;

pub use abilities::{Ability, AbilityController, AbilitySet, AbilityState, Actions};
pub use collision::{CollisionResolver, MoveOutcome};
pub use kinematics::{ground_support, KinematicIntegrator};

use std::time::Duration;

use glam::Vec2;

use crate::config::MovementConfig;
use crate::energy::EnergyResource;
use crate::input::{Buttons, InputSnapshot};
use crate::world::{InteractableKind, Rect, World};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1 for left, 1 for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Kinematic state of the hit box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Top-left corner. Only written after a move resolves without death.
    pub position: Vec2,
    /// Position at the start of the last tick, for render interpolation.
    pub prev_position: Vec2,
    pub velocity: Vec2,
    /// Recomputed every tick.
    pub acceleration: Vec2,
    pub facing: Facing,
    pub size: Vec2,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            prev_position: position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            facing: Facing::default(),
            size,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }
}

/// Something the layers above the core may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Landed,
    Died,
    GrantedAbility(Ability),
    ReachedExit,
    Attack { facing: Facing },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<PlayerEvent>,
    /// Support state after the move.
    pub grounded: bool,
}

impl TickReport {
    pub fn contains(&self, event: PlayerEvent) -> bool {
        self.events.contains(&event)
    }
}

/// Sprite selection for the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnimationState {
    #[default]
    Idle,
    Walking,
    Running,
    Jumping,
    Falling,
    DoubleJumping,
    WallGrabbing,
    WallJumping,
    Teleporting,
}

impl AnimationState {
    /// `dashed` marks the tick a teleport fired. The `teleporting` flag itself
    /// outlives the dash until the next landing.
    fn from_state(body: &Body, abilities: &AbilityState, grounded: bool, dashed: bool) -> Self {
        if dashed {
            AnimationState::Teleporting
        } else if abilities.wall_grabbing() {
            AnimationState::WallGrabbing
        } else if abilities.wall_jumping() {
            AnimationState::WallJumping
        } else if !grounded {
            if abilities.double_jumping() {
                AnimationState::DoubleJumping
            } else if body.velocity.y < 0.0 {
                AnimationState::Jumping
            } else {
                AnimationState::Falling
            }
        } else if body.velocity.x == 0.0 {
            AnimationState::Idle
        } else if abilities.sprinting() {
            AnimationState::Running
        } else {
            AnimationState::Walking
        }
    }
}

/// Snapshot of a completed tick for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec2,
    pub prev_position: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub animation: AnimationState,
    /// Abilities in progress.
    pub active: AbilitySet,
    pub energy_fraction: f32,
}

impl Pose {
    /// Blend between the last two positions. `alpha` in [0, 1].
    pub fn interpolated_position(&self, alpha: f32) -> Vec2 {
        self.prev_position.lerp(self.position, alpha.clamp(0.0, 1.0))
    }
}

pub struct PlayerBody {
    config: MovementConfig,
    pub body: Body,
    pub abilities: AbilityState,
    energy: EnergyResource,
    grounded: bool,
    /// A teleport fired during the last tick.
    dashed: bool,
}

impl PlayerBody {
    pub fn new(config: MovementConfig, spawn: Vec2) -> Self {
        let energy = EnergyResource::new(
            config.max_energy,
            config.energy_regen,
            config.energy_cooldown(),
        );
        Self {
            body: Body::new(spawn, config.body_size()),
            abilities: AbilityState::new(),
            energy,
            grounded: false,
            dashed: false,
            config,
        }
    }

    /// Put the body back at `spawn` at rest. Unlocks and energy are kept.
    pub fn respawn(&mut self, spawn: Vec2) {
        let facing = self.body.facing;
        self.body = Body::new(spawn, self.config.body_size());
        self.body.facing = facing;
        self.abilities.clear_transient();
        self.grounded = false;
        self.dashed = false;
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn energy(&self) -> &EnergyResource {
        &self.energy
    }

    pub fn energy_mut(&mut self) -> &mut EnergyResource {
        &mut self.energy
    }

    pub fn energy_fraction(&self) -> f32 {
        self.energy.fraction()
    }

    pub fn grounded(&self) -> bool {
        self.grounded
    }

    pub fn unlock(&mut self, ability: Ability) -> bool {
        self.abilities.unlock(ability)
    }

    pub fn pose(&self) -> Pose {
        let mut active = self.abilities.active();
        if !self.dashed {
            active.remove(Ability::Teleport);
        }
        Pose {
            position: self.body.position,
            prev_position: self.body.prev_position,
            size: self.body.size,
            facing: self.body.facing,
            animation: AnimationState::from_state(
                &self.body,
                &self.abilities,
                self.grounded,
                self.dashed,
            ),
            active,
            energy_fraction: self.energy.fraction(),
        }
    }

    /// Advance one fixed tick.
    pub fn update(&mut self, world: &mut World, input: &InputSnapshot, now: Duration) -> TickReport {
        let mut events = Vec::new();
        self.body.prev_position = self.body.position;

        self.energy.tick(now);

        let was_grounded = ground_support(world, &self.body.rect(), false).is_some();

        let controller = AbilityController::new(&self.config, input, now);
        let direction = controller.direction();
        if direction < 0.0 {
            self.body.facing = Facing::Left;
        } else if direction > 0.0 {
            self.body.facing = Facing::Right;
        }

        let actions = controller.handle_actions(
            &mut self.body,
            &mut self.abilities,
            &mut self.energy,
            was_grounded,
            &mut events,
        );

        self.dashed = actions.teleported();

        // A platform drop loses support for this tick
        let support = ground_support(world, &self.body.rect(), actions.drop_through);
        let grounded = support.is_some();

        let integrator = KinematicIntegrator::new(&self.config);
        let mut acceleration = integrator.base_acceleration(grounded);
        acceleration.x += integrator.thrust(grounded, direction);
        acceleration.x *= controller.update_sprint(&mut self.abilities, &mut self.energy, grounded);
        integrator.apply_resistance(
            &mut acceleration,
            self.body.velocity,
            support.map(|i| world.collider(i)),
        );

        let mut delta = integrator.integrate(&mut self.body.velocity, acceleration);
        delta.x += actions.teleport_offset;
        self.body.acceleration = acceleration;

        let stop = controller.update_wall_grab(
            world,
            &self.body,
            &mut self.abilities,
            &mut self.energy,
            grounded,
            actions.teleported(),
        );
        if stop {
            self.body.velocity = Vec2::ZERO;
            self.body.acceleration = Vec2::ZERO;
            delta = Vec2::ZERO;
        }

        let outcome = CollisionResolver::new(world, actions.drop_through).resolve(
            self.body.rect(),
            delta,
            &mut self.body.velocity,
            &mut self.abilities,
        );
        if outcome.died {
            log::info!("Died at {:?}", self.body.position);
            events.push(PlayerEvent::Died);
            self.grounded = false;
            return TickReport {
                events,
                grounded: false,
            };
        }

        self.body.position = outcome.rect.min;
        self.body.velocity.y = integrator.clamp_vertical(self.body.velocity.y);
        if outcome.landed {
            events.push(PlayerEvent::Landed);
        }

        for (entity, _) in outcome.pickups {
            if let Some(ability) = world.consume_pickup(entity) {
                self.grant(ability, &mut events);
            }
        }

        if input.pressed(Buttons::INTERACT) {
            self.interact(world, &mut events);
        }

        self.grounded = ground_support(world, &self.body.rect(), false).is_some();
        TickReport {
            events,
            grounded: self.grounded,
        }
    }

    fn grant(&mut self, ability: Ability, events: &mut Vec<PlayerEvent>) {
        if self.abilities.unlock(ability) {
            log::info!("Gained {ability}");
        }
        events.push(PlayerEvent::GrantedAbility(ability));
    }

    fn interact(&mut self, world: &mut World, events: &mut Vec<PlayerEvent>) {
        for (entity, interactable) in world.interactables_overlapping(&self.body.rect()) {
            match interactable.kind {
                InteractableKind::Exit => events.push(PlayerEvent::ReachedExit),
                InteractableKind::Button { grants } => {
                    let on = world.toggle_interactable(entity);
                    log::debug!("Button toggled: {on:?}");
                    if let Some(ability) = grants {
                        if self.abilities.unlock(ability) {
                            log::info!("Gained {ability}");
                            events.push(PlayerEvent::GrantedAbility(ability));
                        }
                    }
                }
            }
        }
    }
}
