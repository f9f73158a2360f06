//! Unlockable abilities and their per-tick decisions.
//!
//! Precedence rules:
//!
//! - A jump press is dispatched to exactly one of: platform drop, wall jump,
//!   ground jump, double jump (first match wins).
//! - The wall-grab stop is never engaged while `wall_jumping` is set, so a
//!   wall jump always moves.
//! - `double_jumping`, `wall_jumping`, `wall_grabbing` and `teleporting` are
//!   cleared only by the landing reset.

use std::fmt;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::MovementConfig;
use crate::energy::EnergyResource;
use crate::input::{Buttons, InputSnapshot};
use crate::world::{Rect, World};

use super::{Body, Facing, PlayerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    DoubleJump,
    WallGrab,
    Sprint,
    Teleport,
    WallJump,
}

impl Ability {
    pub const ALL: [Ability; 5] = [
        Self::DoubleJump,
        Self::WallGrab,
        Self::Sprint,
        Self::Teleport,
        Self::WallJump,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::DoubleJump => "Double Jump",
            Self::WallGrab => "Wall Grab",
            Self::Sprint => "Sprint",
            Self::Teleport => "Teleport",
            Self::WallJump => "Wall Jump",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of unlocked abilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySet(pub u8);

impl AbilitySet {
    pub fn all() -> Self {
        Ability::ALL.into_iter().collect()
    }

    #[inline]
    pub fn contains(self, ability: Ability) -> bool {
        (self.0 & ability.bit()) != 0
    }

    /// Returns `true` if the ability was not already present.
    #[inline]
    pub fn insert(&mut self, ability: Ability) -> bool {
        let added = !self.contains(ability);
        self.0 |= ability.bit();
        added
    }

    #[inline]
    pub fn remove(&mut self, ability: Ability) {
        self.0 &= !ability.bit();
    }
}

impl FromIterator<Ability> for AbilitySet {
    fn from_iter<I: IntoIterator<Item = Ability>>(iter: I) -> Self {
        let mut set = Self::default();
        for ability in iter {
            set.insert(ability);
        }
        set
    }
}

/// Unlocks plus the transient flags of abilities in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbilityState {
    pub unlocked: AbilitySet,
    double_jumping: bool,
    wall_grabbing: bool,
    wall_jumping: bool,
    sprinting: bool,
    teleporting: bool,
    /// Side of the wall currently held.
    wall_side: Option<Facing>,
}

impl AbilityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unlocked(unlocked: AbilitySet) -> Self {
        Self {
            unlocked,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_unlocked(&self, ability: Ability) -> bool {
        self.unlocked.contains(ability)
    }

    /// Returns `true` if newly unlocked.
    pub fn unlock(&mut self, ability: Ability) -> bool {
        self.unlocked.insert(ability)
    }

    /// Whether the ability is in progress this tick.
    pub fn is_active(&self, ability: Ability) -> bool {
        match ability {
            Ability::DoubleJump => self.double_jumping,
            Ability::WallGrab => self.wall_grabbing,
            Ability::Sprint => self.sprinting,
            Ability::Teleport => self.teleporting,
            Ability::WallJump => self.wall_jumping,
        }
    }

    /// Every ability in progress this tick.
    pub fn active(&self) -> AbilitySet {
        Ability::ALL
            .into_iter()
            .filter(|&ability| self.is_active(ability))
            .collect()
    }

    #[inline]
    pub fn double_jumping(&self) -> bool {
        self.double_jumping
    }

    #[inline]
    pub fn wall_grabbing(&self) -> bool {
        self.wall_grabbing
    }

    #[inline]
    pub fn wall_jumping(&self) -> bool {
        self.wall_jumping
    }

    #[inline]
    pub fn sprinting(&self) -> bool {
        self.sprinting
    }

    #[inline]
    pub fn teleporting(&self) -> bool {
        self.teleporting
    }

    pub fn wall_side(&self) -> Option<Facing> {
        self.wall_side
    }

    /// Flags cleared by landing on blocking ground.
    pub fn landing_reset(&mut self) {
        self.double_jumping = false;
        self.wall_jumping = false;
        self.release_wall();
        self.teleporting = false;
    }

    /// Drop every transient flag; unlocks survive.
    pub fn clear_transient(&mut self) {
        self.landing_reset();
        self.sprinting = false;
    }

    fn release_wall(&mut self) {
        self.wall_grabbing = false;
        self.wall_side = None;
    }
}

/// Result of the discrete-action phase of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Actions {
    /// Ignore one-way platforms for this tick.
    pub drop_through: bool,
    /// Extra horizontal offset requested by a teleport.
    pub teleport_offset: f32,
}

impl Actions {
    pub fn teleported(&self) -> bool {
        self.teleport_offset != 0.0
    }
}

/// Per-tick ability decisions, all read from one input snapshot.
pub struct AbilityController<'a> {
    config: &'a MovementConfig,
    input: &'a InputSnapshot,
    now: Duration,
}

impl<'a> AbilityController<'a> {
    pub fn new(config: &'a MovementConfig, input: &'a InputSnapshot, now: Duration) -> Self {
        Self { config, input, now }
    }

    /// Registered horizontal direction, or 0 inside the deadzone.
    pub fn direction(&self) -> f32 {
        self.input.horizontal_direction(self.config.input_deadzone)
    }

    /// Jumps, jump cut, teleport and attack.
    pub fn handle_actions(
        &self,
        body: &mut Body,
        state: &mut AbilityState,
        energy: &mut EnergyResource,
        grounded: bool,
        events: &mut Vec<PlayerEvent>,
    ) -> Actions {
        let mut actions = Actions::default();
        let deadzone = self.config.input_deadzone;

        if self.input.pressed(Buttons::JUMP_PRESSED) {
            if self.input.holding_down(deadzone) {
                actions.drop_through = grounded;
            } else if state.wall_grabbing
                && !grounded
                && state.is_unlocked(Ability::WallJump)
                && !state.wall_jumping
                && energy.current() > 0.0
            {
                self.wall_jump(body, state);
            } else if grounded {
                body.velocity.y = -self.config.jump_impulse;
                log::debug!("Jump from {:?}", body.position);
            } else {
                self.try_double_jump(body, state, grounded);
            }
        }

        if self.input.pressed(Buttons::DOUBLE_JUMP) {
            self.try_double_jump(body, state, grounded);
        }

        if self.input.pressed(Buttons::JUMP_RELEASED) {
            self.jump_cut(body, grounded);
        }

        if self.input.pressed(Buttons::TELEPORT_LEFT) {
            actions.teleport_offset += self.try_teleport(body, state, energy, Facing::Left);
        }
        if self.input.pressed(Buttons::TELEPORT_RIGHT) {
            actions.teleport_offset += self.try_teleport(body, state, energy, Facing::Right);
        }

        if self.input.pressed(Buttons::ATTACK) {
            events.push(PlayerEvent::Attack {
                facing: body.facing,
            });
        }

        actions
    }

    /// Returns `true` if the double jump fired.
    pub fn try_double_jump(&self, body: &mut Body, state: &mut AbilityState, grounded: bool) -> bool {
        if !state.is_unlocked(Ability::DoubleJump) || grounded || state.double_jumping {
            return false;
        }
        state.double_jumping = true;
        body.velocity.y = -self.config.jump_impulse;
        log::debug!("Double jump at {:?}", body.position);
        true
    }

    /// Variable jump height: releasing early caps the ascent.
    pub fn jump_cut(&self, body: &mut Body, grounded: bool) {
        let cut = self.config.jump_cut_velocity;
        if !grounded && body.velocity.y < -cut {
            body.velocity.y = -cut;
        }
    }

    fn wall_jump(&self, body: &mut Body, state: &mut AbilityState) {
        let wall = state.wall_side.unwrap_or(body.facing);
        let outward = wall.opposite();
        state.release_wall();
        state.wall_jumping = true;
        body.facing = outward;
        body.velocity = Vec2::new(
            outward.sign() * self.config.wall_jump_push,
            -self.config.wall_jump_impulse,
        );
        log::debug!("Wall jump off {:?} wall", wall);
    }

    /// Returns the horizontal offset to add to this tick's move.
    fn try_teleport(
        &self,
        body: &mut Body,
        state: &mut AbilityState,
        energy: &mut EnergyResource,
        direction: Facing,
    ) -> f32 {
        if !state.is_unlocked(Ability::Teleport) || energy.current() < energy.max() / 2.0 {
            return 0.0;
        }
        energy.drain(self.now);
        state.teleporting = true;
        body.facing = direction;
        log::debug!("Teleport {:?} from {:?}", direction, body.position);
        direction.sign() * self.config.teleport_distance
    }

    /// Decide sprint for this tick and debit its cost.
    ///
    /// Returns the horizontal thrust multiplier.
    pub fn update_sprint(
        &self,
        state: &mut AbilityState,
        energy: &mut EnergyResource,
        grounded: bool,
    ) -> f32 {
        let wants = state.is_unlocked(Ability::Sprint)
            && grounded
            && self.input.sprint_held(self.config.input_deadzone)
            && self.direction() != 0.0;

        state.sprinting = wants && energy.try_consume(self.config.sprint_cost, self.now);
        if state.sprinting {
            self.config.sprint_multiplier
        } else {
            1.0
        }
    }

    /// Decide the wall grab for this tick and debit its cost.
    ///
    /// Returns `true` if the body must stop (no move this tick).
    pub fn update_wall_grab(
        &self,
        world: &World,
        body: &Body,
        state: &mut AbilityState,
        energy: &mut EnergyResource,
        grounded: bool,
        teleported: bool,
    ) -> bool {
        let eligible = state.is_unlocked(Ability::WallGrab)
            && !grounded
            && !teleported
            && !state.wall_jumping
            && self.input.grab_held(self.config.input_deadzone);
        if !eligible {
            state.release_wall();
            return false;
        }

        let side = match self.direction() {
            d if d < 0.0 => Facing::Left,
            d if d > 0.0 => Facing::Right,
            _ => body.facing,
        };
        if !touching_wall(world, &body.rect(), side)
            || !energy.try_consume(self.config.grab_cost, self.now)
        {
            state.release_wall();
            return false;
        }

        state.wall_grabbing = true;
        state.wall_side = Some(side);
        true
    }
}

/// Is there a grabbable collider directly beside `rect` on `side`?
pub fn touching_wall(world: &World, rect: &Rect, side: Facing) -> bool {
    let probe = rect.translated(Vec2::new(side.sign(), 0.0));
    world
        .colliders_overlapping(&probe)
        .into_iter()
        .any(|i| world.collider(i).is_grabbable())
}
