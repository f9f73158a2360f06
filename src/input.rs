//! Per-tick input.
//!
//! Devices are sampled once per tick into a [`RawInput`] (held state). The
//! [`InputSampler`] turns consecutive samples into an immutable
//! [`InputSnapshot`] carrying edge events, which every part of the tick reads.

use serde::{Deserialize, Serialize};

/// Discrete edge events for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons(pub u16);

impl Buttons {
    /// Jump went down this tick.
    pub const JUMP_PRESSED: u16 = 1 << 0;

    /// Jump went up this tick.
    pub const JUMP_RELEASED: u16 = 1 << 1;

    /// Explicit double jump request.
    pub const DOUBLE_JUMP: u16 = 1 << 2;

    pub const TELEPORT_LEFT: u16 = 1 << 3;

    pub const TELEPORT_RIGHT: u16 = 1 << 4;

    pub const ATTACK: u16 = 1 << 5;

    /// Use an exit or button the body is standing in.
    pub const INTERACT: u16 = 1 << 6;

    #[inline]
    pub fn pressed(self, button: u16) -> bool {
        (self.0 & button) != 0
    }

    #[inline]
    pub fn press(&mut self, button: u16) {
        self.0 |= button;
    }
}

/// Everything the simulation reads from the input layer for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Horizontal stick, -1.0 (left) to 1.0 (right).
    pub horizontal: f32,
    /// Vertical stick, positive is down.
    pub vertical: f32,
    /// Wall-grab trigger, 0.0 to 1.0.
    pub grab_trigger: f32,
    /// Sprint trigger, 0.0 to 1.0.
    pub sprint_trigger: f32,
    pub buttons: Buttons,
}

impl InputSnapshot {
    /// Direction of the horizontal axis, or 0 inside the deadzone.
    #[inline]
    pub fn horizontal_direction(&self, deadzone: f32) -> f32 {
        if self.horizontal > deadzone {
            1.0
        } else if self.horizontal < -deadzone {
            -1.0
        } else {
            0.0
        }
    }

    #[inline]
    pub fn holding_down(&self, deadzone: f32) -> bool {
        self.vertical > deadzone
    }

    #[inline]
    pub fn grab_held(&self, deadzone: f32) -> bool {
        self.grab_trigger > deadzone
    }

    #[inline]
    pub fn sprint_held(&self, deadzone: f32) -> bool {
        self.sprint_trigger > deadzone
    }

    #[inline]
    pub fn pressed(&self, button: u16) -> bool {
        self.buttons.pressed(button)
    }

    /// Builder used by scripted input and tests.
    pub fn with_horizontal(mut self, value: f32) -> Self {
        self.horizontal = value;
        self
    }

    pub fn with_vertical(mut self, value: f32) -> Self {
        self.vertical = value;
        self
    }

    pub fn with_grab(mut self, value: f32) -> Self {
        self.grab_trigger = value;
        self
    }

    pub fn with_sprint(mut self, value: f32) -> Self {
        self.sprint_trigger = value;
        self
    }

    pub fn with_button(mut self, button: u16) -> Self {
        self.buttons.press(button);
        self
    }
}

/// Held device state, as polled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub horizontal: f32,
    pub vertical: f32,
    pub grab_trigger: f32,
    pub sprint_trigger: f32,
    pub jump: bool,
    pub double_jump: bool,
    pub teleport_left: bool,
    pub teleport_right: bool,
    pub attack: bool,
    pub interact: bool,
}

/// Derives edge events by comparing each sample with the previous one.
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    prev: RawInput,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, raw: RawInput) -> InputSnapshot {
        let prev = self.prev;
        self.prev = raw;

        let mut buttons = Buttons::default();
        let rising = |now: bool, before: bool| now && !before;
        if rising(raw.jump, prev.jump) {
            buttons.press(Buttons::JUMP_PRESSED);
        }
        if rising(prev.jump, raw.jump) {
            buttons.press(Buttons::JUMP_RELEASED);
        }
        if rising(raw.double_jump, prev.double_jump) {
            buttons.press(Buttons::DOUBLE_JUMP);
        }
        if rising(raw.teleport_left, prev.teleport_left) {
            buttons.press(Buttons::TELEPORT_LEFT);
        }
        if rising(raw.teleport_right, prev.teleport_right) {
            buttons.press(Buttons::TELEPORT_RIGHT);
        }
        if rising(raw.attack, prev.attack) {
            buttons.press(Buttons::ATTACK);
        }
        if rising(raw.interact, prev.interact) {
            buttons.press(Buttons::INTERACT);
        }

        InputSnapshot {
            horizontal: raw.horizontal,
            vertical: raw.vertical,
            grab_trigger: raw.grab_trigger,
            sprint_trigger: raw.sprint_trigger,
            buttons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadzone_gates_horizontal() {
        let snap = InputSnapshot::default().with_horizontal(0.8);
        assert_eq!(snap.horizontal_direction(0.85), 0.0);
        let snap = snap.with_horizontal(-0.9);
        assert_eq!(snap.horizontal_direction(0.85), -1.0);
        let snap = snap.with_horizontal(1.0);
        assert_eq!(snap.horizontal_direction(0.85), 1.0);
    }

    #[test]
    fn jump_edges() {
        let mut sampler = InputSampler::new();
        let held = RawInput {
            jump: true,
            ..Default::default()
        };

        let first = sampler.sample(held);
        assert!(first.pressed(Buttons::JUMP_PRESSED));
        assert!(!first.pressed(Buttons::JUMP_RELEASED));

        // Holding does not re-trigger
        let second = sampler.sample(held);
        assert_eq!(second.buttons, Buttons::default());

        let released = sampler.sample(RawInput::default());
        assert!(released.pressed(Buttons::JUMP_RELEASED));
        assert!(!released.pressed(Buttons::JUMP_PRESSED));
    }

    #[test]
    fn axes_pass_through() {
        let mut sampler = InputSampler::new();
        let snap = sampler.sample(RawInput {
            horizontal: -1.0,
            grab_trigger: 0.9,
            teleport_right: true,
            ..Default::default()
        });
        assert_eq!(snap.horizontal, -1.0);
        assert!(snap.grab_held(0.85));
        assert!(snap.pressed(Buttons::TELEPORT_RIGHT));
    }
}
