//! Shared ability energy.
//!
//! Two states: regenerating and cooling down. Emptying the meter starts a
//! cooldown measured on a [`Clock`], during which nothing regenerates.

use std::cell::Cell;
use std::time::Duration;

use instant::Instant;

/// Monotonic time source. Times are offsets from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Used for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[derive(Debug, Clone)]
pub struct EnergyResource {
    current: f32,
    max: f32,
    regen_per_tick: f32,
    cooldown: Duration,
    cooling_down: bool,
    cooldown_deadline: Duration,
}

impl EnergyResource {
    /// A full meter.
    pub fn new(max: f32, regen_per_tick: f32, cooldown: Duration) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            regen_per_tick,
            cooldown,
            cooling_down: false,
            cooldown_deadline: Duration::ZERO,
        }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    pub fn cooling_down(&self) -> bool {
        self.cooling_down
    }

    /// Fill level in `[0, 1]` for status bars.
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Overwrite the level, clamped to `[0, max]`. Does not start a cooldown.
    pub fn set_current(&mut self, value: f32) {
        self.current = value.clamp(0.0, self.max);
    }

    #[inline]
    pub fn can_afford(&self, amount: f32) -> bool {
        self.current >= amount
    }

    /// Start-of-tick bookkeeping: finish an elapsed cooldown or regenerate.
    ///
    /// The tick that ends a cooldown does not regenerate; the next one does.
    pub fn tick(&mut self, now: Duration) {
        if self.cooling_down {
            if now >= self.cooldown_deadline {
                self.cooling_down = false;
                log::debug!("Energy cooldown finished");
            }
            return;
        }
        self.current = (self.current + self.regen_per_tick).clamp(0.0, self.max);
    }

    /// Debit `amount` if the meter holds at least that much.
    ///
    /// All-or-nothing: on failure nothing changes.
    pub fn try_consume(&mut self, amount: f32, now: Duration) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        if self.current <= 0.0 {
            self.start_cooldown(now);
        }
        true
    }

    /// Empty the meter and start the cooldown.
    pub fn drain(&mut self, now: Duration) {
        self.current = 0.0;
        self.start_cooldown(now);
    }

    fn start_cooldown(&mut self, now: Duration) {
        self.current = 0.0;
        self.cooling_down = true;
        self.cooldown_deadline = now + self.cooldown;
        log::debug!("Energy depleted, cooling down for {:?}", self.cooldown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_millis(2000);

    fn meter() -> EnergyResource {
        EnergyResource::new(100.0, 0.5, COOLDOWN)
    }

    #[test]
    fn regen_clamps_to_max() {
        let mut energy = meter();
        energy.set_current(99.8);
        energy.tick(Duration::ZERO);
        assert_eq!(energy.current(), 100.0);
    }

    #[test]
    fn consume_is_all_or_nothing() {
        let mut energy = meter();
        energy.set_current(4.0);
        assert!(!energy.try_consume(5.0, Duration::ZERO));
        assert_eq!(energy.current(), 4.0);
        assert!(energy.try_consume(4.0, Duration::ZERO));
        assert_eq!(energy.current(), 0.0);
    }

    #[test]
    fn emptying_starts_cooldown_immediately() {
        let clock = ManualClock::new();
        let mut energy = meter();
        energy.set_current(5.0);

        assert!(energy.try_consume(5.0, clock.now()));
        assert!(energy.cooling_down());

        // No regeneration anywhere inside the window
        for _ in 0..10 {
            clock.advance(Duration::from_millis(150));
            energy.tick(clock.now());
            assert_eq!(energy.current(), 0.0);
            assert!(energy.cooling_down());
        }
    }

    #[test]
    fn cooldown_ends_then_regen_resumes_next_tick() {
        let clock = ManualClock::new();
        let mut energy = meter();
        energy.drain(clock.now());

        clock.advance(COOLDOWN);
        energy.tick(clock.now());
        assert!(!energy.cooling_down());
        assert_eq!(energy.current(), 0.0);

        energy.tick(clock.now());
        assert_eq!(energy.current(), 0.5);
    }

    #[test]
    fn re_draining_resets_deadline() {
        let clock = ManualClock::new();
        let mut energy = meter();
        energy.drain(clock.now());

        clock.advance(Duration::from_millis(1500));
        energy.drain(clock.now());

        clock.advance(Duration::from_millis(1000));
        energy.tick(clock.now());
        assert!(energy.cooling_down());

        clock.advance(Duration::from_millis(1000));
        energy.tick(clock.now());
        assert!(!energy.cooling_down());
    }

    #[test]
    fn fraction_tracks_level() {
        let mut energy = meter();
        energy.set_current(25.0);
        assert_eq!(energy.fraction(), 0.25);
        energy.set_current(-3.0);
        assert_eq!(energy.fraction(), 0.0);
    }
}
