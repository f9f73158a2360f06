//! A play session: the level list, the live world and the persistent body.
//!
//! The body (unlocks, energy) survives deaths and level changes; the world is
//! rebuilt from its [`LevelDef`] on every load.

use crate::config::MovementConfig;
use crate::energy::Clock;
use crate::input::InputSnapshot;
use crate::player::{PlayerBody, PlayerEvent};
use crate::world::{LevelDef, LevelError, LevelSet, World};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Player(PlayerEvent),
    LevelLoaded { index: usize, name: String },
    /// The exit of the final level was used.
    Completed,
}

pub struct Game {
    levels: LevelSet,
    world: World,
    player: PlayerBody,
    clock: Box<dyn Clock>,
    tick_count: u64,
    deaths: u32,
    completed: bool,
}

impl Game {
    /// Load the first level and spawn the body there.
    pub fn new(config: MovementConfig, levels: LevelSet, clock: Box<dyn Clock>) -> Self {
        let first = levels.current();
        let world = World::from_level(first);
        let player = PlayerBody::new(config, first.spawn);
        log::info!(
            "Starting at level {} of {}: '{}'",
            levels.current_index() + 1,
            levels.len(),
            first.name
        );
        Self {
            levels,
            world,
            player,
            clock,
            tick_count: 0,
            deaths: 0,
            completed: false,
        }
    }

    /// Run one fixed step and react to its outcome.
    pub fn tick(&mut self, input: &InputSnapshot) -> Vec<GameEvent> {
        if self.completed {
            return Vec::new();
        }

        let now = self.clock.now();
        let report = self.player.update(&mut self.world, input, now);
        self.tick_count += 1;

        // Every player event is reported before any level transition
        let mut events: Vec<GameEvent> =
            report.events.iter().copied().map(GameEvent::Player).collect();
        if report.contains(PlayerEvent::Died) {
            self.deaths += 1;
            self.restart_level();
            events.push(self.loaded_event());
        } else if report.contains(PlayerEvent::ReachedExit) {
            match self.next_level() {
                Ok(()) => events.push(self.loaded_event()),
                Err(e) => {
                    log::info!("All levels complete ({e})");
                    self.completed = true;
                    events.push(GameEvent::Completed);
                }
            }
        }
        events
    }

    /// Rebuild the current level and put the body back at its spawn.
    pub fn restart_level(&mut self) {
        let level = self.levels.current();
        log::info!("Restarting level '{}'", level.name);
        self.world = World::from_level(level);
        self.player.respawn(level.spawn);
    }

    /// Load the next level. Fails on the last one, leaving the session as is.
    pub fn next_level(&mut self) -> Result<(), LevelError> {
        let level = self.levels.advance()?;
        log::info!("Entering level '{}'", level.name);
        self.world = World::from_level(level);
        self.player.respawn(level.spawn);
        Ok(())
    }

    fn loaded_event(&self) -> GameEvent {
        GameEvent::LevelLoaded {
            index: self.levels.current_index(),
            name: self.levels.current().name.clone(),
        }
    }

    pub fn player(&self) -> &PlayerBody {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerBody {
        &mut self.player
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn level(&self) -> &LevelDef {
        self.levels.current()
    }

    pub fn level_index(&self) -> usize {
        self.levels.current_index()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}
