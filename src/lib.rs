//! Movement, collision and ability-energy core of a 2D platformer.
//!
//! Screen coordinates (+y down), one fixed 60Hz tick per [`game::Game::tick`].
//! All speeds and accelerations are per tick.

pub mod config;
pub mod energy;
pub mod game;
pub mod input;
pub mod player;
pub mod spatial;
pub mod world;

pub use config::{ConfigError, MovementConfig};
pub use energy::{Clock, EnergyResource, ManualClock, SystemClock};
pub use game::{Game, GameEvent};
pub use input::{Buttons, InputSampler, InputSnapshot, RawInput};
pub use player::{Ability, AbilitySet, AbilityState, PlayerBody, PlayerEvent, Pose};
pub use world::{LevelDef, LevelSet, World};
