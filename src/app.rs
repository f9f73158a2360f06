use std::time::Duration;

use glam::Vec2;
use instant::Instant;

use wallhop::config::MovementConfig;
use wallhop::energy::SystemClock;
use wallhop::game::{Game, GameEvent};
use wallhop::input::{InputSampler, RawInput};
use wallhop::player::{Ability, PlayerEvent};
use wallhop::world::{BlockKind, BounceDirection, Collider, InteractableKind, LevelDef, LevelSet, Rect};

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log loop statistics (seconds).
const STATS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Loop statistics
// ---------------------------------------------------------------------------

/// How well the fixed-step loop keeps up with wall time.
struct LoopStats {
    frame_count: u64,
    tick_count: u64,
    last_log_time: Instant,
    frames_since_log: u32,
    ticks_since_log: u32,
    /// Frames that ran more than one tick to catch up.
    catch_up_frames: u32,
    backlog_max: f64,
}

impl LoopStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            tick_count: 0,
            last_log_time: Instant::now(),
            frames_since_log: 0,
            ticks_since_log: 0,
            catch_up_frames: 0,
            backlog_max: 0.0,
        }
    }

    /// `backlog` is the accumulator left over after the frame's ticks.
    fn record_frame(&mut self, ticks: u32, backlog: f64) {
        self.frame_count += 1;
        self.tick_count += u64::from(ticks);
        self.frames_since_log += 1;
        self.ticks_since_log += ticks;
        if ticks > 1 {
            self.catch_up_frames += 1;
        }
        self.backlog_max = self.backlog_max.max(backlog);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= STATS_LOG_INTERVAL {
            log::info!(
                "Sim: {:.1} ticks/s | {:.2} ticks/frame | catch-up frames: {} | max backlog: {:.2}ms | total ticks: {}",
                self.ticks_since_log as f64 / elapsed,
                self.ticks_since_log as f64 / self.frames_since_log.max(1) as f64,
                self.catch_up_frames,
                self.backlog_max * 1000.0,
                self.tick_count,
            );
            self.last_log_time = Instant::now();
            self.frames_since_log = 0;
            self.ticks_since_log = 0;
            self.catch_up_frames = 0;
            self.backlog_max = 0.0;
        }
    }
}

// ---------------------------------------------------------------------------
// Scripted input
// ---------------------------------------------------------------------------

/// Held input for a run of consecutive ticks.
struct Segment {
    ticks: u32,
    input: RawInput,
}

impl Segment {
    fn new(ticks: u32, input: RawInput) -> Self {
        Self { ticks, input }
    }

    fn idle(ticks: u32) -> Self {
        Self::new(ticks, RawInput::default())
    }
}

/// Replays a fixed input timeline, one sample per tick.
struct Script {
    segments: Vec<Segment>,
    index: usize,
    elapsed: u32,
}

impl Script {
    fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            index: 0,
            elapsed: 0,
        }
    }

    fn next_sample(&mut self) -> Option<RawInput> {
        loop {
            let segment = self.segments.get(self.index)?;
            if self.elapsed < segment.ticks {
                self.elapsed += 1;
                return Some(segment.input);
            }
            self.index += 1;
            self.elapsed = 0;
        }
    }
}

fn right() -> RawInput {
    RawInput {
        horizontal: 1.0,
        ..Default::default()
    }
}

fn demo_script() -> Script {
    let interact = RawInput {
        interact: true,
        ..Default::default()
    };
    let sprint_right = RawInput {
        sprint_trigger: 1.0,
        ..right()
    };
    let jump_right = RawInput {
        jump: true,
        ..right()
    };
    let double_jump_right = RawInput {
        double_jump: true,
        ..right()
    };
    let dash_right = RawInput {
        teleport_right: true,
        ..Default::default()
    };
    let grab_right = RawInput {
        grab_trigger: 1.0,
        ..right()
    };

    Script::new(vec![
        // Meadow: walk over the pickup, hop the bounce pad, reach the exit
        Segment::idle(30),
        Segment::new(90, right()),
        Segment::new(14, jump_right),
        Segment::new(2, right()),
        Segment::new(6, double_jump_right),
        Segment::new(150, right()),
        Segment::new(2, interact),
        Segment::idle(20),
        // Spire: collect the sprint button, dash the pit, climb
        Segment::new(2, interact),
        Segment::new(60, sprint_right),
        Segment::new(2, dash_right),
        Segment::new(40, right()),
        Segment::new(10, jump_right),
        Segment::new(40, grab_right),
        Segment::new(120, right()),
        Segment::new(2, interact),
        Segment::idle(30),
    ])
}

// ---------------------------------------------------------------------------
// Demo levels
// ---------------------------------------------------------------------------

fn wall(x: f32, y: f32, w: f32, h: f32) -> Collider {
    Collider::new(BlockKind::Wall, Rect::new(x, y, w, h))
}

fn demo_levels() -> Vec<LevelDef> {
    let meadow = LevelDef::new("Meadow", Vec2::new(64.0, 416.0))
        .with_block(wall(-32.0, 0.0, 32.0, 480.0))
        .with_block(wall(0.0, 448.0, 320.0, 32.0))
        .with_block(Collider::new(BlockKind::Ice, Rect::new(320.0, 448.0, 256.0, 32.0)))
        .with_block(wall(576.0, 448.0, 704.0, 32.0))
        .with_block(Collider::new(BlockKind::Platform, Rect::new(640.0, 352.0, 128.0, 16.0)))
        .with_block(Collider::bounce(Rect::new(832.0, 432.0, 64.0, 16.0), BounceDirection::Up))
        .with_block(wall(1280.0, 0.0, 32.0, 480.0))
        .with_pickup(Rect::new(400.0, 420.0, 16.0, 16.0), Ability::DoubleJump)
        .with_interactable(Rect::new(1184.0, 384.0, 64.0, 64.0), InteractableKind::Exit);

    let spire = LevelDef::new("Spire", Vec2::new(64.0, 416.0))
        .with_block(wall(-32.0, 0.0, 32.0, 480.0))
        .with_block(wall(0.0, 448.0, 512.0, 32.0))
        .with_block(Collider::new(BlockKind::Death, Rect::new(512.0, 464.0, 96.0, 16.0)))
        .with_block(wall(608.0, 448.0, 672.0, 32.0))
        .with_block(wall(960.0, 192.0, 32.0, 256.0))
        .with_block(wall(1280.0, 0.0, 32.0, 480.0))
        .with_pickup(Rect::new(320.0, 420.0, 16.0, 16.0), Ability::Teleport)
        .with_interactable(
            Rect::new(48.0, 416.0, 64.0, 32.0),
            InteractableKind::Button {
                grants: Some(Ability::Sprint),
            },
        )
        .with_interactable(Rect::new(1184.0, 384.0, 64.0, 64.0), InteractableKind::Exit);

    vec![meadow, spire]
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

struct App {
    game: Game,
    sampler: InputSampler,
    script: Script,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    accumulator: f64,
    script_done: bool,

    stats: LoopStats,
}

impl App {
    fn new(game: Game, script: Script) -> Self {
        Self {
            game,
            sampler: InputSampler::new(),
            script,
            last_frame_time: None,
            accumulator: 0.0,
            script_done: false,
            stats: LoopStats::new(),
        }
    }

    fn finished(&self) -> bool {
        self.script_done || self.game.is_completed()
    }

    /// Run fixed-timestep simulation ticks. Returns how many ran.
    fn run_fixed_update(&mut self, dt: f64) -> u32 {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        let mut ticks = 0;
        while self.accumulator >= TICK_RATE && !self.finished() {
            let Some(raw) = self.script.next_sample() else {
                self.script_done = true;
                break;
            };
            let input = self.sampler.sample(raw);
            for event in self.game.tick(&input) {
                log_event(&event);
            }
            self.accumulator -= TICK_RATE;
            ticks += 1;
        }
        ticks
    }

    fn frame(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            let dt = now.duration_since(last).as_secs_f64();
            let ticks = self.run_fixed_update(dt);
            self.stats.record_frame(ticks, self.accumulator);
        }
        self.last_frame_time = Some(now);
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::Player(PlayerEvent::Landed) => log::trace!("Landed"),
        GameEvent::Player(PlayerEvent::Attack { facing }) => log::debug!("Attack {facing:?}"),
        GameEvent::Player(event) => log::debug!("{event:?}"),
        GameEvent::LevelLoaded { index, name } => {
            log::info!("Level {} loaded: '{}'", index + 1, name)
        }
        GameEvent::Completed => log::info!("Game completed"),
    }
}

/// Entry point: play the demo script headless until it runs out.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = MovementConfig::load_or_default();
    let levels = LevelSet::new(demo_levels())?;
    let game = Game::new(config, levels, Box::new(SystemClock::new()));
    let mut app = App::new(game, demo_script());

    let frame_budget = Duration::from_secs_f64(TICK_RATE);
    while !app.finished() {
        app.frame();
        std::thread::sleep(frame_budget);
    }

    let pose = app.game.player().pose();
    log::info!(
        "Stopped after {} ticks on level {} ('{}'): {} deaths, energy {:.0}%, at {:?}{}",
        app.game.tick_count(),
        app.game.level_index() + 1,
        app.game.level().name,
        app.game.deaths(),
        pose.energy_fraction * 100.0,
        pose.position,
        if app.game.is_completed() { ", completed" } else { "" },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_replays_segments_in_order() {
        let mut script = Script::new(vec![Segment::new(2, right()), Segment::idle(1)]);
        assert_eq!(script.next_sample(), Some(right()));
        assert_eq!(script.next_sample(), Some(right()));
        assert_eq!(script.next_sample(), Some(RawInput::default()));
        assert_eq!(script.next_sample(), None);
    }

    #[test]
    fn demo_levels_build() {
        let levels = LevelSet::new(demo_levels()).unwrap();
        assert_eq!(levels.len(), 2);
        for index in 0..levels.len() {
            let level = levels.get(index).unwrap();
            let world = wallhop::world::World::from_level(level);
            let spawn = Rect::from_min_size(level.spawn, Vec2::new(32.0, 32.0));
            assert!(world.colliders_overlapping(&spawn).is_empty());
        }
    }

    #[test]
    fn accumulator_is_clamped() {
        let levels = LevelSet::new(demo_levels()).unwrap();
        let game = Game::new(
            MovementConfig::default(),
            levels,
            Box::new(SystemClock::new()),
        );
        let mut app = App::new(game, demo_script());
        let ticks = app.run_fixed_update(10.0);
        // 0.25s of 60Hz ticks, give or take float rounding
        assert!((14..=15).contains(&ticks));
        assert_eq!(u64::from(ticks), app.game.tick_count());
        assert!(app.accumulator < TICK_RATE);
    }

    #[test]
    fn loop_stats_count_catch_up_frames() {
        let mut stats = LoopStats::new();
        stats.record_frame(1, 0.004);
        stats.record_frame(3, 0.010);
        stats.record_frame(0, 0.012);
        assert_eq!(stats.frame_count, 3);
        assert_eq!(stats.tick_count, 4);
        assert_eq!(stats.catch_up_frames, 1);
        assert_eq!(stats.backlog_max, 0.012);
    }
}
