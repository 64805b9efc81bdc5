use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use arena_world::{ArenaConfig, ArenaError, Entity, EntityId, Obstacle, PlayerIdAllocator, World};

use crate::bot::step_bot;
use crate::bullet_sim::{step_bullets, try_fire};
use crate::player::step_player;
use crate::session::ClientSession;
use crate::stats::{RollingStats, StatsSnapshot};

/// Loop state machine: paused with no clients connected,
/// running as soon as the first client connects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Seed for the bot/bullet PRNG. Fixed rather than time-derived: a fast
/// non-cryptographic PRNG is all this needs, and a fixed seed keeps a given
/// world's bot paths reproducible across runs for debugging.
const SIM_RNG_SEED: u64 = 0xA5EA_5EED_0BAD_CAFE;

/// Owns the world, the client session table, and the player id allocator —
/// the only component with exclusive mutable access to simulation state
/// across a tick boundary.
pub struct Orchestrator {
    world: World,
    sessions: HashMap<EntityId, ClientSession>,
    player_ids: PlayerIdAllocator,
    rng: SmallRng,
    state: LoopState,
    last_tick_millis: Option<u64>,
    stats: RollingStats,
}

fn random_spawn_xz(world: &World, radius: f32, rng: &mut impl Rng) -> (f32, f32) {
    let half = world.config.respawn_half_extent();
    for _ in 0..16 {
        let x = rng.random_range(-half..=half);
        let z = rng.random_range(-half..=half);
        if !world.collides_at(x, z, radius) {
            return (x, z);
        }
    }
    (0.0, 0.0)
}

impl Orchestrator {
    /// Builds the world from `obstacles`, spawns `config.bots_count` bots at
    /// random unobstructed positions, and starts Idle. Fails if `World::new`
    /// rejects the obstacle list (the only fatal error world construction
    /// can raise).
    pub fn new(config: ArenaConfig, obstacles: Vec<Obstacle>) -> Result<Self, ArenaError> {
        let mut world = World::new(config, obstacles)?;
        let mut rng = SmallRng::seed_from_u64(SIM_RNG_SEED);

        for bot_id in 0..config.bots_count {
            let (x, z) = random_spawn_xz(&world, config.bot_radius, &mut rng);
            let y = world.feet_height_at(x, z);
            world.spawn_entity(Entity::new(bot_id, arena_math::Vector3::new(x, y, z), false, 100));
        }

        Ok(Self {
            world,
            sessions: HashMap::new(),
            player_ids: PlayerIdAllocator::new(ArenaConfig::PLAYER_ID_BASE),
            rng,
            state: LoopState::Idle,
            last_tick_millis: None,
            stats: RollingStats::new(0),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the owned world, for scenario setup (injecting a
    /// bullet or obstacle directly) that does not go through the wire
    /// protocol.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn sessions(&self) -> &HashMap<EntityId, ClientSession> {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut HashMap<EntityId, ClientSession> {
        &mut self.sessions
    }

    /// Splits the borrow so a caller can read the settled world while
    /// mutating a session's grace map in the same expression (the
    /// visibility broadcaster needs exactly this: `&World` plus
    /// `&mut ClientSession`).
    pub fn world_and_sessions_mut(&mut self) -> (&World, &mut HashMap<EntityId, ClientSession>) {
        (&self.world, &mut self.sessions)
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn connected_players(&self) -> u16 {
        self.sessions.len() as u16
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.current()
    }

    /// Registers a freshly connected client: allocates a never-reused player
    /// id, spawns its entity at a random unobstructed position, and — if this
    /// is the first connection — transitions Idle -> Running, resetting the
    /// tick clock so the first `step` doesn't see a huge `deltaTime`.
    pub fn connect_player(&mut self, now_millis: u64) -> EntityId {
        if self.sessions.is_empty() {
            self.state = LoopState::Running;
            self.last_tick_millis = Some(now_millis);
            self.stats = RollingStats::new(now_millis);
        }

        let id = self.player_ids.allocate();
        let (x, z) = random_spawn_xz(&self.world, self.world.config.player_radius, &mut self.rng);
        let y = self.world.feet_height_at(x, z);
        self.world.spawn_entity(Entity::new(id, arena_math::Vector3::new(x, y, z), true, 100));
        self.sessions.insert(id, ClientSession::new(id, self.world.config.view_distance));
        id
    }

    /// Tears down a client's session immediately: entity removed from the
    /// world (and its grid bin), grace map discarded. Transitions
    /// Running -> Idle on the last disconnect.
    pub fn disconnect_player(&mut self, id: EntityId) {
        self.world.remove_entity(id);
        self.sessions.remove(&id);
        if self.sessions.is_empty() {
            self.state = LoopState::Idle;
        }
    }

    /// Records a client's latest movement intent and orientation. Non-finite
    /// components (NaN/infinity) are treated as zero movement / the previous
    /// orientation rather than propagated into the world.
    pub fn handle_input(&mut self, id: EntityId, move_x: f32, move_z: f32, yaw: f32, pitch: f32) {
        let Some(session) = self.sessions.get_mut(&id) else { return };
        session.move_intent = if move_x.is_finite() && move_z.is_finite() { (move_x, move_z) } else { (0.0, 0.0) };
        if yaw.is_finite() {
            session.yaw = yaw;
        }
        if pitch.is_finite() {
            session.pitch = pitch;
        }
    }

    pub fn handle_shoot(&mut self, id: EntityId, shooting: bool) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.shooting = shooting;
        }
    }

    pub fn handle_toggle_mode(&mut self, id: EntityId, los_mode: bool) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.los_mode = los_mode;
        }
    }

    /// Runs one tick's simulation stages (a)-(e): bots,
    /// player intents (including fire-rate-gated shooting), then bullet
    /// CCD. A no-op (besides advancing the tick clock) while Idle. Returns
    /// the `deltaTime` used, so the caller can time the tick for stats.
    pub fn step(&mut self, now_millis: u64) -> f32 {
        if !self.is_running() {
            return 0.0;
        }

        let dt = match self.last_tick_millis {
            Some(prev) => (now_millis.saturating_sub(prev) as f32) / 1000.0,
            None => 0.0,
        };
        self.last_tick_millis = Some(now_millis);

        let config = self.world.config;
        self.world.hit_events.clear();

        for bot_id in 0..config.bots_count {
            step_bot(&mut self.world, &config, bot_id, dt, &mut self.rng);
        }

        for (&id, session) in self.sessions.iter_mut() {
            step_player(&mut self.world, &config, id, session.move_intent, session.yaw, session.pitch, dt);
            if session.shooting {
                try_fire(&mut self.world, &config, id, now_millis, &mut session.last_shot_millis);
            }
        }

        step_bullets(&mut self.world, &config, dt, now_millis, &mut self.rng);

        dt
    }

    /// Feeds this tick's wallclock timings into the rolling 1-second stats
    /// window. Measured by the caller (`arena-server`'s main
    /// loop), which also times the per-client visibility pass that lives in
    /// `arena-net`.
    pub fn record_stats(&mut self, now_millis: u64, tick_time_ms: f32, los_time_ms: f32) {
        self.stats.record_tick(now_millis, tick_time_ms, los_time_ms);
    }
}
