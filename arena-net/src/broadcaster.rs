//! Per-client visibility filtering and UPDATE-frame assembly: radial
//! candidate selection, optional LOS filtering, and the grace window that
//! smooths single-tick occlusion flicker.

use arena_los::can_see;
use arena_sim::{ClientSession, StatsSnapshot};
use arena_world::{ArenaError, EntityId, World};

use crate::codec::{UpdateEntity, UpdateFrame, UpdateHit, UpdateStats};

/// `classical mode` (0) vs `LOS mode` (1), broadcast in the stats tail's
/// `serverMode` byte so clients can display which filtering policy is active
/// for this connection.
const SERVER_MODE_CLASSICAL: u8 = 0;
const SERVER_MODE_LOS: u8 = 1;

/// Builds one client's UPDATE frame for this tick: radial candidate set,
/// optional LOS filter, grace-window reconciliation, then the entity/bullet/
/// hit/stats payload.
///
/// `los_time_ms` accumulates the wallclock cost of the LOS filtering itself
/// (not radial selection or encoding) so the caller can fold it into the
/// rolling stats window.
pub fn build_frame(
    world: &World,
    session: &mut ClientSession,
    connected_players: u16,
    rolling_stats: StatsSnapshot,
    los_time_ms: &mut f32,
) -> Option<UpdateFrame> {
    let viewer = match world.entity(session.entity) {
        Some(e) => e,
        None => {
            // A session always has a backing entity between connect and disconnect.
            let err = ArenaError::UnknownEntity(session.entity);
            tracing::error!(%err, "dropping this tick's frame");
            return None;
        }
    };
    let viewer_pos = viewer.position;
    let view_distance_sq = session.view_distance * session.view_distance;
    let config = world.config;

    let candidates: Vec<EntityId> = world
        .entities()
        .filter(|e| e.id != session.entity && e.position.distance_sq(viewer_pos) <= view_distance_sq)
        .map(|e| e.id)
        .collect();

    let visible_now: Vec<EntityId> = if session.los_mode {
        let started = std::time::Instant::now();
        let filtered: Vec<EntityId> = candidates
            .into_iter()
            .filter(|&id| {
                let Some(target) = world.entity(id) else { return false };
                can_see(world, viewer_pos, target.position, &config)
            })
            .collect();
        *los_time_ms += started.elapsed().as_secs_f32() * 1000.0;
        filtered
    } else {
        candidates
    };

    // The grace window only smooths LOS flicker; in classical mode the
    // broadcast set must be exactly the radial candidates, so no entity is
    // held onto after it leaves view_distance.
    let final_ids = if session.los_mode {
        session.apply_grace(&visible_now, config.los_grace_ticks, |id| world.entity(id).is_some_and(|e| e.is_alive()))
    } else {
        session.grace_map.clear();
        visible_now
    };

    let entities = final_ids
        .into_iter()
        .filter_map(|id| {
            let e = world.entity(id)?;
            Some(UpdateEntity {
                id,
                position: e.position,
                yaw: e.yaw,
                pitch: e.pitch,
                hp: e.hp.max(0) as u16,
                max_hp: e.max_hp.max(0) as u16,
                is_player: e.is_player,
            })
        })
        .collect::<Vec<_>>();

    let bullets = world.bullets.iter().map(|b| b.position).collect::<Vec<_>>();
    let hits = world.hit_events.iter().map(|h| UpdateHit { position: h.position, hit_entity: h.hit_entity }).collect::<Vec<_>>();

    let visible_entities = entities.len() as u16;
    let stats = UpdateStats {
        total_entities: world.entity_count() as u32,
        total_obstacles: world.obstacles.len() as u32,
        connected_players,
        tick_time_ms_per_sec: rolling_stats.tick_time_ms_per_sec,
        los_time_ms_per_sec: rolling_stats.los_time_ms_per_sec,
        tick_time_ms_avg: rolling_stats.tick_time_ms_avg,
        visible_entities,
        server_mode: if session.los_mode { SERVER_MODE_LOS } else { SERVER_MODE_CLASSICAL },
        tick_rate: config.tick_rate as u8,
    };

    Some(UpdateFrame { my_position: viewer_pos, entities, bullets, hits, stats })
}
