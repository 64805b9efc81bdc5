use arena_world::{ArenaConfig, EntityId, World};

/// Whether `(x, z)` is blocked for a player: outside the hard boundary, or
/// inside a solid-for-movement obstacle.
fn blocked(world: &World, config: &ArenaConfig, x: f32, z: f32) -> bool {
    let hard = config.hard_boundary();
    x.abs() >= hard || z.abs() >= hard || world.collides_at(x, z, config.player_radius)
}

/// Applies one tick of a player's last-received movement intent, with the
/// same wall-sliding shape as bots. Yaw/pitch are copied
/// unconditionally regardless of whether movement succeeds.
pub fn step_player(world: &mut World, config: &ArenaConfig, player: EntityId, move_intent: (f32, f32), yaw: f32, pitch: f32, dt: f32) {
    let Some(entity) = world.entity(player) else { return };
    let (x, z) = (entity.position.x, entity.position.z);
    let (mx, mz) = move_intent;
    let dx = mx * config.player_speed * dt;
    let dz = mz * config.player_speed * dt;

    if !blocked(world, config, x + dx, z + dz) {
        world.set_entity_xz(player, x + dx, z + dz);
    } else if !blocked(world, config, x + dx, z) {
        world.set_entity_xz(player, x + dx, z);
    } else if !blocked(world, config, x, z + dz) {
        world.set_entity_xz(player, x, z + dz);
    }

    if let Some(e) = world.entity_mut(player) {
        e.yaw = yaw;
        e.pitch = pitch;
    }
}
