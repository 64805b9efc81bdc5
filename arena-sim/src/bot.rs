use rand::Rng;

use arena_world::{ArenaConfig, EntityId, World};

/// Forward direction for yaw `y` (pitch 0), matching the bullet direction
/// basis used by the client: `(-sin(yaw), -cos(yaw))` on the X/Z plane.
fn forward_xz(yaw: f32) -> (f32, f32) {
    (-yaw.sin(), -yaw.cos())
}

/// Advances one bot by `dt` seconds of random-walk AI.
///
/// With low probability, perturbs yaw; otherwise advances along the current
/// heading and wall-slides around obstacles, reversing course entirely if
/// the soft world boundary would be crossed.
pub fn step_bot(world: &mut World, config: &ArenaConfig, bot: EntityId, dt: f32, rng: &mut impl Rng) {
    let Some(entity) = world.entity(bot) else { return };
    let mut yaw = entity.yaw;
    let (x, _, z) = (entity.position.x, entity.position.y, entity.position.z);

    if rng.random_bool(0.02) {
        yaw += rng.random_range(-0.5..0.5) * config.bot_turn_speed * dt * 10.0;
    }

    let (fx, fz) = forward_xz(yaw);
    let dx = fx * config.bot_speed * dt;
    let dz = fz * config.bot_speed * dt;
    let soft = config.bot_soft_boundary();

    if (x + dx).abs() > soft || (z + dz).abs() > soft {
        yaw += std::f32::consts::PI;
        if let Some(e) = world.entity_mut(bot) {
            e.yaw = yaw;
        }
        return;
    }

    let radius = config.bot_radius;
    let moved = if !world.collides_at(x + dx, z + dz, radius) {
        world.set_entity_xz(bot, x + dx, z + dz);
        true
    } else if !world.collides_at(x + dx, z, radius) {
        world.set_entity_xz(bot, x + dx, z);
        true
    } else if !world.collides_at(x, z + dz, radius) {
        world.set_entity_xz(bot, x, z + dz);
        true
    } else {
        false
    };

    if !moved {
        yaw += std::f32::consts::FRAC_PI_2 + rng.random_range(-std::f32::consts::FRAC_PI_8..std::f32::consts::FRAC_PI_8);
    }

    if let Some(e) = world.entity_mut(bot) {
        e.yaw = yaw;
    }
}
