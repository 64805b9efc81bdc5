use rand::Rng;

use arena_math::Vector3;
use arena_world::{ArenaConfig, Bullet, EntityId, HitEvent, World};

/// Direction basis shared with the client: `(-sin(yaw)*cos(pitch), sin(pitch),
/// -cos(yaw)*cos(pitch))`.
pub fn direction_from_yaw_pitch(yaw: f32, pitch: f32) -> Vector3 {
    Vector3::new(-yaw.sin() * pitch.cos(), pitch.sin(), -yaw.cos() * pitch.cos())
}

/// Attempts to fire a bullet for `owner`, gated by `FIRE_RATE`. Returns
/// `false` without effect if the rate limit rejects the shot.
pub fn try_fire(world: &mut World, config: &ArenaConfig, owner: EntityId, now_millis: u64, last_shot_millis: &mut u64) -> bool {
    let min_interval_ms = (1000.0 / config.fire_rate) as u64;
    if now_millis.saturating_sub(*last_shot_millis) < min_interval_ms {
        return false;
    }
    let Some(entity) = world.entity(owner) else { return false };
    let direction = direction_from_yaw_pitch(entity.yaw, entity.pitch);
    let position = entity.position.add(Vector3::new(0.0, config.eye_height, 0.0)).add(direction.scale(1.5));
    let id = world.allocate_bullet_id();
    world.bullets.push(Bullet {
        id,
        owner_id: owner,
        position,
        direction,
        speed: config.bullet_speed,
        damage: config.bullet_damage,
        created_at_millis: now_millis,
    });
    *last_shot_millis = now_millis;
    true
}

fn lerp(a: Vector3, b: Vector3, t: f32) -> Vector3 {
    a.add(b.sub(a).scale(t))
}

/// Five-iteration binary search for the exact hit point along one sub-step
/// segment, starting at `t = 1` (the unrefined hit) and halving the step
/// toward the last-safe fraction each iteration.
fn refine_hit(segment_start: Vector3, segment_end: Vector3, mut is_hit: impl FnMut(Vector3) -> bool) -> Vector3 {
    let mut t: f32 = 1.0;
    let mut half: f32 = 0.5;
    for _ in 0..5 {
        let candidate = lerp(segment_start, segment_end, t);
        if is_hit(candidate) {
            t -= half;
        } else {
            t += half;
        }
        half *= 0.5;
    }
    lerp(segment_start, segment_end, t)
}

fn entity_hit_at(world: &World, owner: EntityId, point: Vector3, entity_radius: f32, bullet_radius: f32) -> Option<EntityId> {
    world.entities().find_map(|e| {
        if e.id == owner {
            return None;
        }
        let dx = e.position.x - point.x;
        let dz = e.position.z - point.z;
        let xz_dist = (dx * dx + dz * dz).sqrt();
        let in_radius = xz_dist < entity_radius + bullet_radius;
        let in_height = point.y >= e.position.y && point.y <= e.position.y + 4.0;
        (in_radius && in_height).then_some(e.id)
    })
}

fn obstacle_hit(world: &World, point: Vector3, bullet_radius: f32) -> bool {
    world.grid.nearby_obstacles(point.x, point.z).iter().any(|&idx| {
        let obstacle = &world.obstacles[idx];
        obstacle.kind.is_solid_for_movement() && obstacle.aabb().inflated_xz(bullet_radius).contains_xz(point.x, point.z)
    })
}

fn out_of_bounds_or_underground(world: &World, config: &ArenaConfig, point: Vector3) -> bool {
    let half = config.terrain_size / 2.0;
    if point.x.abs() >= half || point.z.abs() >= half {
        return true;
    }
    point.y < world.ground_height_at(point.x, point.z)
}

enum SubStepOutcome {
    None,
    Entity(EntityId, Vector3),
    Obstacle(Vector3),
    OutOfBounds,
}

/// Advances every in-flight bullet by `dt` via continuous-collision
/// sub-stepping, appending this tick's [`HitEvent`]s to `world.hit_events`
/// and removing expired or resolved bullets.
pub fn step_bullets(world: &mut World, config: &ArenaConfig, dt: f32, now_millis: u64, rng: &mut impl Rng) {
    let mut survivors = Vec::with_capacity(world.bullets.len());
    let bullets = std::mem::take(&mut world.bullets);

    for mut bullet in bullets {
        if bullet.is_expired(now_millis, config.bullet_lifetime_ms) {
            continue;
        }

        let total = bullet.speed * dt;
        let n = (total / 0.1).ceil().max(1.0) as u32;
        let step = total / n as f32;

        let mut removed = false;
        let mut last_safe = bullet.position;

        for i in 1..=n {
            let candidate = bullet.position.add(bullet.direction.scale(step * i as f32));

            let outcome = if let Some(hit_id) = entity_hit_at(world, bullet.owner_id, candidate, config.entity_radius, config.bullet_radius) {
                SubStepOutcome::Entity(hit_id, candidate)
            } else if obstacle_hit(world, candidate, config.bullet_radius) {
                SubStepOutcome::Obstacle(candidate)
            } else if out_of_bounds_or_underground(world, config, candidate) {
                SubStepOutcome::OutOfBounds
            } else {
                SubStepOutcome::None
            };

            match outcome {
                SubStepOutcome::None => {
                    last_safe = candidate;
                }
                SubStepOutcome::Entity(hit_id, candidate) => {
                    let refined = refine_hit(last_safe, candidate, |p| {
                        entity_hit_at(world, bullet.owner_id, p, config.entity_radius, config.bullet_radius).is_some()
                    });
                    world.hit_events.push(HitEvent { position: refined, hit_entity: true, entity_id: Some(hit_id) });
                    apply_bullet_damage(world, config, hit_id, rng);
                    removed = true;
                    break;
                }
                SubStepOutcome::Obstacle(candidate) => {
                    let refined = refine_hit(last_safe, candidate, |p| obstacle_hit(world, p, config.bullet_radius));
                    world.hit_events.push(HitEvent { position: refined, hit_entity: false, entity_id: None });
                    removed = true;
                    break;
                }
                SubStepOutcome::OutOfBounds => {
                    removed = true;
                    break;
                }
            }
        }

        if !removed {
            bullet.position = bullet.position.add(bullet.direction.scale(total));
            survivors.push(bullet);
        }
    }

    world.bullets = survivors;
}

fn apply_bullet_damage(world: &mut World, config: &ArenaConfig, target: EntityId, rng: &mut impl Rng) {
    let Some(entity) = world.entity_mut(target) else { return };
    entity.apply_damage(config.bullet_damage);
    if !entity.is_alive() {
        entity.hp = entity.max_hp;
        let half = config.respawn_half_extent();
        let x = rng.random_range(-half..=half);
        let z = rng.random_range(-half..=half);
        world.set_entity_xz(target, x, z);
    }
}
