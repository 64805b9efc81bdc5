//! Binary wire codec for UPDATE/INPUT/SHOOT/TOGGLE_MODE, plus the one-shot
//! JSON CONFIG envelope. All multi-byte integers and floats are
//! little-endian; entity ids are 32-bit unsigned; coordinates are 32-bit
//! floats, matching the client byte-for-byte.

use arena_math::Vector3;
use arena_world::{ArenaConfig, Obstacle, ObstacleKind};
use serde::{Deserialize, Serialize};

pub const MSG_CONFIG: u8 = 0x01;
pub const MSG_UPDATE: u8 = 0x02;
pub const MSG_INPUT: u8 = 0x03;
pub const MSG_SHOOT: u8 = 0x04;
pub const MSG_TOGGLE_MODE: u8 = 0x05;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CodecError {
    #[error("frame is empty")]
    Empty,
    #[error("unknown wire type code: {0:#04x}")]
    UnknownType(u8),
    #[error("truncated frame: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },
}

/// Parsed client -> server message.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClientMessage {
    Input { move_x: f32, move_z: f32, yaw: f32, pitch: f32 },
    Shoot { shooting: bool },
    ToggleMode { los_mode: bool },
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn need(&self, n: usize) -> Result<(), CodecError> {
        if self.buf.len() - self.pos < n {
            Err(CodecError::Truncated { need: self.pos + n, have: self.buf.len() })
        } else {
            Ok(())
        }
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        self.need(1)?;
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    fn u16(&mut self) -> Result<u16, CodecError> {
        self.need(2)?;
        let v = u16::from_le_bytes(self.buf[self.pos..self.pos + 2].try_into().unwrap());
        self.pos += 2;
        Ok(v)
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        self.need(4)?;
        let v = u32::from_le_bytes(self.buf[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }

    fn f32(&mut self) -> Result<f32, CodecError> {
        self.need(4)?;
        let v = f32::from_le_bytes(self.buf[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }

    fn vector3(&mut self) -> Result<Vector3, CodecError> {
        Ok(Vector3::new(self.f32()?, self.f32()?, self.f32()?))
    }
}

fn push_vector3(out: &mut Vec<u8>, v: Vector3) {
    out.extend_from_slice(&v.x.to_le_bytes());
    out.extend_from_slice(&v.y.to_le_bytes());
    out.extend_from_slice(&v.z.to_le_bytes());
}

/// Decodes a client -> server frame. Unknown type codes and truncated
/// payloads are reported as errors so the caller can drop the frame and keep
/// the connection alive.
pub fn decode_client_message(bytes: &[u8]) -> Result<ClientMessage, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::Empty);
    }
    let mut r = Reader::new(bytes);
    let ty = r.u8()?;
    match ty {
        MSG_INPUT => Ok(ClientMessage::Input { move_x: r.f32()?, move_z: r.f32()?, yaw: r.f32()?, pitch: r.f32()? }),
        MSG_SHOOT => Ok(ClientMessage::Shoot { shooting: r.u8()? != 0 }),
        MSG_TOGGLE_MODE => Ok(ClientMessage::ToggleMode { los_mode: r.u8()? != 0 }),
        other => Err(CodecError::UnknownType(other)),
    }
}

pub fn encode_input(move_x: f32, move_z: f32, yaw: f32, pitch: f32) -> Vec<u8> {
    let mut out = Vec::with_capacity(17);
    out.push(MSG_INPUT);
    out.extend_from_slice(&move_x.to_le_bytes());
    out.extend_from_slice(&move_z.to_le_bytes());
    out.extend_from_slice(&yaw.to_le_bytes());
    out.extend_from_slice(&pitch.to_le_bytes());
    out
}

pub fn encode_shoot(shooting: bool) -> Vec<u8> {
    vec![MSG_SHOOT, shooting as u8]
}

pub fn encode_toggle_mode(los_mode: bool) -> Vec<u8> {
    vec![MSG_TOGGLE_MODE, los_mode as u8]
}

/// One entity as it appears in an UPDATE frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateEntity {
    pub id: u32,
    pub position: Vector3,
    pub yaw: f32,
    pub pitch: f32,
    pub hp: u16,
    pub max_hp: u16,
    pub is_player: bool,
}

/// One hit marker as it appears in an UPDATE frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateHit {
    pub position: Vector3,
    pub hit_entity: bool,
}

/// The 28-byte operator-facing stats tail of an UPDATE frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UpdateStats {
    pub total_entities: u32,
    pub total_obstacles: u32,
    pub connected_players: u16,
    pub tick_time_ms_per_sec: f32,
    pub los_time_ms_per_sec: f32,
    pub tick_time_ms_avg: f32,
    pub visible_entities: u16,
    pub server_mode: u8,
    pub tick_rate: u8,
}

/// A fully-assembled, per-client UPDATE frame.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateFrame {
    pub my_position: Vector3,
    pub entities: Vec<UpdateEntity>,
    pub bullets: Vec<Vector3>,
    pub hits: Vec<UpdateHit>,
    pub stats: UpdateStats,
}

/// Bit 0 = isPlayer; the flag byte packs future booleans.
const FLAG_IS_PLAYER: u8 = 1 << 0;

pub fn encode_update(frame: &UpdateFrame) -> Vec<u8> {
    let mut out = Vec::with_capacity(64 + frame.entities.len() * 29 + frame.bullets.len() * 12 + frame.hits.len() * 13);
    out.push(MSG_UPDATE);
    push_vector3(&mut out, frame.my_position);

    out.extend_from_slice(&(frame.entities.len() as u16).to_le_bytes());
    for e in &frame.entities {
        out.extend_from_slice(&e.id.to_le_bytes());
        push_vector3(&mut out, e.position);
        out.extend_from_slice(&e.yaw.to_le_bytes());
        out.extend_from_slice(&e.pitch.to_le_bytes());
        out.extend_from_slice(&e.hp.to_le_bytes());
        out.extend_from_slice(&e.max_hp.to_le_bytes());
        let flags = if e.is_player { FLAG_IS_PLAYER } else { 0 };
        out.push(flags);
    }

    out.extend_from_slice(&(frame.bullets.len() as u16).to_le_bytes());
    for b in &frame.bullets {
        push_vector3(&mut out, *b);
    }

    out.extend_from_slice(&(frame.hits.len() as u16).to_le_bytes());
    for h in &frame.hits {
        push_vector3(&mut out, h.position);
        out.push(h.hit_entity as u8);
    }

    let s = &frame.stats;
    out.extend_from_slice(&s.total_entities.to_le_bytes());
    out.extend_from_slice(&s.total_obstacles.to_le_bytes());
    out.extend_from_slice(&s.connected_players.to_le_bytes());
    out.extend_from_slice(&s.tick_time_ms_per_sec.to_le_bytes());
    out.extend_from_slice(&s.los_time_ms_per_sec.to_le_bytes());
    out.extend_from_slice(&s.tick_time_ms_avg.to_le_bytes());
    out.extend_from_slice(&s.visible_entities.to_le_bytes());
    out.push(s.server_mode);
    out.push(s.tick_rate);
    out.extend_from_slice(&[0u8, 0u8]);

    out
}

pub fn decode_update(bytes: &[u8]) -> Result<UpdateFrame, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::Empty);
    }
    let mut r = Reader::new(bytes);
    let ty = r.u8()?;
    if ty != MSG_UPDATE {
        return Err(CodecError::UnknownType(ty));
    }
    let my_position = r.vector3()?;

    let entity_count = r.u16()?;
    let mut entities = Vec::with_capacity(entity_count as usize);
    for _ in 0..entity_count {
        let id = r.u32()?;
        let position = r.vector3()?;
        let yaw = r.f32()?;
        let pitch = r.f32()?;
        let hp = r.u16()?;
        let max_hp = r.u16()?;
        let flags = r.u8()?;
        entities.push(UpdateEntity { id, position, yaw, pitch, hp, max_hp, is_player: flags & FLAG_IS_PLAYER != 0 });
    }

    let bullet_count = r.u16()?;
    let mut bullets = Vec::with_capacity(bullet_count as usize);
    for _ in 0..bullet_count {
        bullets.push(r.vector3()?);
    }

    let hit_count = r.u16()?;
    let mut hits = Vec::with_capacity(hit_count as usize);
    for _ in 0..hit_count {
        let position = r.vector3()?;
        let hit_entity = r.u8()? != 0;
        hits.push(UpdateHit { position, hit_entity });
    }

    let stats = UpdateStats {
        total_entities: r.u32()?,
        total_obstacles: r.u32()?,
        connected_players: r.u16()?,
        tick_time_ms_per_sec: r.f32()?,
        los_time_ms_per_sec: r.f32()?,
        tick_time_ms_avg: r.f32()?,
        visible_entities: r.u16()?,
        server_mode: r.u8()?,
        tick_rate: r.u8()?,
    };
    r.u8().ok();
    r.u8().ok();

    Ok(UpdateFrame { my_position, entities, bullets, hits, stats })
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ConfigObstacleJson {
    position: Vector3Json,
    size: Vector3Json,
    #[serde(rename = "type")]
    kind: ObstacleKind,
    #[serde(rename = "trunkRadius", skip_serializing_if = "Option::is_none")]
    trunk_radius: Option<f32>,
    #[serde(rename = "foliageRadius", skip_serializing_if = "Option::is_none")]
    foliage_radius: Option<f32>,
    #[serde(rename = "foliageColor", skip_serializing_if = "Option::is_none")]
    foliage_color: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Vector3Json {
    x: f32,
    y: f32,
    z: f32,
}

impl From<Vector3> for Vector3Json {
    fn from(v: Vector3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<&Obstacle> for ConfigObstacleJson {
    fn from(o: &Obstacle) -> Self {
        Self {
            position: o.center.into(),
            size: o.size.into(),
            kind: o.kind,
            trunk_radius: o.decoration.trunk_radius,
            foliage_radius: o.decoration.foliage_radius,
            foliage_color: o.decoration.foliage_color,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct TerrainJson {
    size: f32,
    obstacles: Vec<ConfigObstacleJson>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ConfigJson {
    #[serde(rename = "type")]
    kind: String,
    terrain: TerrainJson,
    #[serde(rename = "viewDistance")]
    view_distance: f32,
}

/// Encodes the one-shot JSON CONFIG envelope sent at session open. The rest
/// of the traffic is binary; this is the one place JSON is tolerable because
/// obstacles are numerous but static.
pub fn encode_config_json(obstacles: &[Obstacle], config: &ArenaConfig) -> Result<String, serde_json::Error> {
    let envelope = ConfigJson {
        kind: "config".to_string(),
        terrain: TerrainJson { size: config.terrain_size, obstacles: obstacles.iter().map(ConfigObstacleJson::from).collect() },
        view_distance: config.view_distance,
    };
    serde_json::to_string(&envelope)
}

/// The full CONFIG frame as sent on the wire: the `MSG_CONFIG` type byte
/// followed by the JSON envelope's UTF-8 bytes. Every frame type carries
/// this leading type byte, CONFIG included.
pub fn encode_config_frame(obstacles: &[Obstacle], config: &ArenaConfig) -> Result<Vec<u8>, serde_json::Error> {
    let json = encode_config_json(obstacles, config)?;
    let mut out = Vec::with_capacity(1 + json.len());
    out.push(MSG_CONFIG);
    out.extend_from_slice(json.as_bytes());
    Ok(out)
}
