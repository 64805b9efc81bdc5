//! Composition root: CLI/config parsing, tracing setup, world generation, and
//! the fixed-tick game loop that drains the transport's connection events,
//! steps the simulation, and broadcasts per-client UPDATE frames.

mod cli;
mod worldgen;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use arena_net::{build_frame, encode_config_frame, encode_update, ConnId, ConnectionEvent};
use arena_sim::Orchestrator;
use arena_world::EntityId;

use crate::cli::Cli;

fn init_tracing() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))).init();
}

fn now_millis(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.to_config();
    let addr: SocketAddr = cli.bind_addr().parse().context("invalid bind address")?;

    let obstacles = worldgen::generate_obstacles(&config, cli.world_seed).context("failed to generate world obstacles")?;
    tracing::info!(obstacle_count = obstacles.len(), bots = config.bots_count, tick_rate = config.tick_rate, "world generated");
    let config_frame = encode_config_frame(&obstacles, &config).context("failed to encode CONFIG envelope")?;

    let mut orchestrator = Orchestrator::new(config, obstacles).context("failed to construct world from generated obstacles")?;

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ConnectionEvent>();
    tokio::spawn(async move {
        if let Err(err) = arena_net::serve(addr, events_tx).await {
            tracing::error!(%err, "transport accept loop terminated");
        }
    });

    let start = Instant::now();
    let mut conn_to_entity: HashMap<ConnId, EntityId> = HashMap::new();
    let mut outbound: HashMap<EntityId, mpsc::UnboundedSender<Vec<u8>>> = HashMap::new();

    let mut interval = tokio::time::interval(std::time::Duration::from_millis(config.tick_interval_ms()));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let now = now_millis(start);

        while let Ok(event) = events_rx.try_recv() {
            match event {
                ConnectionEvent::Connected { conn, outbound: sender } => {
                    let id = orchestrator.connect_player(now);
                    tracing::info!(conn, entity = id, "player connected");
                    if sender.send(config_frame.clone()).is_err() {
                        continue;
                    }
                    conn_to_entity.insert(conn, id);
                    outbound.insert(id, sender);
                }
                ConnectionEvent::Input { conn, move_x, move_z, yaw, pitch } => {
                    if let Some(&id) = conn_to_entity.get(&conn) {
                        orchestrator.handle_input(id, move_x, move_z, yaw, pitch);
                    }
                }
                ConnectionEvent::Shoot { conn, shooting } => {
                    if let Some(&id) = conn_to_entity.get(&conn) {
                        orchestrator.handle_shoot(id, shooting);
                    }
                }
                ConnectionEvent::ToggleMode { conn, los_mode } => {
                    if let Some(&id) = conn_to_entity.get(&conn) {
                        orchestrator.handle_toggle_mode(id, los_mode);
                    }
                }
                ConnectionEvent::Disconnected { conn } => {
                    if let Some(id) = conn_to_entity.remove(&conn) {
                        tracing::info!(conn, entity = id, "player disconnected");
                        orchestrator.disconnect_player(id);
                        outbound.remove(&id);
                    }
                }
            }
        }

        if !orchestrator.is_running() {
            continue;
        }

        let tick_started = Instant::now();
        {
            arena_profiling::span!("tick");
            orchestrator.step(now);
        }

        let mut los_time_ms = 0.0f32;
        let connected_players = orchestrator.connected_players();
        let rolling_stats = orchestrator.stats();
        let mut dead_connections = Vec::new();

        let (world, sessions) = orchestrator.world_and_sessions_mut();
        for (&id, sender) in outbound.iter() {
            let Some(session) = sessions.get_mut(&id) else { continue };
            let Some(frame) = build_frame(world, session, connected_players, rolling_stats, &mut los_time_ms) else { continue };
            let payload = encode_update(&frame);
            if sender.send(payload).is_err() {
                dead_connections.push(id);
            }
        }

        for id in dead_connections {
            tracing::warn!(entity = id, "dropping client after failed send");
            orchestrator.disconnect_player(id);
            outbound.remove(&id);
            conn_to_entity.retain(|_, entity| *entity != id);
        }

        let tick_time_ms = tick_started.elapsed().as_secs_f32() * 1000.0;
        orchestrator.record_stats(now, tick_time_ms, los_time_ms);
    }
}
