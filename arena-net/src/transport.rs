//! Duplex binary message channel per connected client, upgraded from a plain
//! TCP accept via `tokio_tungstenite::accept_async`. Inbound frames are
//! decoded here (this crate already owns the wire codec) and forwarded to
//! the orchestrator's event queue; outbound frames are pushed through an
//! unbounded channel so a slow client never blocks the tick loop.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::codec::{decode_client_message, ClientMessage};

pub type ConnId = u64;

/// Connection lifecycle and decoded client messages, queued for the tick
/// orchestrator to drain at the start of each tick, before stage (a) —
/// preserving the invariant that session state is read from a quiescent
/// snapshot.
pub enum ConnectionEvent {
    Connected { conn: ConnId, outbound: mpsc::UnboundedSender<Vec<u8>> },
    Input { conn: ConnId, move_x: f32, move_z: f32, yaw: f32, pitch: f32 },
    Shoot { conn: ConnId, shooting: bool },
    ToggleMode { conn: ConnId, los_mode: bool },
    Disconnected { conn: ConnId },
}

/// Accepts connections on `addr` forever, spawning one task per connection.
/// Each accepted connection is assigned a monotonic [`ConnId`] and reported
/// to `events` as it upgrades, sends frames, and eventually disconnects.
pub async fn serve(addr: SocketAddr, events: mpsc::UnboundedSender<ConnectionEvent>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "accepting connections");
    let mut next_conn_id: ConnId = 0;

    loop {
        let (stream, peer) = listener.accept().await?;
        let conn = next_conn_id;
        next_conn_id += 1;
        let events = events.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, conn, peer, events.clone()).await {
                tracing::warn!(conn, %peer, %err, "connection ended with an error");
            }
            let _ = events.send(ConnectionEvent::Disconnected { conn });
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    conn: ConnId,
    peer: SocketAddr,
    events: mpsc::UnboundedSender<ConnectionEvent>,
) -> anyhow::Result<()> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut stream) = ws.split();
    tracing::info!(conn, %peer, "client connected");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    events.send(ConnectionEvent::Connected { conn, outbound: outbound_tx }).ok();

    let writer = tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if sink.send(Message::Binary(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = stream.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(err) => {
                tracing::debug!(conn, %err, "socket error; tearing down connection");
                break;
            }
        };
        match msg {
            Message::Binary(bytes) => match decode_client_message(&bytes) {
                Ok(ClientMessage::Input { move_x, move_z, yaw, pitch }) => {
                    events.send(ConnectionEvent::Input { conn, move_x, move_z, yaw, pitch }).ok();
                }
                Ok(ClientMessage::Shoot { shooting }) => {
                    events.send(ConnectionEvent::Shoot { conn, shooting }).ok();
                }
                Ok(ClientMessage::ToggleMode { los_mode }) => {
                    events.send(ConnectionEvent::ToggleMode { conn, los_mode }).ok();
                }
                Err(err) => {
                    // Malformed frame or unknown type code: drop it, keep the connection.
                    tracing::debug!(conn, %err, "dropping malformed frame");
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    writer.abort();
    Ok(())
}
