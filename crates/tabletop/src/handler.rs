//! Per-connection handler: join, read loop, write loop, teardown.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!   1. Read `lobby` and `player` from the upgrade query string
//!   2. Subscribe to the room → initial `sync` is queued
//!   3. Spawn a writer task draining the connection's outbound queue
//!   4. Loop: rate-limit, decode, hand the message to the room
//!
//! The reader, the writer, and the rate limiter can each end the
//! connection. Whichever gets there first wins the subscription's teardown
//! gate, unsubscribes from the room, and closes the socket. The others do
//! nothing.

use std::sync::Arc;

use tabletop_protocol::{Codec, Message};
use tabletop_room::{Outbound, Room, Subscription};
use tabletop_session::{ConnectParams, RateLimiter, SessionError};
use tabletop_transport::{CloseReason, Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::TabletopError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), TabletopError> {
    let conn_id = conn.id();

    let params = match ConnectParams::from_query(conn.query().unwrap_or_default()) {
        Ok(params) => params,
        Err(e) => {
            tracing::info!(%conn_id, error = %e, "rejecting connection");
            let _ = conn.close(CloseReason::Error(e.to_string())).await;
            return Err(e.into());
        }
    };
    let ConnectParams { room: room_id, player } = params;

    let room = state.registry.lobby(&room_id).await;
    let (subscription, outbound) = room.subscribe(player.clone(), conn_id).await?;
    tracing::info!(%conn_id, %room_id, %player, "connection joined room");

    let conn = Arc::new(conn);
    let subscription = Arc::new(subscription);

    tokio::spawn(write_loop(
        Arc::clone(&conn),
        room.clone(),
        Arc::clone(&subscription),
        outbound,
    ));

    let mut limiter = RateLimiter::new(state.rate_limit);
    let reason = loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, %player, "connection closed by peer");
                break CloseReason::Normal;
            }
            Err(e) => {
                tracing::debug!(%conn_id, %player, error = %e, "recv error");
                break CloseReason::Error(e.to_string());
            }
        };

        if !limiter.try_acquire().is_allowed() {
            tracing::warn!(%conn_id, %room_id, %player, "rate limit exceeded, closing connection");
            teardown(
                &room,
                &subscription,
                &conn,
                CloseReason::PolicyViolation("rate limit exceeded".into()),
            )
            .await;
            return Err(SessionError::RateLimited(player).into());
        }

        let msg: Message = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(%conn_id, %player, error = %e, "failed to decode message");
                continue;
            }
        };

        if let Err(e) = room.handle_message(&player, msg).await {
            tracing::warn!(%conn_id, %room_id, %player, error = %e, "message not handled");
        }
    };

    teardown(&room, &subscription, &conn, reason).await;
    Ok(())
}

/// Drains the connection's outbound queue onto the socket.
///
/// Ends when the room detaches the queue or a send fails.
async fn write_loop(
    conn: Arc<WebSocketConnection>,
    room: Room,
    subscription: Arc<Subscription>,
    mut outbound: mpsc::Receiver<Outbound>,
) {
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(
                conn_id = %conn.id(),
                player = %subscription.player(),
                error = %e,
                "send failed"
            );
            teardown(&room, &subscription, &conn, CloseReason::Error(e.to_string())).await;
            return;
        }
    }
}

/// Unsubscribes and closes the socket, once per connection.
async fn teardown(
    room: &Room,
    subscription: &Subscription,
    conn: &WebSocketConnection,
    reason: CloseReason,
) {
    if !room.unsubscribe(subscription).await {
        return;
    }
    tracing::info!(
        room_id = %room.id(),
        player = %subscription.player(),
        code = reason.code(),
        %reason,
        "connection left room"
    );
    if let Err(e) = conn.close(reason).await {
        tracing::debug!(conn_id = %conn.id(), error = %e, "close failed");
    }
}
