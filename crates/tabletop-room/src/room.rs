//! Room actor: one shared document plus the connections watching it.
//!
//! Two pieces of state, guarded two different ways:
//!
//! - The [`Document`] sits behind a mutex. Every update, merge-patch and
//!   `sync` snapshot holds it for the whole operation and releases it
//!   before anything is queued for delivery.
//! - The set of attached connections is owned by a single broadcast task.
//!   Nobody else touches it. Attach, detach and broadcast requests all
//!   travel through the same bounded event queue, so a connection is
//!   attached before any broadcast queued after its attach.
//!
//! Because the document lock is released before the broadcast is queued,
//! two concurrent senders can have their edits land in the document in one
//! order and reach the other viewers in the opposite order.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tabletop_document::Document;
use tabletop_protocol::{Codec, JsonCodec, Message, MessageKind, PlayerId, RoomId};
use tabletop_session::TeardownGate;
use tabletop_transport::ConnectionId;
use tokio::sync::{Mutex, mpsc};
use tokio::sync::mpsc::error::TrySendError;

use crate::{Broadcast, MutationMode, Outbound, RoomConfig, RoomError};

/// Requests handled by the room's broadcast task, in queue order.
enum RoomEvent {
    Attach(Subscriber),
    Detach(ConnectionId),
    Broadcast(Broadcast),
}

/// One attached connection, as the broadcast task sees it.
struct Subscriber {
    connection: ConnectionId,
    player: PlayerId,
    outbound: mpsc::Sender<Outbound>,
}

/// A connection's membership in a room.
///
/// Returned by [`Room::subscribe`] and handed back to
/// [`Room::unsubscribe`]. Holds the one-shot teardown gate so that however
/// many tasks try to unsubscribe, the room only processes it once.
#[derive(Debug)]
pub struct Subscription {
    room: RoomId,
    player: PlayerId,
    connection: ConnectionId,
    gate: TeardownGate,
}

impl Subscription {
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }
}

/// Handle to a running room. Cheap to clone.
#[derive(Clone)]
pub struct Room {
    inner: Arc<RoomInner>,
}

struct RoomInner {
    id: RoomId,
    config: RoomConfig,
    document: Mutex<Document>,
    events: mpsc::Sender<RoomEvent>,
    codec: JsonCodec,
}

impl Room {
    /// Creates an empty room and spawns its broadcast task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(id: RoomId, config: RoomConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.event_capacity);
        tokio::spawn(run_broadcast_loop(id.clone(), rx));
        tracing::info!(room_id = %id, "room created");

        Self {
            inner: Arc::new(RoomInner {
                id,
                config,
                document: Mutex::new(Document::new()),
                events: tx,
                codec: JsonCodec,
            }),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.inner.id
    }

    pub fn config(&self) -> &RoomConfig {
        &self.inner.config
    }

    /// A copy of the current document.
    pub async fn snapshot(&self) -> Document {
        self.inner.document.lock().await.clone()
    }

    // -- Player lifecycle --------------------------------------------------

    /// Marks `player` connected, creating it on first sight.
    pub async fn connect_player(&self, player: &PlayerId) {
        let mut doc = self.inner.document.lock().await;
        let record = doc.connect_player(player.as_str());
        tracing::info!(
            room_id = %self.inner.id,
            %player,
            seat = record.seat,
            "player connected"
        );
    }

    /// Marks `player` disconnected. The record stays.
    pub async fn disconnect_player(&self, player: &PlayerId) {
        let found = self
            .inner
            .document
            .lock()
            .await
            .disconnect_player(player.as_str());
        if found {
            tracing::info!(room_id = %self.inner.id, %player, "player disconnected");
        }
    }

    /// Joins a connection to the room.
    ///
    /// In order: marks the player connected, attaches a fresh outbound
    /// queue, queues a full `sync` to the player, and (if configured) tells
    /// everyone else the player is connected. The returned receiver is the
    /// connection's outbound queue.
    pub async fn subscribe(
        &self,
        player: PlayerId,
        connection: ConnectionId,
    ) -> Result<(Subscription, mpsc::Receiver<Outbound>), RoomError> {
        self.connect_player(&player).await;

        let (tx, rx) = mpsc::channel(self.inner.config.outbound_capacity);
        self.send_event(RoomEvent::Attach(Subscriber {
            connection,
            player: player.clone(),
            outbound: tx,
        }))
        .await?;

        self.sync(&player).await?;
        if self.inner.config.announce_presence {
            self.announce(&player, true).await?;
        }

        let subscription = Subscription {
            room: self.inner.id.clone(),
            player,
            connection,
            gate: TeardownGate::new(),
        };
        Ok((subscription, rx))
    }

    /// Removes a connection from the room. Only the first call for a given
    /// subscription does anything; it returns `true`, later calls `false`.
    ///
    /// Detaches the outbound queue, marks the player disconnected, and (if
    /// configured) tells everyone still attached.
    pub async fn unsubscribe(&self, subscription: &Subscription) -> bool {
        if !subscription.gate.try_close() {
            return false;
        }

        let player = &subscription.player;
        if let Err(e) = self
            .send_event(RoomEvent::Detach(subscription.connection))
            .await
        {
            tracing::debug!(room_id = %self.inner.id, %player, error = %e, "detach failed");
        }
        self.disconnect_player(player).await;
        if self.inner.config.announce_presence {
            if let Err(e) = self.announce(player, false).await {
                tracing::debug!(
                    room_id = %self.inner.id,
                    %player,
                    error = %e,
                    "disconnect announcement failed"
                );
            }
        }
        true
    }

    // -- Messages ----------------------------------------------------------

    /// Processes one inbound message from `sender`.
    ///
    /// `sync` is answered to the sender alone and goes no further. Every
    /// other message is applied (if it is an `update`) and then echoed as
    /// received to everyone but the sender, whether or not it applied.
    pub async fn handle_message(
        &self,
        sender: &PlayerId,
        mut msg: Message,
    ) -> Result<(), RoomError> {
        if msg.player_id.is_empty() {
            msg.player_id = sender.clone();
        }

        match msg.kind {
            MessageKind::Sync => return self.sync(sender).await,
            MessageKind::Update => self.apply(&msg).await,
            MessageKind::Other(ref kind) => {
                tracing::debug!(room_id = %self.inner.id, %sender, %kind, "relaying message");
            }
        }

        let content = self.inner.codec.encode(&msg)?;
        self.broadcast(Broadcast::all_except(sender.clone(), content))
            .await
    }

    /// Queues the full document for `player` only.
    pub async fn sync(&self, player: &PlayerId) -> Result<(), RoomError> {
        let snapshot = self.inner.document.lock().await.to_value();
        let content = self
            .inner
            .codec
            .encode(&Message::sync(player.clone(), snapshot))?;
        self.broadcast(Broadcast::only(player.clone(), content))
            .await
    }

    /// Queues a broadcast. Waits if the room's event queue is full.
    pub async fn broadcast(&self, broadcast: Broadcast) -> Result<(), RoomError> {
        self.send_event(RoomEvent::Broadcast(broadcast)).await
    }

    async fn apply(&self, msg: &Message) {
        let mut doc = self.inner.document.lock().await;
        match self.inner.config.mutation_mode {
            MutationMode::PathAddressed => {
                doc.apply(&msg.path, &msg.value);
            }
            MutationMode::MergePatch => {
                if let Err(error) = doc.merge_patch(&msg.value) {
                    tracing::warn!(room_id = %self.inner.id, %error, "merge-patch not applied");
                }
            }
        }
    }

    async fn announce(&self, player: &PlayerId, connected: bool) -> Result<(), RoomError> {
        let msg = Message::update(
            player.clone(),
            ["players", player.as_str(), "connected"],
            Value::Bool(connected),
        );
        let content = self.inner.codec.encode(&msg)?;
        let broadcast = if connected {
            Broadcast::all_except(player.clone(), content)
        } else {
            Broadcast::all(content)
        };
        self.broadcast(broadcast).await
    }

    async fn send_event(&self, event: RoomEvent) -> Result<(), RoomError> {
        self.inner
            .events
            .send(event)
            .await
            .map_err(|_| RoomError::Closed(self.inner.id.clone()))
    }
}

/// The room's single consumer. Owns the subscriber set and runs until every
/// [`Room`] handle is dropped.
async fn run_broadcast_loop(room_id: RoomId, mut events: mpsc::Receiver<RoomEvent>) {
    let mut subscribers: HashMap<ConnectionId, Subscriber> = HashMap::new();

    while let Some(event) = events.recv().await {
        match event {
            RoomEvent::Attach(subscriber) => {
                tracing::debug!(
                    %room_id,
                    connection = %subscriber.connection,
                    player = %subscriber.player,
                    "connection attached"
                );
                subscribers.insert(subscriber.connection, subscriber);
            }
            RoomEvent::Detach(connection) => {
                if subscribers.remove(&connection).is_some() {
                    tracing::debug!(%room_id, %connection, "connection detached");
                }
            }
            RoomEvent::Broadcast(broadcast) => deliver(&room_id, &subscribers, &broadcast),
        }
    }

    tracing::debug!(%room_id, "broadcast loop stopped");
}

/// Hands the frame to every matching connection without waiting.
fn deliver(
    room_id: &RoomId,
    subscribers: &HashMap<ConnectionId, Subscriber>,
    broadcast: &Broadcast,
) {
    for subscriber in subscribers.values() {
        if !broadcast.matches(&subscriber.player) {
            continue;
        }
        match subscriber.outbound.try_send(Arc::clone(&broadcast.content)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    %room_id,
                    connection = %subscriber.connection,
                    player = %subscriber.player,
                    "outbound queue full, dropping message"
                );
            }
            // The writer is gone; its detach is on the way.
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
