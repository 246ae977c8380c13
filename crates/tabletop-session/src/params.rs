//! Connection identity from the upgrade request.

use tabletop_protocol::{PlayerId, RoomId};

use crate::SessionError;

/// Which room a connection joins, and as whom.
///
/// Clients connect to `ws://host/?lobby=<room>&player=<id>`. Both values are
/// percent-decoded and trusted as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub room: RoomId,
    pub player: PlayerId,
}

impl ConnectParams {
    /// Query-string key naming the room.
    pub const ROOM_KEY: &'static str = "lobby";
    /// Query-string key naming the player.
    pub const PLAYER_KEY: &'static str = "player";

    /// Parses a raw query string (without the leading `?`).
    ///
    /// Unknown keys are ignored. If a key repeats, the first occurrence
    /// wins.
    ///
    /// # Errors
    /// `SessionError::MissingParameter` if `lobby` or `player` is absent or
    /// empty.
    pub fn from_query(query: &str) -> Result<Self, SessionError> {
        let mut room = None;
        let mut player = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                Self::ROOM_KEY if room.is_none() => room = Some(value.into_owned()),
                Self::PLAYER_KEY if player.is_none() => player = Some(value.into_owned()),
                _ => {}
            }
        }

        let room = room
            .filter(|r| !r.is_empty())
            .ok_or(SessionError::MissingParameter(Self::ROOM_KEY))?;
        let player = player
            .filter(|p| !p.is_empty())
            .ok_or(SessionError::MissingParameter(Self::PLAYER_KEY))?;

        tracing::trace!(%room, %player, "parsed connection parameters");
        Ok(Self {
            room: RoomId(room),
            player: PlayerId(player),
        })
    }
}
