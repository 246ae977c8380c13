//! Per-connection session plumbing for the tabletop sync server.
//!
//! A "session" here is one WebSocket connection's view of the world:
//!
//! 1. **Identity**: which room and which player the connection claims
//!    ([`ConnectParams`], parsed from the upgrade request's query string).
//! 2. **Admission control**: a token bucket per connection
//!    ([`RateLimiter`]). Exceeding it is fatal for the connection.
//! 3. **Teardown**: a one-shot [`TeardownGate`] so that the reader task,
//!    the writer task, and the rate limiter can all race to close the
//!    connection and exactly one of them runs the cleanup.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← attaches/detaches the session's outbound queue
//!     ↕
//! Session Layer (this crate)  ← who is this, may they send, close once
//!     ↕
//! Protocol Layer (below)  ← PlayerId, RoomId
//! ```

mod error;
mod gate;
mod params;
mod ratelimit;

pub use error::SessionError;
pub use gate::TeardownGate;
pub use params::ConnectParams;
pub use ratelimit::{Decision, RateLimitConfig, RateLimiter};
