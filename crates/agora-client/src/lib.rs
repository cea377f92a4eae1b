//! Client-side presence core for shared virtual spaces.
//!
//! Pure state machines, no I/O: the embedding application owns the server
//! connection and the platform media stack, feeds events into [`Client`],
//! and executes the returned actions. Structure:
//!
//! ```text
//! agora-client
//!   ├─ Client            (top-level event dispatcher)
//!   ├─ PositionTracker   (where is everyone, right now)
//!   ├─ ProximityManager  (which voice links should exist)
//!   └─ PeerLink          (one connection's negotiation lifecycle)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod event;
mod peer;
mod proximity;
mod tracker;

pub use client::Client;
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent, PeerTransportState};
pub use peer::{PeerLink, PeerLinkState};
pub use proximity::{ProximityConfig, ProximityManager};
pub use tracker::{PositionTracker, Snapshot};
