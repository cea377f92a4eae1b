//! Shared foundations for the agora presence core.
//!
//! This crate holds the pieces both the server and the client build on:
//!
//! - [`env::Environment`]: time and randomness abstraction, so protocol logic
//!   stays deterministic under test.
//! - [`spatial`]: the pure distance/bearing → (gain, pan) mapping.
//! - [`media::MediaEngine`]: the seam to the platform audio/peer-connection
//!   backend. Protocol logic drives it; production wiring lives elsewhere.

pub mod env;
pub mod media;
pub mod spatial;

pub use env::Environment;
pub use media::{MediaEngine, MediaError};
pub use spatial::{AudioParams, SpatialConfig};
