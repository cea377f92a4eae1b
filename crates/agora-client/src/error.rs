//! Client error types.

use thiserror::Error;

/// Errors from client operations.
///
/// Most abnormal inputs (out-of-order signals, unknown peers, media
/// failures) are absorbed by the state machine per the boundary rules and
/// never surface here; these are the caller-visible misuses.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A local move was attempted with coordinates outside the world.
    ///
    /// The server would silently drop such a move; rejecting it here keeps
    /// the local snapshot from diverging from the authoritative one.
    #[error("position out of world bounds: ({x}, {y})")]
    PositionOutOfBounds {
        /// Offending x coordinate.
        x: f64,
        /// Offending y coordinate.
        y: f64,
    },
}
