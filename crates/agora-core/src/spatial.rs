//! Distance and bearing → audio parameter mapping.
//!
//! Pure functions, no state: safe to call every evaluation tick for every
//! connected peer.

/// Volume and stereo balance for one peer's audio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioParams {
    /// Volume scalar in `[0, volume_ceiling]`. Zero means inaudible.
    pub gain: f64,
    /// Stereo balance in `[-1, 1]`: -1 fully left, 0 centered, +1 fully right.
    pub pan: f64,
}

/// Tunables for the distance-to-audio mapping.
#[derive(Debug, Clone, Copy)]
pub struct SpatialConfig {
    /// Distance at which gain reaches zero.
    pub max_distance: f64,
    /// Gain at distance zero.
    pub volume_ceiling: f64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self { max_distance: 200.0, volume_ceiling: 0.8 }
    }
}

impl SpatialConfig {
    /// Map a peer's distance and bearing angle to `(gain, pan)`.
    ///
    /// Gain falls off linearly from `volume_ceiling` at distance zero to
    /// zero at `max_distance` and beyond. Pan is `sin(angle)` clamped to
    /// `[-1, 1]`, with `angle` the `atan2(dy, dx)` bearing from the listener
    /// toward the peer.
    pub fn map(&self, distance: f64, angle: f64) -> AudioParams {
        let gain = (1.0 - distance / self.max_distance).clamp(0.0, 1.0) * self.volume_ceiling;
        let pan = angle.sin().clamp(-1.0, 1.0);
        AudioParams { gain, pan }
    }
}
