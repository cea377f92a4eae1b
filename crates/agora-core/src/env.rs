//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples protocol logic from system resources
//! (time, randomness). Production implementations use the system clock and
//! OS entropy; tests substitute fixed clocks and seeded byte sources so
//! session id allocation and chat timestamps are reproducible.
//!
//! # Invariants
//!
//! - Monotonicity: `now()` must never go backwards within one process.
//! - Isolation: implementations must not share global mutable state.

use std::time::Instant;

/// Abstract environment providing time and randomness.
///
/// Protocol logic only ever touches the system through this trait, which is
/// what keeps the registry and client state machines fully deterministic
/// under test.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current monotonic time.
    fn now(&self) -> Instant;

    /// Returns the current wall-clock time as unix milliseconds.
    ///
    /// Used for user-visible timestamps (chat messages). Not monotonic.
    fn unix_millis(&self) -> u64;

    /// Fills the provided buffer with random bytes.
    ///
    /// Production implementations must use OS-level entropy; session ids are
    /// unguessable connection handles.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`, the session id width.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}
