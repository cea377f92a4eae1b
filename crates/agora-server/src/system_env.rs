//! Production Environment implementation using system time and RNG.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use agora_core::env::Environment;

/// Production environment using system time and cryptographic RNG.
///
/// - `std::time::Instant::now()` for monotonic time
/// - `SystemTime` for wall-clock timestamps
/// - `getrandom` for session id entropy
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn unix_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).unwrap_or_else(|e| {
            // NOTE: should never fail on supported platforms. Fill with zeros
            // as a fallback rather than panic; session id allocation re-draws
            // on collision anyway.
            tracing::error!("getrandom failed: {}", e);
            buffer.fill(0);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_advances() {
        let env = SystemEnv::new();
        let t1 = env.now();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(env.now() > t1);
    }

    #[test]
    fn unix_millis_is_plausible() {
        // After 2020-01-01, before 2100.
        let millis = SystemEnv::new().unix_millis();
        assert!(millis > 1_577_836_800_000);
        assert!(millis < 4_102_444_800_000);
    }

    #[test]
    fn random_u64s_differ() {
        let env = SystemEnv::new();
        assert_ne!(env.random_u64(), env.random_u64());
    }
}
