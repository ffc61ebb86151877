use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use tokio::{sync::Mutex, time::sleep};

use crate::{RateLimitSnapshot, RateLimitState};

/// The default minimum quota kept in reserve before waiting for a reset.
pub const DEFAULT_SAFETY_THRESHOLD: u32 = 10;

/// The lowest safety threshold accepted from the command line.
pub const MIN_SAFETY_THRESHOLD: u32 = 5;

/// The default delay added after the reset time before resuming.
pub const DEFAULT_RESET_BUFFER: Duration = Duration::from_secs(1);

/// Tracks the API quota shared by every request of the process.
///
/// Checks and updates of the quota happen under a single lock, so two callers can never
/// both spend the last request of a window.
pub struct RateLimiter {
    /// The known quota
    state: Mutex<RateLimitState>,

    /// Below this remaining quota, callers wait for the window to reset
    safety_threshold: u32,

    /// The delay added after the reset time
    reset_buffer: Duration,
}

impl RateLimiter {
    /// Creates a new `RateLimiter` with an unknown quota.
    pub fn new(safety_threshold: u32, reset_buffer: Duration) -> Self {
        Self {
            state: Mutex::new(RateLimitState::default()),
            safety_threshold,
            reset_buffer,
        }
    }

    /// Waits until a request can be issued, then reserves one request of the quota.
    ///
    /// Returns the time spent waiting for a reset.
    pub async fn acquire(&self) -> Duration {
        let mut state = self.state.lock().await;
        let mut waited = Duration::ZERO;
        if state.is_below(self.safety_threshold) {
            waited = state.duration_until_reset(Utc::now()) + self.reset_buffer;
            warn!(
                "Rate limit threshold {} reached ({}), waiting for {waited:?}",
                self.safety_threshold, *state
            );
            sleep(waited).await;
            state.remaining = None;
        }
        if let Some(remaining) = state.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }

        waited
    }

    /// Refreshes the known quota from a response, ignoring stale snapshots.
    pub async fn update(&self, snapshot: &RateLimitSnapshot) {
        let mut state = self.state.lock().await;
        if state.accepts(snapshot) {
            state.remaining = Some(snapshot.remaining);
            state.reset_at = Some(snapshot.reset_at);
        } else {
            debug!("Ignoring stale rate limit snapshot: {snapshot}");
        }
    }

    /// Retrieves the known quota.
    pub async fn current_state(&self) -> RateLimitState {
        let state = self.state.lock().await;

        state.to_owned()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_SAFETY_THRESHOLD, DEFAULT_RESET_BUFFER)
    }
}
