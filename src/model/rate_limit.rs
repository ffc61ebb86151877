use std::{fmt::Display, time::Duration};

use chrono::{DateTime, Utc};

/// The API rate limit as reported by a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// The maximum number of requests that can be made in the current window.
    pub limit: u32,
    /// The remaining number of requests that can be made in the current window.
    pub remaining: u32,
    /// The number of requests already made in the current window.
    pub used: u32,
    /// The time at which the window resets.
    pub reset_at: DateTime<Utc>,
}

impl RateLimitSnapshot {
    /// Creates a snapshot from a reset time expressed in seconds since the epoch.
    pub fn from_epoch(limit: u32, remaining: u32, used: u32, reset_epoch: i64) -> Option<Self> {
        Some(Self {
            limit,
            remaining,
            used,
            reset_at: DateTime::from_timestamp(reset_epoch, 0)?,
        })
    }

    /// Checks whether the remaining quota is exhausted.
    pub fn is_exceeded(&self) -> bool {
        self.remaining == 0
    }

    #[cfg(test)]
    /// Creates a dummy `RateLimitSnapshot` instance for testing purposes.
    pub fn dummy() -> Self {
        Self {
            limit: 5000,
            remaining: 4999,
            used: 1,
            reset_at: DateTime::from_timestamp(1_735_689_600, 0).unwrap(),
        }
    }
}

impl Display for RateLimitSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RateLimit: calls={}/{}, remaining={}, reset={}",
            self.used,
            self.limit,
            self.remaining,
            self.reset_at.to_rfc3339()
        )
    }
}

/// The quota known to the process, shared by every request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitState {
    /// The remaining quota, `None` when unknown.
    pub remaining: Option<u32>,
    /// The reset time of the current window, `None` when unknown.
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitState {
    /// Checks whether the known remaining quota is below the threshold.
    pub fn is_below(&self, threshold: u32) -> bool {
        self.remaining.is_some_and(|remaining| remaining < threshold)
    }

    /// Computes how long to wait from `now` until the window resets.
    pub fn duration_until_reset(&self, now: DateTime<Utc>) -> Duration {
        self.reset_at
            .and_then(|reset_at| (reset_at - now).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    /// Checks whether a snapshot is at least as fresh as the current state.
    ///
    /// Snapshots from an older window are stale, and so are snapshots of the same window
    /// reporting more remaining quota than already known: responses may arrive out of order.
    /// A window with a known reset time but an unknown quota has been waited out, so late
    /// snapshots of that window are stale too.
    pub fn accepts(&self, snapshot: &RateLimitSnapshot) -> bool {
        match self.reset_at {
            Some(reset_at) if snapshot.reset_at < reset_at => false,
            Some(reset_at) if snapshot.reset_at == reset_at => self
                .remaining
                .is_some_and(|remaining| snapshot.remaining <= remaining),
            _ => true,
        }
    }
}

impl Display for RateLimitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.remaining, self.reset_at) {
            (Some(remaining), Some(reset_at)) => write!(
                f,
                "RateLimit: remaining={remaining}, reset={}",
                reset_at.to_rfc3339()
            ),
            _ => write!(f, "RateLimit: unknown"),
        }
    }
}
