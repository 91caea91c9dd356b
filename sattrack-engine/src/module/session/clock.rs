use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

/// Wall-clock time advanced by the runtime's monotonic clock.
///
/// Successive readings never go backwards, and a paused test runtime moves
/// it exactly as far as the runtime's own timers.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    origin_wall: DateTime<Utc>,
    origin_instant: Instant,
}

impl SessionClock {
    pub fn system() -> Self {
        Self::starting_at(Utc::now())
    }

    /// A clock that reads `wall` right now.
    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            origin_wall: wall,
            origin_instant: Instant::now(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = self.origin_instant.elapsed();
        let delta = TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::MAX);
        self.origin_wall
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
