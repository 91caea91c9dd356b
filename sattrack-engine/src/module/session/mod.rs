//! Tracking sessions
//!
//! A session fetches one element set, then propagates, converts and publishes
//! a position on a fixed tick until it is stopped. [`TrackingView`] keeps at
//! most one session alive per render target.

mod clock;
mod session;
mod view;

use std::time::Duration;

use crate::module::frames::EarthModel;

pub use clock::SessionClock;
pub use session::TrackingSession;
pub use view::TrackingView;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Fetching,
    Active,
    Stopped,
    Failed,
}

impl SessionState {
    /// No further transitions out of this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Stopped | SessionState::Failed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Created => "created",
            SessionState::Fetching => "fetching",
            SessionState::Active => "active",
            SessionState::Stopped => "stopped",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub tick_interval: Duration,
    pub earth_model: EarthModel,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            earth_model: EarthModel::default(),
        }
    }
}
