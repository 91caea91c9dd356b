use sattrack_common::BridgeClosed;
use thiserror::Error;

use crate::model::tle::TleError;
use crate::module::fetch::FetchError;
use crate::module::propagation::PropagationError;
use crate::module::session::SessionState;

/// Terminal failure of a tracking session start.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid element set: {0}")]
    Tle(#[from] TleError),

    #[error(transparent)]
    Propagation(#[from] PropagationError),

    #[error(transparent)]
    Bridge(#[from] BridgeClosed),

    #[error("session cannot start from state {0}")]
    AlreadyStarted(SessionState),
}
