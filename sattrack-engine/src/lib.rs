//! Satellite tracking engine
//!
//! Element set acquisition and parsing, SGP4 propagation, frame conversion
//! and the tracking sessions that stream positions to a render bridge.

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod module;

pub use error::TrackingError;
pub use model::tle::{parse_tle, ElementSet, TleError};
pub use module::fetch::{CelestrakClient, FetchError, StaticSource, TleSource};
pub use module::frames::{to_geodetic, EarthModel};
pub use module::propagation::{PropagatedState, PropagationError, Sgp4};
pub use module::session::{SessionClock, SessionSettings, SessionState, TrackingSession, TrackingView};
