use std::sync::{Arc, Mutex, MutexGuard};

use sattrack_common::{BridgeMessage, BridgeSender, GeodeticPosition};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;
use uuid::Uuid;

use super::{SessionClock, SessionSettings, SessionState};
use crate::error::TrackingError;
use crate::model::tle::{parse_tle, ElementSet};
use crate::module::fetch::TleSource;
use crate::module::frames::{self, EarthModel};
use crate::module::propagation::{PropagationError, Sgp4};

/// State shared between the session handle and its ticker task.
#[derive(Debug)]
struct Shared {
    state: SessionState,
    last_position: Option<GeodeticPosition>,
    last_message: Option<BridgeMessage>,
    last_error: Option<PropagationError>,
    published: u64,
}

impl Shared {
    /// Publish under the lock so nothing goes out once the state has left `Active`.
    fn publish(&mut self, bridge: &BridgeSender, message: BridgeMessage) -> bool {
        if self.state != SessionState::Active {
            return false;
        }
        if bridge.send(message.clone()).is_err() {
            tracing::error!("Render bridge closed, session failed");
            self.state = SessionState::Failed;
            return false;
        }
        self.last_message = Some(message);
        self.published += 1;
        true
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One satellite, one element set, one timer.
#[derive(Debug)]
pub struct TrackingSession {
    id: Uuid,
    catalog_number: u32,
    settings: SessionSettings,
    clock: SessionClock,
    elements: Option<ElementSet>,
    shared: Arc<Mutex<Shared>>,
    ticker: Option<JoinHandle<()>>,
}

impl TrackingSession {
    pub fn new(catalog_number: u32, settings: SessionSettings, clock: SessionClock) -> Self {
        Self {
            id: Uuid::now_v7(),
            catalog_number,
            settings,
            clock,
            elements: None,
            shared: Arc::new(Mutex::new(Shared {
                state: SessionState::Created,
                last_position: None,
                last_message: None,
                last_error: None,
                published: 0,
            })),
            ticker: None,
        }
    }

    /// Fetch and parse the element set, publish the first position and arm
    /// the ticker. Any failure here is terminal and leaves the session `Failed`.
    pub async fn start(&mut self, source: &dyn TleSource, bridge: BridgeSender) -> Result<(), TrackingError> {
        {
            let mut shared = lock(&self.shared);
            if shared.state != SessionState::Created {
                return Err(TrackingError::AlreadyStarted(shared.state));
            }
            shared.state = SessionState::Fetching;
        }

        let span = tracing::info_span!("session", id = %self.id, satellite = self.catalog_number);
        let result = self.activate(source, bridge).instrument(span).await;
        if let Err(e) = &result {
            lock(&self.shared).state = SessionState::Failed;
            tracing::error!(session = %self.id, "Tracking satellite {} failed: {}", self.catalog_number, e);
        }
        result
    }

    async fn activate(&mut self, source: &dyn TleSource, bridge: BridgeSender) -> Result<(), TrackingError> {
        tracing::info!("Fetching element set for satellite {}", self.catalog_number);
        let text = source.fetch(self.catalog_number).await?;
        let elements = parse_tle(&text)?;
        if elements.catalog_number() != self.catalog_number {
            tracing::warn!(
                "Requested satellite {} but received element set for {}",
                self.catalog_number,
                elements.catalog_number()
            );
        }
        let sgp4 = Sgp4::new(&elements)?;
        tracing::info!(
            "Element set for {} ({}) epoch {}, period {:.1} min",
            self.catalog_number,
            elements.name().unwrap_or("unnamed"),
            elements.epoch().format("%Y-%m-%d %H:%M:%S UTC"),
            sgp4.period_minutes()
        );

        let ticker = Ticker {
            catalog_number: self.catalog_number,
            sgp4,
            earth_model: self.settings.earth_model,
            clock: self.clock,
            shared: self.shared.clone(),
            bridge,
        };

        // the first position decides whether the session goes live at all
        let at = self.clock.now();
        let position = ticker.position_at(at)?;
        let message = BridgeMessage::encode(self.catalog_number, at, &position);
        {
            let mut shared = lock(&self.shared);
            shared.state = SessionState::Active;
            if !shared.publish(&ticker.bridge, message) {
                return Err(TrackingError::Bridge(sattrack_common::BridgeClosed));
            }
            shared.last_position = Some(position);
        }
        tracing::info!("Session active, first position {}", position);

        self.elements = Some(elements);
        let period = self.settings.tick_interval;
        let span = tracing::info_span!("session", id = %self.id, satellite = self.catalog_number);
        self.ticker = Some(tokio::spawn(ticker.run(period).instrument(span)));

        Ok(())
    }

    /// Cancel the ticker. Synchronous and idempotent; after it returns no
    /// further position is published.
    pub fn stop(&mut self) {
        {
            let mut shared = lock(&self.shared);
            if !shared.state.is_terminal() {
                shared.state = SessionState::Stopped;
                tracing::info!(session = %self.id, "Stopped tracking satellite {}", self.catalog_number);
            }
        }
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn catalog_number(&self) -> u32 {
        self.catalog_number
    }

    pub fn state(&self) -> SessionState {
        lock(&self.shared).state
    }

    /// Element set, once fetched
    pub fn elements(&self) -> Option<&ElementSet> {
        self.elements.as_ref()
    }

    /// Last good position published
    pub fn last_position(&self) -> Option<GeodeticPosition> {
        lock(&self.shared).last_position
    }

    pub fn last_message(&self) -> Option<BridgeMessage> {
        lock(&self.shared).last_message.clone()
    }

    /// Most recent per-tick propagation failure, if any
    pub fn last_error(&self) -> Option<PropagationError> {
        lock(&self.shared).last_error.clone()
    }

    /// Number of messages sent over the bridge, republished ones included
    pub fn published(&self) -> u64 {
        lock(&self.shared).published
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The periodic half of a session, owned by its spawned task.
struct Ticker {
    catalog_number: u32,
    sgp4: Sgp4,
    earth_model: EarthModel,
    clock: SessionClock,
    shared: Arc<Mutex<Shared>>,
    bridge: BridgeSender,
}

impl Ticker {
    fn position_at(&self, at: chrono::DateTime<chrono::Utc>) -> Result<GeodeticPosition, PropagationError> {
        let state = self.sgp4.propagate_to(at)?;
        frames::to_geodetic(&state, self.earth_model)
    }

    async fn run(self, period: std::time::Duration) {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if !self.tick() {
                break;
            }
        }
        tracing::debug!("Ticker for satellite {} exited", self.catalog_number);
    }

    /// One propagate, convert and publish cycle. Returns false once the
    /// session is no longer active.
    fn tick(&self) -> bool {
        let at = self.clock.now();
        let result = self.position_at(at);

        let mut shared = lock(&self.shared);
        if shared.state != SessionState::Active {
            return false;
        }

        match result {
            Ok(position) => {
                let message = BridgeMessage::encode(self.catalog_number, at, &position);
                if !shared.publish(&self.bridge, message) {
                    return false;
                }
                shared.last_position = Some(position);
                shared.last_error = None;
                tracing::debug!("Satellite {} at {}", self.catalog_number, position);
            }
            Err(e) => {
                tracing::warn!("Propagation failed, keeping last position: {}", e);
                shared.last_error = Some(e);
                if let Some(previous) = shared.last_message.clone() {
                    if !shared.publish(&self.bridge, previous) {
                        return false;
                    }
                }
            }
        }
        true
    }
}
