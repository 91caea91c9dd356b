use std::future::Future;
use std::sync::Arc;

use sattrack_common::BridgeSender;

use super::{SessionClock, SessionSettings, TrackingSession};
use crate::error::TrackingError;
use crate::module::fetch::TleSource;

/// Owns the session feeding one render target.
///
/// Selecting a satellite stops whatever was being tracked before the new
/// fetch begins, so two tickers never publish into the same target.
pub struct TrackingView {
    source: Arc<dyn TleSource>,
    settings: SessionSettings,
    clock: SessionClock,
    bridge: BridgeSender,
    current: Option<TrackingSession>,
}

impl TrackingView {
    pub fn new(source: Arc<dyn TleSource>, settings: SessionSettings, bridge: BridgeSender) -> Self {
        Self::with_clock(source, settings, bridge, SessionClock::system())
    }

    pub fn with_clock(
        source: Arc<dyn TleSource>,
        settings: SessionSettings,
        bridge: BridgeSender,
        clock: SessionClock,
    ) -> Self {
        Self {
            source,
            settings,
            clock,
            bridge,
            current: None,
        }
    }

    /// Track `catalog_number`, replacing any previous session.
    ///
    /// On failure the failed session stays visible through [`Self::current`].
    pub async fn select(&mut self, catalog_number: u32) -> Result<&TrackingSession, TrackingError> {
        self.clear();

        tracing::info!("Selecting satellite {}", catalog_number);
        let mut session = TrackingSession::new(catalog_number, self.settings, self.clock);
        let result = session.start(self.source.as_ref(), self.bridge.clone()).await;
        let session = self.current.insert(session);
        result.map(|_| &*session)
    }

    /// Track `catalog_number` until `shutdown` resolves, then stop.
    ///
    /// A failed start returns at once without waiting on `shutdown`.
    pub async fn track_until(
        &mut self,
        catalog_number: u32,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), TrackingError> {
        let session = self.select(catalog_number).await?;
        tracing::info!(
            "Tracking satellite {} (session {})",
            catalog_number,
            session.id()
        );
        shutdown.await;
        self.clear();
        Ok(())
    }

    /// Stop and discard the current session, if any.
    pub fn clear(&mut self) {
        if let Some(mut previous) = self.current.take() {
            previous.stop();
        }
    }

    pub fn current(&self) -> Option<&TrackingSession> {
        self.current.as_ref()
    }
}

impl Drop for TrackingView {
    fn drop(&mut self) {
        self.clear();
    }
}
