//! Receiving end of the tracking bridge
//!
//! Decodes position messages and turns each one into a marker replace.
//! Malformed messages are dropped with a warning; they never reach the engine.

use sattrack_common::{BridgeMessage, BridgeReceiver};
use tokio_stream::StreamExt;

use crate::registry::{MarkerRegistry, ReplaceOutcome};
use crate::renderer::SceneRenderer;

pub struct SceneBridge<R: SceneRenderer> {
    registry: MarkerRegistry<R>,
    applied: u64,
    dropped: u64,
}

impl<R: SceneRenderer> SceneBridge<R> {
    pub fn new(registry: MarkerRegistry<R>) -> Self {
        Self {
            registry,
            applied: 0,
            dropped: 0,
        }
    }

    /// Apply one message. Returns the replace outcome, or `None` if dropped.
    pub fn handle(&mut self, message: &BridgeMessage) -> Option<ReplaceOutcome> {
        match message.decode() {
            Ok(position) => {
                let outcome = self
                    .registry
                    .replace(message.satellite_id, message.observed_at, position);
                self.applied += 1;
                tracing::debug!(
                    "Satellite {} at {} -> {:?}",
                    message.satellite_id,
                    position,
                    outcome
                );
                Some(outcome)
            }
            Err(e) => {
                self.dropped += 1;
                tracing::warn!(
                    "Dropping malformed message for satellite {}: {}",
                    message.satellite_id,
                    e
                );
                None
            }
        }
    }

    /// Consume messages until every sender is gone, then hand back the registry.
    pub async fn run(mut self, receiver: BridgeReceiver) -> MarkerRegistry<R> {
        tracing::info!("Scene bridge listening for position updates");

        let mut stream = receiver.into_stream();
        while let Some(message) = stream.next().await {
            self.handle(&message);
        }

        tracing::info!(
            "Scene bridge closed ({} applied, {} dropped)",
            self.applied,
            self.dropped
        );
        self.registry
    }

    pub fn registry(&self) -> &MarkerRegistry<R> {
        &self.registry
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
