use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sattrack_common::GeodeticPosition;

use crate::config::SceneConfig;
use crate::renderer::{MarkerHandle, SceneRenderer};

/// Current marker for one satellite
#[derive(Debug, Clone)]
struct MarkerSlot {
    handle: MarkerHandle,
    position: GeodeticPosition,
    observed_at: DateTime<Utc>,
}

/// Outcome of a replace request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// First marker for this satellite
    Placed(MarkerHandle),
    /// Old marker removed, new one placed
    Replaced(MarkerHandle),
    /// Update older than the marker on screen; nothing changed
    Stale,
}

/// Exactly one live marker per satellite id.
///
/// The registry is the only thing allowed to touch the renderer; every update
/// removes the previous marker before placing the next.
pub struct MarkerRegistry<R: SceneRenderer> {
    renderer: R,
    config: SceneConfig,
    slots: HashMap<u32, MarkerSlot>,
}

impl<R: SceneRenderer> MarkerRegistry<R> {
    pub fn new(renderer: R, config: SceneConfig) -> Self {
        Self {
            renderer,
            config,
            slots: HashMap::new(),
        }
    }

    /// Replace the marker for `satellite_id` with one at `position`.
    pub fn replace(
        &mut self,
        satellite_id: u32,
        observed_at: DateTime<Utc>,
        position: GeodeticPosition,
    ) -> ReplaceOutcome {
        let previous = match self.slots.get(&satellite_id) {
            Some(slot) if observed_at < slot.observed_at => {
                tracing::warn!(
                    "Ignoring stale update for satellite {} ({} < {})",
                    satellite_id,
                    observed_at,
                    slot.observed_at
                );
                return ReplaceOutcome::Stale;
            }
            Some(slot) => Some(slot.handle),
            None => None,
        };

        if let Some(handle) = previous {
            self.renderer.remove_marker(handle);
        }

        let radius = position.scene_radius(self.config.altitude_scale);
        let handle = self.renderer.place_marker(
            position.latitude,
            position.longitude,
            radius,
            self.config.marker_color,
            self.config.marker_size,
        );

        self.slots.insert(
            satellite_id,
            MarkerSlot {
                handle,
                position,
                observed_at,
            },
        );

        match previous {
            Some(_) => ReplaceOutcome::Replaced(handle),
            None => ReplaceOutcome::Placed(handle),
        }
    }

    /// Remove the marker for `satellite_id`, if any.
    pub fn remove(&mut self, satellite_id: u32) -> bool {
        match self.slots.remove(&satellite_id) {
            Some(slot) => {
                self.renderer.remove_marker(slot.handle);
                true
            }
            None => false,
        }
    }

    /// Latest position shown for `satellite_id` (info panel read-out).
    pub fn latest(&self, satellite_id: u32) -> Option<GeodeticPosition> {
        self.slots.get(&satellite_id).map(|slot| slot.position)
    }

    pub fn handle(&self, satellite_id: u32) -> Option<MarkerHandle> {
        self.slots.get(&satellite_id).map(|slot| slot.handle)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[derive(Default)]
    struct RecordingRenderer {
        next: u64,
        live: Vec<MarkerHandle>,
        calls: Vec<String>,
        last_radius: f64,
    }

    impl SceneRenderer for RecordingRenderer {
        fn place_marker(&mut self, _lat: f64, _lon: f64, radius: f64, _color: u32, _size: f64) -> MarkerHandle {
            self.next += 1;
            let handle = MarkerHandle(self.next);
            self.live.push(handle);
            self.calls.push(format!("place {}", handle.0));
            self.last_radius = radius;
            handle
        }

        fn remove_marker(&mut self, handle: MarkerHandle) {
            self.live.retain(|h| *h != handle);
            self.calls.push(format!("remove {}", handle.0));
        }
    }

    #[test]
    fn test_replace_never_accumulates() {
        let mut registry = MarkerRegistry::new(RecordingRenderer::default(), SceneConfig::default());
        let t0 = Utc::now();

        for i in 0..5 {
            let p = GeodeticPosition::new(i as f64, 10.0, 420.0);
            registry.replace(25544, t0 + Duration::seconds(i), p);
        }

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.renderer().live.len(), 1);
        assert_eq!(registry.latest(25544).unwrap().latitude, 4.0);
        assert_eq!(
            registry.renderer().calls[..4],
            ["place 1", "remove 1", "place 2", "remove 2"]
        );
    }

    #[test]
    fn test_replace_outcomes_and_stale() {
        let mut registry = MarkerRegistry::new(RecordingRenderer::default(), SceneConfig::default());
        let t0 = Utc::now();
        let p = GeodeticPosition::new(0.0, 0.0, 6371.0);

        assert_eq!(registry.replace(1, t0, p), ReplaceOutcome::Placed(MarkerHandle(1)));
        assert!((registry.renderer().last_radius - 1.5).abs() < 1e-12);
        // same instant is accepted (frozen republish)
        assert_eq!(registry.replace(1, t0, p), ReplaceOutcome::Replaced(MarkerHandle(2)));
        assert_eq!(registry.replace(1, t0 - Duration::seconds(1), p), ReplaceOutcome::Stale);
        assert_eq!(registry.handle(1), Some(MarkerHandle(2)));
    }

    #[test]
    fn test_satellites_are_independent() {
        let mut registry = MarkerRegistry::new(RecordingRenderer::default(), SceneConfig::default());
        let t0 = Utc::now();
        registry.replace(1, t0, GeodeticPosition::new(1.0, 1.0, 400.0));
        registry.replace(2, t0, GeodeticPosition::new(2.0, 2.0, 400.0));
        assert_eq!(registry.renderer().live.len(), 2);

        assert!(registry.remove(1));
        assert!(!registry.remove(1));
        assert_eq!(registry.renderer().live, vec![MarkerHandle(2)]);
        assert!(registry.latest(1).is_none());
    }
}
