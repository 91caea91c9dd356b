use std::collections::HashSet;

/// Opaque handle to a placed marker (point plus origin-to-point line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

/// Rendering collaborator that owns the actual 3-D globe.
///
/// Markers are never mutated in place: callers remove the old handle and
/// place a new one.
pub trait SceneRenderer {
    fn place_marker(
        &mut self,
        latitude: f64,
        longitude: f64,
        radius: f64,
        color: u32,
        size: f64,
    ) -> MarkerHandle;

    fn remove_marker(&mut self, handle: MarkerHandle);
}

/// Renderer without a display that records live markers and logs every change.
#[derive(Debug, Default)]
pub struct TracingRenderer {
    next_handle: u64,
    live: HashSet<MarkerHandle>,
}

impl TracingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_markers(&self) -> usize {
        self.live.len()
    }
}

impl SceneRenderer for TracingRenderer {
    fn place_marker(
        &mut self,
        latitude: f64,
        longitude: f64,
        radius: f64,
        color: u32,
        size: f64,
    ) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.live.insert(handle);

        tracing::info!(
            "Marker {} placed at lat {:.4}, lon {:.4} (radius {:.5}, color #{:06x}, size {})",
            handle.0,
            latitude,
            longitude,
            radius,
            color,
            size
        );
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        if !self.live.remove(&handle) {
            tracing::warn!("Attempted to remove unknown marker {}", handle.0);
        }
    }
}
