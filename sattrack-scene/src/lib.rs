pub mod bridge;
pub mod config;
pub mod registry;
pub mod renderer;

pub use bridge::SceneBridge;
pub use config::SceneConfig;
pub use registry::{MarkerRegistry, ReplaceOutcome};
pub use renderer::{MarkerHandle, SceneRenderer, TracingRenderer};
