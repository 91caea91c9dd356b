pub mod bridge;
pub mod scene;
pub mod types;

// Re-export commonly used types
pub use bridge::{
    channel, BridgeClosed, BridgeDecodeError, BridgeMessage, BridgeReceiver, BridgeSender,
    PositionMessage,
};
pub use scene::{lat_lon_to_scene, marker_radius, ScenePoint, DEFAULT_ALTITUDE_SCALE};
pub use types::{wrap_longitude, GeodeticPosition};
