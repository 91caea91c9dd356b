//! One-way message channel between the tracking engine and the scene
//!
//! The engine only ever holds a [`BridgeSender`]; the scene only ever holds a
//! [`BridgeReceiver`]. Payloads travel as opaque JSON text with the schema
//! `{ "latitude": "<6dp>", "longitude": "<6dp>", "altitude": "<2dp km>" }`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::types::GeodeticPosition;

/// Decoded form of the JSON payload. All numbers are carried as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionMessage {
    pub latitude: String,
    pub longitude: String,
    pub altitude: String,
}

impl PositionMessage {
    pub fn from_position(position: &GeodeticPosition) -> Self {
        Self {
            latitude: format!("{:.6}", position.latitude),
            longitude: format!("{:.6}", position.longitude),
            altitude: format!("{:.2}", position.altitude),
        }
    }

    pub fn to_position(&self) -> Result<GeodeticPosition, BridgeDecodeError> {
        let latitude = parse_field("latitude", &self.latitude)?;
        let longitude = parse_field("longitude", &self.longitude)?;
        let altitude = parse_field("altitude", &self.altitude)?;

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(BridgeDecodeError::OutOfRange {
                field: "latitude",
                value: latitude,
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(BridgeDecodeError::OutOfRange {
                field: "longitude",
                value: longitude,
            });
        }

        Ok(GeodeticPosition::new(latitude, longitude, altitude))
    }
}

fn parse_field(field: &'static str, text: &str) -> Result<f64, BridgeDecodeError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(BridgeDecodeError::Number {
            field,
            text: text.to_string(),
        }),
    }
}

#[derive(Debug, Error)]
pub enum BridgeDecodeError {
    #[error("malformed bridge payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field '{field}' is not a finite number: {text:?}")]
    Number { field: &'static str, text: String },

    #[error("field '{field}' out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Envelope routed through the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeMessage {
    /// Catalog number of the satellite this update belongs to
    pub satellite_id: u32,
    /// Instant the position was propagated to
    pub observed_at: DateTime<Utc>,
    /// Opaque JSON text
    pub payload: String,
}

impl BridgeMessage {
    pub fn encode(satellite_id: u32, observed_at: DateTime<Utc>, position: &GeodeticPosition) -> Self {
        let message = PositionMessage::from_position(position);
        // three string fields always serialize
        let payload = serde_json::to_string(&message).unwrap_or_default();

        Self {
            satellite_id,
            observed_at,
            payload,
        }
    }

    pub fn decode(&self) -> Result<GeodeticPosition, BridgeDecodeError> {
        let message: PositionMessage = serde_json::from_str(&self.payload)?;
        message.to_position()
    }
}

#[derive(Debug, Error)]
#[error("bridge receiver has been dropped")]
pub struct BridgeClosed;

/// Create a connected sender/receiver pair.
pub fn channel() -> (BridgeSender, BridgeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (BridgeSender { tx }, BridgeReceiver { rx })
}

/// Sending half. Never blocks, so a publish always returns before the next tick.
#[derive(Debug, Clone)]
pub struct BridgeSender {
    tx: mpsc::UnboundedSender<BridgeMessage>,
}

impl BridgeSender {
    pub fn send(&self, message: BridgeMessage) -> Result<(), BridgeClosed> {
        self.tx.send(message).map_err(|_| BridgeClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half, owned by the presentation side.
#[derive(Debug)]
pub struct BridgeReceiver {
    rx: mpsc::UnboundedReceiver<BridgeMessage>,
}

impl BridgeReceiver {
    pub async fn recv(&mut self) -> Option<BridgeMessage> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<BridgeMessage> {
        self.rx.try_recv().ok()
    }

    pub fn into_stream(self) -> UnboundedReceiverStream<BridgeMessage> {
        UnboundedReceiverStream::new(self.rx)
    }
}
