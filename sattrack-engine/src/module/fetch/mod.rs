//! Element set acquisition

mod celestrak;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

pub use celestrak::{CelestrakClient, DEFAULT_ENDPOINT};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("element set request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("element set service returned HTTP {status} for satellite {catalog_number}")]
    Status { catalog_number: u32, status: u16 },

    #[error("no element set available for satellite {0}")]
    NoData(u32),
}

/// Something that can produce raw two- or three-line element text for a
/// catalog number.
#[async_trait]
pub trait TleSource: Send + Sync {
    async fn fetch(&self, catalog_number: u32) -> Result<String, FetchError>;
}

/// In-memory source keyed by catalog number.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    texts: HashMap<u32, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, catalog_number: u32, text: impl Into<String>) -> Self {
        self.texts.insert(catalog_number, text.into());
        self
    }
}

#[async_trait]
impl TleSource for StaticSource {
    async fn fetch(&self, catalog_number: u32) -> Result<String, FetchError> {
        self.texts
            .get(&catalog_number)
            .cloned()
            .ok_or(FetchError::NoData(catalog_number))
    }
}
