//! CelesTrak GP element set client

use std::time::Duration;

use async_trait::async_trait;

use super::{FetchError, TleSource};

pub const DEFAULT_ENDPOINT: &str = "https://celestrak.org/NORAD/elements/gp.php";
const NO_DATA_REPLY: &str = "No GP data found";

/// Fetches the current element set for one catalog number per request.
/// No retries: the caller decides what to do with a failure.
#[derive(Debug, Clone)]
pub struct CelestrakClient {
    client: reqwest::Client,
    endpoint: String,
}

impl CelestrakClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request_url(&self, catalog_number: u32) -> String {
        format!("{}?CATNR={}&FORMAT=TLE", self.endpoint, catalog_number)
    }
}

#[async_trait]
impl TleSource for CelestrakClient {
    async fn fetch(&self, catalog_number: u32) -> Result<String, FetchError> {
        let url = self.request_url(catalog_number);
        tracing::debug!("Fetching element set: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                catalog_number,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        check_body(catalog_number, body)
    }
}

fn check_body(catalog_number: u32, body: String) -> Result<String, FetchError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with(NO_DATA_REPLY) {
        return Err(FetchError::NoData(catalog_number));
    }
    Ok(body)
}
