use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::Result,
    http::{HttpRequest, request_json},
    model::{Coordinates, ForecastSnapshot, WeatherSnapshot},
    provider::Query,
};

use super::WeatherProvider;

/// Client for weatherapi.com style endpoints under `base_url`.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    base_url: String,
    api_key: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct WaIpLookup {
    lat: f64,
    lon: f64,
    #[serde(default)]
    city: String,
}

impl WeatherApiProvider {
    pub fn new(base_url: impl Into<String>, api_key: String) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, api_key, http: Client::new() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> HttpRequest {
        HttpRequest::get(format!("{}/{name}", self.base_url)).query("key", self.api_key.as_str())
    }

    /// Approximate position of this machine from its public IP.
    pub async fn lookup_ip(&self) -> Result<Coordinates> {
        let req = self.endpoint("ip.json").query("q", "auto:ip");
        let found: WaIpLookup = request_json(&self.http, req).await?;
        debug!(city = %found.city, "resolved location from IP");
        Ok(Coordinates::new(found.lat, found.lon))
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, query: &Query) -> Result<WeatherSnapshot> {
        debug!(%query, "fetching current conditions");
        let req = self.endpoint("current.json").query("q", query.as_param());
        request_json(&self.http, req).await
    }

    async fn forecast(&self, coords: Coordinates) -> Result<ForecastSnapshot> {
        debug!(%coords, "fetching forecast");
        let req = self.endpoint("forecast.json").query("q", coords.as_query()).query("days", "1");
        request_json(&self.http, req).await
    }
}
