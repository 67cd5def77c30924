use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    error::{Error, Result},
    model::Coordinates,
    provider::weatherapi::WeatherApiProvider,
};

/// One-shot position lookup.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates>;
}

/// Coordinates supplied up front, e.g. on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl Geolocator for FixedLocation {
    async fn locate(&self) -> Result<Coordinates> {
        Ok(self.0)
    }
}

/// Position derived from the public IP via the weather API.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    api: Arc<WeatherApiProvider>,
}

impl IpGeolocator {
    pub fn new(api: Arc<WeatherApiProvider>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates> {
        self.api.lookup_ip().await.map_err(|e| Error::GeolocationDenied(e.to_string()))
    }
}

/// Geolocation switched off by the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

#[async_trait]
impl Geolocator for Disabled {
    async fn locate(&self) -> Result<Coordinates> {
        Err(Error::GeolocationDenied("geolocation is disabled".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn disabled_is_denied() {
        let err = Disabled.locate().await.unwrap_err();
        assert!(matches!(err, Error::GeolocationDenied(_)));
    }

    #[tokio::test]
    async fn ip_lookup_failure_is_denied() {
        let server = MockServer::start().await;
        Mock::given(path("/ip.json"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let api = Arc::new(WeatherApiProvider::new(server.uri(), "KEY".into()));
        let err = IpGeolocator::new(api).locate().await.unwrap_err();

        assert!(matches!(err, Error::GeolocationDenied(_)));
    }

    #[tokio::test]
    async fn fixed_location_is_returned_as_is() {
        let coords = Coordinates::new(52.37, 4.89);
        assert_eq!(FixedLocation(coords).locate().await.unwrap(), coords);
    }
}
