use crate::{
    Config,
    error::Result,
    model::{Coordinates, ForecastSnapshot, WeatherSnapshot},
    provider::weatherapi::WeatherApiProvider,
};
use async_trait::async_trait;
use std::{fmt, fmt::Debug, sync::Arc};

pub mod weatherapi;

/// What to look weather up for.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coords(Coordinates),
}

impl Query {
    pub fn as_param(&self) -> String {
        match self {
            Query::City(name) => name.trim().to_string(),
            Query::Coords(coords) => coords.as_query(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::City(name) => f.write_str(name.trim()),
            Query::Coords(coords) => write!(f, "{coords}"),
        }
    }
}

impl From<Coordinates> for Query {
    fn from(value: Coordinates) -> Self {
        Query::Coords(value)
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &Query) -> Result<WeatherSnapshot>;

    async fn forecast(&self, coords: Coordinates) -> Result<ForecastSnapshot>;
}

/// Construct the weather API provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<WeatherApiProvider>> {
    let api_key = config.api_key()?;
    Ok(Arc::new(WeatherApiProvider::new(config.base_url(), api_key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params() {
        assert_eq!(Query::City("  Paris ".into()).as_param(), "Paris");
        assert_eq!(Query::from(Coordinates::new(48.85, 2.35)).as_param(), "48.85,2.35");
    }

    #[test]
    fn provider_from_config_uses_configured_base_url() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.set_base_url(Some("http://localhost:9/v1/".into()));

        let provider = provider_from_config(&cfg).expect("provider must build");
        if std::env::var(crate::config::ENV_API_URL).is_err() {
            assert_eq!(provider.base_url(), "http://localhost:9/v1");
        }
    }
}
