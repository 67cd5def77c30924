//! Core library for the `weather-dash` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather API client and its data models
//! - Shared location/condition state and request sequencing
//! - Panel logic (current conditions, forecast window, precipitation map)
//! - Background selection and the dashboard composition root
//!
//! It knows nothing about terminals; `weather-dash` renders what it exposes.

pub mod background;
pub mod clock;
pub mod config;
pub mod current;
pub mod dashboard;
pub mod debounce;
pub mod error;
pub mod forecast;
pub mod geolocation;
pub mod http;
pub mod map;
pub mod model;
pub mod provider;
pub mod state;

pub use background::{BackgroundId, select_background};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardEvent, DashboardSettings};
pub use error::{Error, Result};
pub use model::{Coordinates, ForecastSnapshot, WeatherSnapshot};
pub use provider::{Query, WeatherProvider};
pub use state::{SharedState, StateStore};
