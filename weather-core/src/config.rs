use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

pub const ENV_API_URL: &str = "WEATHER_API_URL";
pub const ENV_API_KEY: &str = "WEATHER_API_KEY";

/// Values baked in at build time, used when neither the environment nor the
/// config file provide one.
const BUILD_API_URL: Option<&str> = option_env!("WEATHER_API_URL");
const BUILD_API_KEY: Option<&str> = option_env!("WEATHER_API_KEY");

/// Weather API endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WeatherApiConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Look the user up by IP on startup.
    pub geolocation: bool,
    /// City shown when geolocation is off or fails.
    pub default_city: Option<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self { geolocation: true, default_city: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub search_debounce_ms: u64,
    /// Below this width the forecast shows the short window.
    pub narrow_breakpoint_px: u32,
    /// Approximate pixel width of one terminal cell.
    pub cell_width_px: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { search_debounce_ms: 500, narrow_breakpoint_px: 786, cell_width_px: 8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: f64,
    pub frame_interval_ms: u64,
    /// Forecast hours the precipitation animation advances per second.
    pub hours_per_second: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { zoom: 2.0, frame_interval_ms: 100, hours_per_second: 1.0 }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [weather]
/// api_key = "..."
///
/// [location]
/// default_city = "Jakarta"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub weather: WeatherApiConfig,
    pub location: LocationConfig,
    pub ui: UiConfig,
    pub map: MapConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    pub fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-dash", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Base URL of the weather API: env, then file, then build-time, then default.
    pub fn base_url(&self) -> String {
        self.base_url_with(|key| std::env::var(key).ok())
    }

    pub fn base_url_with(&self, env: impl Fn(&str) -> Option<String>) -> String {
        env(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.weather.base_url.clone())
            .or_else(|| BUILD_API_URL.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// API key for the weather API, resolved like [`Config::base_url`].
    pub fn api_key(&self) -> Result<String> {
        self.api_key_with(|key| std::env::var(key).ok())
    }

    pub fn api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<String> {
        env(ENV_API_KEY)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.weather.api_key.clone())
            .or_else(|| BUILD_API_KEY.map(str::to_string))
            .ok_or_else(|| {
                anyhow!(
                    "No weather API key configured.\n\
                     Hint: run `weather-dash configure` or set {ENV_API_KEY}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.weather.api_key = Some(api_key);
    }

    /// Store a custom base URL; `None` or blank resets to the default.
    pub fn set_base_url(&mut self, base_url: Option<String>) {
        self.weather.base_url = base_url.filter(|url| !url.trim().is_empty());
    }

    pub fn set_default_city(&mut self, city: Option<String>) {
        self.location.default_city = city.filter(|c| !c.trim().is_empty());
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.ui.search_debounce_ms)
    }

    pub fn map_frame_interval(&self) -> Duration {
        Duration::from_millis(self.map.frame_interval_ms.max(1))
    }

    /// Animation speed; zero, negative or non-finite values fall back to
    /// the default.
    pub fn map_hours_per_second(&self) -> f64 {
        let speed = self.map.hours_per_second;
        if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            MapConfig::default().hours_per_second
        }
    }
}
