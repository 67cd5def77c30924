use inquire::{Confirm, Password, PasswordDisplayMode, Text};
use tracing::info;
use weather_core::{Config, config::DEFAULT_BASE_URL};

/// Interactively set the API key, endpoint and location defaults.
pub fn run() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Weather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get one at https://www.weatherapi.com/my/")
        .prompt()?;
    config.set_api_key(api_key.trim().to_string());

    let current_url =
        config.weather.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Text::new("API base URL:").with_default(&current_url).prompt()?;
    config.set_base_url(non_default_url(&base_url));

    let geolocation = Confirm::new("Detect your location by IP address?")
        .with_default(config.location.geolocation)
        .prompt()?;
    config.location.geolocation = geolocation;

    let current_city = config.location.default_city.clone().unwrap_or_default();
    let city = Text::new("Default city (optional):")
        .with_default(&current_city)
        .with_help_message("Shown when your location is unavailable")
        .prompt()?;
    config.set_default_city(Some(city.trim().to_string()).filter(|c| !c.is_empty()));

    let path = config.save()?;
    info!(path = %path.display(), "configuration saved");
    println!("Saved configuration to {}", path.display());

    Ok(())
}

/// `None` keeps the built-in endpoint so later default changes apply.
fn non_default_url(input: &str) -> Option<String> {
    let url = input.trim().trim_end_matches('/');
    (!url.is_empty() && url != DEFAULT_BASE_URL).then(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url_is_not_stored() {
        assert_eq!(non_default_url(DEFAULT_BASE_URL), None);
        assert_eq!(non_default_url("https://api.weatherapi.com/v1/"), None);
        assert_eq!(non_default_url("  "), None);
        assert_eq!(
            non_default_url("http://localhost:8080"),
            Some("http://localhost:8080".to_string())
        );
    }
}
