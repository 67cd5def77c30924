use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use weather_core::{
    Config, Coordinates, Dashboard, DashboardSettings, SystemClock,
    geolocation::{Disabled, FixedLocation, Geolocator, IpGeolocator},
    provider::{provider_from_config, weatherapi::WeatherApiProvider},
};

use crate::{app::App, configure, logging, show, terminal};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the full-screen dashboard (default).
    Run(LocationArgs),

    /// Print current conditions and the forecast window, then exit.
    Show(LocationArgs),

    /// Configure the weather API key and defaults.
    Configure,
}

#[derive(Debug, Clone, Default, Args)]
pub struct LocationArgs {
    /// City to show instead of looking up the current location.
    #[arg(long)]
    pub city: Option<String>,

    /// Latitude to use instead of geolocation.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude to use instead of geolocation.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Never look up the location by IP.
    #[arg(long)]
    pub no_geolocation: bool,
}

impl LocationArgs {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }

    /// How to find the user's position for these arguments and config.
    pub fn geolocator(&self, config: &Config, api: Arc<WeatherApiProvider>) -> Arc<dyn Geolocator> {
        if let Some(coords) = self.coordinates() {
            Arc::new(FixedLocation(coords))
        } else if self.no_geolocation || !config.location.geolocation {
            Arc::new(Disabled)
        } else {
            Arc::new(IpGeolocator::new(api))
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Run(LocationArgs::default())) {
            Command::Configure => {
                logging::init_stderr(self.debug);
                configure::run()
            }
            Command::Show(args) => {
                logging::init_stderr(self.debug);
                let config = Config::load()?;
                show::run(&config, &args).await
            }
            Command::Run(args) => {
                let log_path = logging::init_file(self.debug)?;
                let config = Config::load()?;
                run_dashboard(&config, &args).await.with_context(|| {
                    format!("Dashboard stopped with an error; see {}", log_path.display())
                })
            }
        }
    }
}

async fn run_dashboard(config: &Config, args: &LocationArgs) -> anyhow::Result<()> {
    let api = provider_from_config(config)?;
    let mut settings = DashboardSettings::from(config);
    if args.city.is_some() {
        settings.default_city = args.city.clone();
    }

    let mut dashboard = Dashboard::new(api.clone(), Arc::new(SystemClock), settings);
    match &args.city {
        Some(city) => dashboard.search(city),
        None => dashboard.start(args.geolocator(config, api)),
    }
    info!("dashboard started");

    let mut app = App::new(dashboard, config.ui.cell_width_px);
    let mut term = terminal::setup()?;
    let result = app.run(&mut term).await;
    terminal::cleanup();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["weather-dash"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn negative_coordinates_parse() {
        let cli =
            Cli::try_parse_from(["weather-dash", "show", "--lat", "-33.87", "--lon", "151.21"])
                .unwrap();
        let Some(Command::Show(args)) = cli.command else { panic!("expected show") };
        assert_eq!(args.coordinates(), Some(Coordinates::new(-33.87, 151.21)));
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["weather-dash", "run", "--lat", "1.0"]).is_err());
    }
}
