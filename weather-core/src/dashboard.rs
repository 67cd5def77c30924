//! Composition root: owns the panels and sequences every fetch.
//!
//! Fetches run as spawned tasks and report back over a channel; results
//! are applied by whoever owns the [`Dashboard`], so panel and shared state
//! have a single writer. Each fetch stream has a [`RequestTracker`]: a new
//! request cancels the previous one and late answers are dropped.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    Config,
    background::{BackgroundId, select_background},
    clock::Clock,
    current::CurrentPanel,
    error::Result,
    forecast::{DEFAULT_BREAKPOINT_PX, ForecastChart, ForecastPanel},
    geolocation::Geolocator,
    map::{AnimationSettings, ForecastPrecipitation, MapPanel, PrecipitationSource},
    model::{Coordinates, ForecastSnapshot, WeatherSnapshot},
    provider::{Query, WeatherProvider},
    state::{RequestTracker, StateStore, Ticket},
};

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub search_debounce: Duration,
    pub narrow_breakpoint_px: u32,
    pub map_zoom: f64,
    pub animation: AnimationSettings,
    /// Searched when geolocation is unavailable.
    pub default_city: Option<String>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(500),
            narrow_breakpoint_px: DEFAULT_BREAKPOINT_PX,
            map_zoom: 2.0,
            animation: AnimationSettings::default(),
            default_city: None,
        }
    }
}

impl From<&Config> for DashboardSettings {
    fn from(config: &Config) -> Self {
        Self {
            search_debounce: config.search_debounce(),
            narrow_breakpoint_px: config.ui.narrow_breakpoint_px,
            map_zoom: config.map.zoom,
            animation: AnimationSettings {
                frame_interval: config.map_frame_interval(),
                hours_per_second: config.map_hours_per_second(),
            },
            default_city: config.location.default_city.clone(),
        }
    }
}

#[derive(Debug)]
pub enum DashboardEvent {
    Located(Result<Coordinates>),
    CurrentLoaded { ticket: Ticket, query: Query, result: Result<WeatherSnapshot> },
    ForecastLoaded { ticket: Ticket, coords: Coordinates, result: Result<ForecastSnapshot> },
}

#[derive(Debug)]
pub struct Dashboard {
    provider: Arc<dyn WeatherProvider>,
    clock: Arc<dyn Clock>,
    settings: DashboardSettings,
    state: StateStore,
    current: CurrentPanel,
    forecast: ForecastPanel,
    map: Option<MapPanel>,
    last_query: Option<Query>,
    forecast_coords: Option<Coordinates>,
    /// Set once any city search was issued; a later location fix is ignored.
    searched: bool,
    current_requests: RequestTracker,
    forecast_requests: RequestTracker,
    root: CancellationToken,
    tx: mpsc::UnboundedSender<DashboardEvent>,
    rx: mpsc::UnboundedReceiver<DashboardEvent>,
}

impl Dashboard {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        clock: Arc<dyn Clock>,
        settings: DashboardSettings,
    ) -> Self {
        let root = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            provider,
            clock,
            current: CurrentPanel::new(settings.search_debounce),
            forecast: ForecastPanel::new(settings.narrow_breakpoint_px),
            settings,
            state: StateStore::new(),
            map: None,
            last_query: None,
            forecast_coords: None,
            searched: false,
            current_requests: RequestTracker::new(root.clone()),
            forecast_requests: RequestTracker::new(root.clone()),
            root,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn current(&self) -> &CurrentPanel {
        &self.current
    }

    pub fn forecast(&self) -> &ForecastPanel {
        &self.forecast
    }

    pub fn forecast_chart(&self) -> Option<ForecastChart> {
        self.forecast.chart(self.clock.as_ref())
    }

    pub fn map(&self) -> Option<&MapPanel> {
        self.map.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// True while a current-conditions or forecast fetch is outstanding.
    pub fn is_busy(&self) -> bool {
        self.current_requests.is_pending() || self.forecast_requests.is_pending()
    }

    pub fn background(&self) -> BackgroundId {
        let state = self.state.snapshot();
        let text = self.current.snapshot().map(|s| s.current.condition.text.as_str());
        select_background(state.condition_code, state.is_day, text, self.clock.hour())
    }

    /// Kick off the one-shot location lookup.
    pub fn start(&self, geolocator: Arc<dyn Geolocator>) {
        let tx = self.tx.clone();
        let token = self.root.child_token();
        tokio::spawn(async move {
            let located = tokio::select! {
                _ = token.cancelled() => return,
                located = geolocator.locate() => located,
            };
            let _ = tx.send(DashboardEvent::Located(located));
        });
    }

    pub async fn next_event(&mut self) -> Option<DashboardEvent> {
        self.rx.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<DashboardEvent> {
        self.rx.try_recv().ok()
    }

    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Located(Ok(coords)) if self.searched => {
                debug!(%coords, "ignoring location, a city was already searched");
            }
            DashboardEvent::Located(Ok(coords)) => {
                info!(%coords, "location acquired");
                self.state.set_coords(coords);
                self.load_coords(coords);
            }
            DashboardEvent::Located(Err(err)) => {
                warn!(error = %err, "could not determine location");
                if let Some(city) = self.settings.default_city.clone() {
                    self.search(&city);
                }
            }
            DashboardEvent::CurrentLoaded { ticket, query, result } => {
                if !self.current_requests.complete(ticket) {
                    debug!(%query, "discarding stale current-conditions response");
                    return;
                }
                self.apply_current(query, result);
            }
            DashboardEvent::ForecastLoaded { ticket, coords, result } => {
                if !self.forecast_requests.complete(ticket) {
                    debug!(%coords, "discarding stale forecast response");
                    return;
                }
                match result {
                    Ok(forecast) => {
                        let source =
                            ForecastPrecipitation::from_forecast(&forecast, self.settings.map_zoom);
                        self.forecast.show(Arc::new(forecast));
                        self.mount_map(coords, Arc::new(source));
                    }
                    Err(err) => warn!(%coords, error = %err, "forecast fetch failed"),
                }
            }
        }
    }

    pub fn edit_query(&mut self, text: impl Into<String>, now: Instant) {
        self.current.edit_query(text, now);
    }

    /// Start the debounced search if typing has paused; true if one started.
    pub fn poll_debounce(&mut self, now: Instant) -> bool {
        match self.current.poll_debounce(now) {
            Some(query) => {
                self.search(&query);
                true
            }
            None => false,
        }
    }

    /// Abandon the query being typed without searching for it.
    pub fn cancel_search_edit(&mut self) {
        self.current.cancel_debounce();
    }

    /// Search for the typed query right away; true if one started.
    pub fn submit_search(&mut self) -> bool {
        match self.current.submit() {
            Some(query) => {
                self.search(&query);
                true
            }
            None => false,
        }
    }

    pub fn search(&mut self, city: &str) {
        info!(%city, "searching");
        self.searched = true;
        self.current.begin_search(city);
        self.fetch_current(Query::City(city.to_string()));
    }

    /// Re-fetch everything for the last query and current coordinates.
    pub fn refresh(&mut self) {
        match self.last_query.clone() {
            Some(Query::City(city)) => self.search(&city),
            Some(query @ Query::Coords(_)) => self.fetch_current(query),
            None => {}
        }
        if let Some(coords) = self.state.snapshot().coords {
            self.fetch_forecast(coords);
        }
    }

    /// Viewport width changed; true if the forecast window changed.
    pub fn resize(&mut self, width_px: u32) -> bool {
        self.forecast.resize(width_px)
    }

    pub fn pointer_moved(&self, point: Coordinates) {
        if let Some(map) = &self.map {
            map.pointer_moved(point);
        }
    }

    pub fn pointer_left(&self) {
        if let Some(map) = &self.map {
            map.pointer_left();
        }
    }

    /// Cancel every outstanding fetch and stop the map animation.
    pub fn shutdown(&mut self) {
        self.root.cancel();
        if let Some(map) = self.map.as_mut() {
            map.teardown();
        }
        debug!("dashboard shut down");
    }

    fn load_coords(&mut self, coords: Coordinates) {
        self.fetch_current(Query::Coords(coords));
        self.fetch_forecast(coords);
        self.mount_map(coords, Arc::new(ForecastPrecipitation::empty()));
    }

    fn apply_current(&mut self, query: Query, result: Result<WeatherSnapshot>) {
        match query {
            Query::City(city) => {
                let result = result.map(Arc::new);
                let found = result.as_ref().ok().cloned();
                self.current.finish_search(&city, result);

                if let Some(snapshot) = found {
                    self.last_query = Some(Query::City(city));
                    self.state.apply_weather(&snapshot);
                    let coords = snapshot.location.coordinates();
                    if self.forecast_coords != Some(coords) {
                        self.fetch_forecast(coords);
                        self.mount_map(coords, Arc::new(ForecastPrecipitation::empty()));
                    }
                }
            }
            Query::Coords(coords) => match result {
                Ok(snapshot) => {
                    self.last_query = Some(Query::Coords(coords));
                    let current = &snapshot.current;
                    self.state.set_condition(current.condition.code, current.is_day());
                    self.current.show(Arc::new(snapshot));
                }
                Err(err) => warn!(%coords, error = %err, "current conditions fetch failed"),
            },
        }
    }

    fn fetch_current(&mut self, query: Query) {
        let (ticket, token) = self.current_requests.issue();
        let provider = self.provider.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => {
                    debug!(%query, "current-conditions fetch cancelled");
                    return;
                }
                result = provider.current(&query) => result,
            };
            let _ = tx.send(DashboardEvent::CurrentLoaded { ticket, query, result });
        });
    }

    fn fetch_forecast(&mut self, coords: Coordinates) {
        self.forecast_coords = Some(coords);
        let (ticket, token) = self.forecast_requests.issue();
        let provider = self.provider.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => {
                    debug!(%coords, "forecast fetch cancelled");
                    return;
                }
                result = provider.forecast(coords) => result,
            };
            let _ = tx.send(DashboardEvent::ForecastLoaded { ticket, coords, result });
        });
    }

    fn mount_map(&mut self, center: Coordinates, source: Arc<dyn PrecipitationSource>) {
        if let Some(mut old) = self.map.take() {
            old.teardown();
        }
        self.map = Some(MapPanel::mount(
            center,
            self.settings.map_zoom,
            source,
            self.settings.animation,
            &self.root,
        ));
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
