//! Precipitation map: viewport, overlay data, and the animation task.
//!
//! The overlay animates through the forecast's time range. Each frame
//! samples precipitation under the last-known pointer position and is
//! published on a watch channel. The task stops when its
//! [`AnimationHandle`] is stopped or dropped.

use chrono::{DateTime, Local, Utc};
use std::{fmt::Debug, sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::model::{Coordinates, ForecastSnapshot};

/// Precipitation overlay data.
pub trait PrecipitationSource: Send + Sync + Debug {
    /// First and last instant the overlay has data for.
    fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)>;

    /// Precipitation in mm at `point` and time `at`, if known.
    fn pick_at(&self, point: Coordinates, at: DateTime<Utc>) -> Option<f64>;
}

/// Overlay built from the hourly precipitation of a point forecast.
///
/// Values are defined within `radius_deg` of the forecast location and
/// interpolated linearly between hours.
#[derive(Debug, Clone, Default)]
pub struct ForecastPrecipitation {
    center: Option<Coordinates>,
    radius_deg: f64,
    frames: Vec<(i64, f64)>,
}

impl ForecastPrecipitation {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_forecast(forecast: &ForecastSnapshot, zoom: f64) -> Self {
        let mut frames: Vec<(i64, f64)> = forecast
            .forecast
            .forecastday
            .iter()
            .flat_map(|day| day.hour.iter())
            .map(|hour| (hour.time_epoch, hour.precip_mm))
            .collect();
        frames.sort_by_key(|(t, _)| *t);

        Self {
            center: Some(forecast.location.coordinates()),
            radius_deg: 45.0 / 2f64.powf(zoom),
            frames,
        }
    }
}

impl PrecipitationSource for ForecastPrecipitation {
    fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (first, _) = self.frames.first()?;
        let (last, _) = self.frames.last()?;
        Some((DateTime::from_timestamp(*first, 0)?, DateTime::from_timestamp(*last, 0)?))
    }

    fn pick_at(&self, point: Coordinates, at: DateTime<Utc>) -> Option<f64> {
        let center = self.center?;
        let distance = (point.lat - center.lat).hypot(point.lon - center.lon);
        if distance > self.radius_deg {
            return None;
        }

        let t = at.timestamp();
        let next = self.frames.iter().position(|(ft, _)| *ft >= t)?;
        let (t1, v1) = self.frames[next];
        if t1 == t || next == 0 {
            return (t1 == t).then_some(v1);
        }

        let (t0, v0) = self.frames[next - 1];
        let ratio = (t - t0) as f64 / (t1 - t0) as f64;
        Some(v0 + (v1 - v0) * ratio)
    }
}

/// Geographic bounds shown for a center and zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl MapViewport {
    /// Zoom 1 shows the whole world; each level halves the span.
    pub fn new(center: Coordinates, zoom: f64) -> Self {
        let half_lon = (180.0 / 2f64.powf((zoom - 1.0).max(0.0))).min(180.0);
        let half_lat = (half_lon / 2.0).min(90.0);

        let lon = center.lon.clamp(-180.0 + half_lon, 180.0 - half_lon);
        let lat = center.lat.clamp(-90.0 + half_lat, 90.0 - half_lat);

        Self {
            west: lon - half_lon,
            east: lon + half_lon,
            south: lat - half_lat,
            north: lat + half_lat,
        }
    }

    /// Map a position inside the drawn area to coordinates; `x` and `y`
    /// run 0..=1 from the top-left corner.
    pub fn point_at(&self, x: f64, y: f64) -> Coordinates {
        let x = x.clamp(0.0, 1.0);
        let y = y.clamp(0.0, 1.0);
        Coordinates::new(
            self.north - (self.north - self.south) * y,
            self.west + (self.east - self.west) * x,
        )
    }
}

/// What the map panel shows for one animation frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapFrame {
    pub animation_time: Option<DateTime<Utc>>,
    pub pointer: Option<Coordinates>,
    pub sample_mm: Option<f64>,
}

impl MapFrame {
    pub fn sample_label(&self) -> String {
        self.sample_mm.map(|v| format!("{v:.1} mm")).unwrap_or_default()
    }

    pub fn time_label(&self) -> String {
        self.animation_time
            .map(|t| t.with_timezone(&Local).format("%a %b %d %Y %H:%M").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnimationSettings {
    pub frame_interval: Duration,
    pub hours_per_second: f64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self { frame_interval: Duration::from_millis(100), hours_per_second: 1.0 }
    }
}

/// Position in the overlay's time range after `elapsed`, wrapping at the end.
fn animation_time(
    range: (DateTime<Utc>, DateTime<Utc>),
    hours_per_second: f64,
    elapsed: Duration,
) -> DateTime<Utc> {
    let (start, end) = range;
    let span = (end - start).num_seconds();
    if span <= 0 {
        return start;
    }
    let offset = (elapsed.as_secs_f64() * hours_per_second * 3600.0) as i64 % (span + 1);
    start + chrono::Duration::seconds(offset)
}

/// Stop handle for a running animation task.
#[derive(Debug)]
pub struct AnimationHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AnimationHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawn the frame loop. Must be called inside a tokio runtime.
pub fn spawn_animation(
    source: Arc<dyn PrecipitationSource>,
    settings: AnimationSettings,
    pointer: watch::Receiver<Option<Coordinates>>,
    frames: Arc<watch::Sender<MapFrame>>,
    token: CancellationToken,
) -> AnimationHandle {
    let task = tokio::spawn({
        let token = token.clone();
        async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(settings.frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let at = source.time_range().map(|range| {
                            animation_time(range, settings.hours_per_second, started.elapsed())
                        });
                        let pointer = *pointer.borrow();
                        let sample_mm = pointer.zip(at).and_then(|(p, t)| source.pick_at(p, t));
                        frames.send_replace(MapFrame { animation_time: at, pointer, sample_mm });
                    }
                }
            }
            debug!("map animation stopped");
        }
    });

    AnimationHandle { token, task: Some(task) }
}

/// A mounted map centered on one location.
#[derive(Debug)]
pub struct MapPanel {
    center: Coordinates,
    zoom: f64,
    pointer: watch::Sender<Option<Coordinates>>,
    frames: Arc<watch::Sender<MapFrame>>,
    handle: Option<AnimationHandle>,
}

impl MapPanel {
    /// Center the map and start animating `source`. `parent` cancels the
    /// animation along with everything else on shutdown.
    pub fn mount(
        center: Coordinates,
        zoom: f64,
        source: Arc<dyn PrecipitationSource>,
        settings: AnimationSettings,
        parent: &CancellationToken,
    ) -> Self {
        let (pointer, pointer_rx) = watch::channel(None);
        let (frames, _) = watch::channel(MapFrame::default());
        let frames = Arc::new(frames);

        let handle =
            spawn_animation(source, settings, pointer_rx, frames.clone(), parent.child_token());
        debug!(%center, zoom, "map mounted");

        Self { center, zoom, pointer, frames, handle: Some(handle) }
    }

    pub fn center(&self) -> Coordinates {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn viewport(&self) -> MapViewport {
        MapViewport::new(self.center, self.zoom)
    }

    /// Latest frame published by the animation.
    pub fn frame(&self) -> MapFrame {
        self.frames.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MapFrame> {
        self.frames.subscribe()
    }

    pub fn pointer_moved(&self, point: Coordinates) {
        self.pointer.send_replace(Some(point));
    }

    /// Forget the pointer and clear the shown sample right away.
    pub fn pointer_left(&self) {
        self.pointer.send_replace(None);
        self.frames.send_modify(|frame| {
            frame.pointer = None;
            frame.sample_mm = None;
        });
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_stopped())
    }

    /// Stop the animation; the panel keeps its last frame.
    pub fn teardown(&mut self) -> Option<AnimationHandle> {
        let handle = self.handle.take()?;
        handle.stop();
        debug!(center = %self.center, "map torn down");
        Some(handle)
    }
}

impl Drop for MapPanel {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, Forecast, ForecastDay, HourEntry, Location};

    const T0: i64 = 1_714_521_600;

    fn forecast(precip: &[f64]) -> ForecastSnapshot {
        let hour = precip
            .iter()
            .enumerate()
            .map(|(i, mm)| HourEntry {
                time_epoch: T0 + i as i64 * 3600,
                time: format!("2024-05-01 {i:02}:00"),
                temp_c: 12.0,
                humidity: 90,
                wind_kph: 10.0,
                precip_mm: *mm,
                is_day: 1,
                condition: Condition { text: "Light rain".into(), icon: String::new(), code: 1183 },
            })
            .collect();

        ForecastSnapshot {
            location: Location {
                name: "Bergen".into(),
                region: String::new(),
                country: "Norway".into(),
                lat: 60.39,
                lon: 5.32,
                tz_id: String::new(),
                localtime_epoch: None,
                localtime: String::new(),
            },
            forecast: Forecast {
                forecastday: vec![ForecastDay { date: "2024-05-01".into(), hour }],
            },
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(T0 + secs, 0).unwrap()
    }

    #[test]
    fn interpolates_between_hours() {
        let source = ForecastPrecipitation::from_forecast(&forecast(&[0.0, 2.0, 1.0]), 2.0);
        let here = Coordinates::new(60.39, 5.32);

        assert_eq!(source.pick_at(here, at(0)), Some(0.0));
        assert_eq!(source.pick_at(here, at(1800)), Some(1.0));
        assert_eq!(source.pick_at(here, at(3600)), Some(2.0));
        assert_eq!(source.pick_at(here, at(5400)), Some(1.5));
        assert_eq!(source.pick_at(here, at(-1)), None);
        assert_eq!(source.pick_at(here, at(3 * 3600)), None);
    }

    #[test]
    fn nothing_far_from_the_forecast_point() {
        let source = ForecastPrecipitation::from_forecast(&forecast(&[1.0, 1.0]), 2.0);
        assert_eq!(source.pick_at(Coordinates::new(-33.9, 151.2), at(0)), None);
        assert_eq!(ForecastPrecipitation::empty().time_range(), None);
    }

    #[test]
    fn animation_wraps_at_end_of_range() {
        let range = (at(0), at(3 * 3600));
        assert_eq!(animation_time(range, 1.0, Duration::from_secs(2)), at(2 * 3600));
        assert_eq!(animation_time(range, 1.0, Duration::from_secs(4)), at(3599));
        assert_eq!(animation_time((at(0), at(0)), 1.0, Duration::from_secs(9)), at(0));
    }

    #[test]
    fn viewport_maps_corners_and_clamps_to_world() {
        let viewport = MapViewport::new(Coordinates::new(0.0, 0.0), 2.0);
        assert_eq!(viewport.west, -90.0);
        assert_eq!(viewport.north, 45.0);
        assert_eq!(viewport.point_at(0.5, 0.5), Coordinates::new(0.0, 0.0));
        assert_eq!(viewport.point_at(0.0, 0.0), Coordinates::new(45.0, -90.0));

        let edge = MapViewport::new(Coordinates::new(80.0, 170.0), 2.0);
        assert_eq!(edge.east, 180.0);
        assert_eq!(edge.north, 90.0);
    }

    #[test]
    fn frame_labels() {
        let frame = MapFrame { animation_time: None, pointer: None, sample_mm: Some(1.26) };
        assert_eq!(frame.sample_label(), "1.3 mm");
        assert_eq!(MapFrame::default().sample_label(), "");
        assert_eq!(MapFrame::default().time_label(), "");
    }

    #[tokio::test]
    async fn animation_samples_pointer_and_stops_on_teardown() {
        let source =
            Arc::new(ForecastPrecipitation::from_forecast(&forecast(&[3.0, 3.0, 3.0]), 2.0));
        let settings = AnimationSettings {
            frame_interval: Duration::from_millis(5),
            hours_per_second: 1.0,
        };
        let root = CancellationToken::new();

        let mut panel =
            MapPanel::mount(Coordinates::new(60.39, 5.32), 2.0, source, settings, &root);
        let mut frames = panel.subscribe();
        panel.pointer_moved(Coordinates::new(60.0, 5.0));

        let frame = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                frames.changed().await.unwrap();
                let frame = frames.borrow_and_update().clone();
                if frame.sample_mm.is_some() {
                    return frame;
                }
            }
        })
        .await
        .expect("animation should publish a sampled frame");

        assert_eq!(frame.sample_mm, Some(3.0));
        assert!(frame.animation_time.is_some());

        panel.pointer_left();
        assert_eq!(panel.frame().sample_mm, None);

        assert!(panel.is_running());
        let handle = panel.teardown().unwrap();
        assert!(!panel.is_running());
        tokio::time::timeout(Duration::from_secs(2), handle.shutdown())
            .await
            .expect("animation task should exit after teardown");
    }

    #[tokio::test]
    async fn root_cancellation_stops_animation() {
        let root = CancellationToken::new();
        let panel = MapPanel::mount(
            Coordinates::new(0.0, 0.0),
            2.0,
            Arc::new(ForecastPrecipitation::empty()),
            AnimationSettings::default(),
            &root,
        );

        root.cancel();

        assert!(!panel.is_running());
    }
}
