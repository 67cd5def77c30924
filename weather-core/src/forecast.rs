//! Hourly forecast window and chart data.

use chrono::{NaiveDateTime, Timelike};
use std::{ops::Range, sync::Arc};

use crate::{
    clock::Clock,
    model::{ForecastSnapshot, HourEntry},
};

pub const NARROW_WINDOW: usize = 4;
pub const WIDE_WINDOW: usize = 10;
pub const DEFAULT_BREAKPOINT_PX: u32 = 786;

const HOUR_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Number of hours after "now" to show for a given viewport width.
pub fn window_len(width_px: u32, breakpoint_px: u32) -> usize {
    if width_px < breakpoint_px { NARROW_WINDOW } else { WIDE_WINDOW }
}

/// Index of the first entry whose local hour is `hour`, or -1.
pub fn current_hour_index(hours: &[HourEntry], hour: u32) -> i32 {
    hours
        .iter()
        .position(|entry| {
            NaiveDateTime::parse_from_str(&entry.time, HOUR_FORMAT)
                .is_ok_and(|t| t.hour() == hour)
        })
        .map_or(-1, |i| i as i32)
}

/// Indices to display: one hour before `index` through `n` hours after,
/// clamped to `0..len`.
pub fn display_window(len: usize, index: i32, n: usize) -> Range<usize> {
    if len == 0 {
        return 0..0;
    }

    let start = (index - 1).max(0);
    let end = (index + n as i32).min(len as i32 - 1);
    if end < start {
        return start as usize..start as usize;
    }

    start as usize..end as usize + 1
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// `HH:MM`
    pub label: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub icon: String,
    pub condition_code: u16,
    pub is_day: bool,
}

impl From<&HourEntry> for ChartPoint {
    fn from(hour: &HourEntry) -> Self {
        Self {
            label: hour.time_of_day().to_string(),
            temperature: hour.temp_c,
            humidity: f64::from(hour.humidity),
            wind_speed: hour.wind_kph,
            icon: hour.condition.icon_url(),
            condition_code: hour.condition.code,
            is_day: hour.is_day == 1,
        }
    }
}

/// Points for the three chart series; doubles as the icon strip.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastChart {
    pub points: Vec<ChartPoint>,
}

impl ForecastChart {
    pub fn build(hours: &[HourEntry], hour: u32, n: usize) -> Self {
        let index = current_hour_index(hours, hour);
        let window = display_window(hours.len(), index, n);
        Self { points: hours[window].iter().map(ChartPoint::from).collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest and largest value across all series, for a shared y axis.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .flat_map(|p| [p.temperature, p.humidity, p.wind_speed])
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[derive(Debug)]
pub struct ForecastPanel {
    snapshot: Option<Arc<ForecastSnapshot>>,
    breakpoint_px: u32,
    window: usize,
}

impl ForecastPanel {
    pub fn new(breakpoint_px: u32) -> Self {
        Self { snapshot: None, breakpoint_px, window: WIDE_WINDOW }
    }

    /// Re-evaluate the window on a viewport change; true if it changed.
    pub fn resize(&mut self, width_px: u32) -> bool {
        let window = window_len(width_px, self.breakpoint_px);
        let changed = window != self.window;
        self.window = window;
        changed
    }

    pub fn window_len(&self) -> usize {
        self.window
    }

    pub fn show(&mut self, snapshot: Arc<ForecastSnapshot>) {
        self.snapshot = Some(snapshot);
    }

    pub fn snapshot(&self) -> Option<&Arc<ForecastSnapshot>> {
        self.snapshot.as_ref()
    }

    /// `None` until a forecast has loaded.
    pub fn chart(&self, clock: &dyn Clock) -> Option<ForecastChart> {
        let snapshot = self.snapshot.as_ref()?;
        Some(ForecastChart::build(snapshot.first_day_hours(), clock.hour(), self.window))
    }
}
