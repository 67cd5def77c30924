//! Current-conditions panel: latest snapshot plus the city search box.

use chrono::NaiveDateTime;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::debug;

use crate::{
    debounce::Debouncer,
    error::{Error, Result},
    model::WeatherSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    Idle,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug)]
pub struct CurrentPanel {
    status: PanelStatus,
    snapshot: Option<Arc<WeatherSnapshot>>,
    query: String,
    last_submitted: Option<String>,
    error: Option<String>,
    debouncer: Debouncer,
}

impl CurrentPanel {
    pub fn new(debounce: Duration) -> Self {
        Self {
            status: PanelStatus::Idle,
            snapshot: None,
            query: String::new(),
            last_submitted: None,
            error: None,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn status(&self) -> PanelStatus {
        self.status
    }

    pub fn snapshot(&self) -> Option<&Arc<WeatherSnapshot>> {
        self.snapshot.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Inline message from the last failed search.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Display a snapshot that arrived from elsewhere (e.g. the initial fetch).
    pub fn show(&mut self, snapshot: Arc<WeatherSnapshot>) {
        self.snapshot = Some(snapshot);
        self.status = PanelStatus::Loaded;
        self.error = None;
    }

    /// Replace the search text and restart the debounce timer.
    pub fn edit_query(&mut self, text: impl Into<String>, now: Instant) {
        self.query = text.into();
        self.debouncer.touch(now);
    }

    /// Query to search for once typing has paused, if any.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<String> {
        if !self.debouncer.poll(now) {
            return None;
        }
        let query = self.query.trim();
        if query.is_empty() || self.last_submitted.as_deref() == Some(query) {
            return None;
        }
        Some(query.to_string())
    }

    /// Drop a pending debounced search; the typed text stays.
    pub fn cancel_debounce(&mut self) {
        self.debouncer.cancel();
    }

    /// Query to search for right away (Enter), if non-empty.
    pub fn submit(&mut self) -> Option<String> {
        self.debouncer.cancel();
        let query = self.query.trim();
        (!query.is_empty()).then(|| query.to_string())
    }

    pub fn begin_search(&mut self, query: &str) {
        self.status = PanelStatus::Loading;
        self.error = None;
        self.last_submitted = Some(query.to_string());
    }

    /// Apply a search result. On failure the previous snapshot stays.
    pub fn finish_search(&mut self, query: &str, result: Result<Arc<WeatherSnapshot>>) {
        match result {
            Ok(snapshot) => self.show(snapshot),
            Err(err) => {
                debug!(%query, error = %err, "search failed");
                self.status = PanelStatus::Error;
                self.error = Some(format!("City not found: {query}"));
            }
        }
    }

    /// Heading for the panel.
    pub fn title(&self) -> &str {
        match (&self.status, &self.snapshot) {
            (PanelStatus::Loading, _) | (_, None) => "Loading...",
            (_, Some(snapshot)) => &snapshot.location.name,
        }
    }

    /// Location-local date, e.g. `Wednesday | 1 May 2024`.
    pub fn formatted_date(&self) -> Option<String> {
        let snapshot = self.snapshot.as_ref()?;
        format_local_date(&snapshot.location.localtime)
            .inspect_err(|e| debug!(error = %e, "not rendering local date"))
            .ok()
    }
}

pub fn format_local_date(localtime: &str) -> Result<String> {
    let at = NaiveDateTime::parse_from_str(localtime.trim(), "%Y-%m-%d %H:%M")
        .map_err(|_| Error::LocalTimeParse(localtime.to_string()))?;
    Ok(at.format("%A | %-d %B %Y").to_string())
}
