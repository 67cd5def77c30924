//! Session-wide location and condition state.
//!
//! Writers go through [`StateStore`]'s update functions; readers take a
//! snapshot or subscribe. Last writer wins: panels that can race discard
//! stale responses with [`RequestTracker`] before writing here.

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::model::{Coordinates, WeatherSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SharedState {
    /// `0` until the first weather snapshot lands.
    pub condition_code: u16,
    pub is_day: bool,
    pub coords: Option<Coordinates>,
}

#[derive(Debug, Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<SharedState>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SharedState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> SharedState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SharedState> {
        self.tx.subscribe()
    }

    pub fn set_condition(&self, code: u16, is_day: bool) {
        self.update(|s| {
            s.condition_code = code;
            s.is_day = is_day;
        });
    }

    pub fn set_coords(&self, coords: Coordinates) {
        self.update(|s| s.coords = Some(coords));
    }

    /// Take code, day flag and coordinates from a fresh snapshot in one write.
    pub fn apply_weather(&self, snapshot: &WeatherSnapshot) {
        let coords = snapshot.location.coordinates();
        self.update(|s| {
            s.condition_code = snapshot.current.condition.code;
            s.is_day = snapshot.current.is_day();
            s.coords = Some(coords);
        });
    }

    fn update(&self, f: impl FnOnce(&mut SharedState)) {
        self.tx.send_if_modified(|state| {
            let before = *state;
            f(state);
            before != *state
        });
    }
}

/// Sequence number handed to each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Issues tickets and cancellation tokens for one stream of requests.
///
/// Issuing a new ticket cancels the previous request's token; only the
/// latest ticket is current.
#[derive(Debug)]
pub struct RequestTracker {
    parent: CancellationToken,
    latest: u64,
    inflight: Option<CancellationToken>,
}

impl RequestTracker {
    pub fn new(parent: CancellationToken) -> Self {
        Self { parent, latest: 0, inflight: None }
    }

    pub fn issue(&mut self) -> (Ticket, CancellationToken) {
        self.cancel();
        self.latest += 1;
        let token = self.parent.child_token();
        self.inflight = Some(token.clone());
        (Ticket(self.latest), token)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Mark `ticket` as answered; returns false for stale tickets.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.inflight = None;
        true
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.inflight.take() {
            token.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inflight.is_some()
    }
}
