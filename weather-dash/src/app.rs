use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tracing::debug;
use weather_core::{Coordinates, Dashboard};

use crate::{terminal::Term, ui};

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Dashboard,
    Search,
}

#[derive(Debug)]
pub struct App {
    pub dashboard: Dashboard,
    pub focus: Focus,
    /// Text in the search box.
    pub input: String,
    /// Inner area of the map canvas from the last draw.
    pub map_area: Option<Rect>,
    pub running: bool,
    cell_width_px: u16,
    pointer_on_map: bool,
}

impl App {
    pub fn new(dashboard: Dashboard, cell_width_px: u16) -> Self {
        Self {
            dashboard,
            focus: Focus::Dashboard,
            input: String::new(),
            map_area: None,
            running: true,
            cell_width_px: cell_width_px.max(1),
            pointer_on_map: false,
        }
    }

    pub async fn run(&mut self, terminal: &mut Term) -> anyhow::Result<()> {
        let size = terminal.size().context("Failed to read terminal size")?;
        self.resize(size.width);

        while self.running {
            self.tick(Instant::now());
            terminal.draw(|f| ui::draw(f, self)).context("Terminal draw error")?;

            if event::poll(EVENT_POLL_TIMEOUT)? {
                let event = event::read()?;
                self.handle_event(event, Instant::now());
            }
            tokio::task::yield_now().await;
        }

        self.dashboard.shutdown();
        Ok(())
    }

    /// Apply finished fetches and fire a pending debounced search.
    pub fn tick(&mut self, now: Instant) {
        while let Some(event) = self.dashboard.try_next_event() {
            self.dashboard.apply(event);
        }
        self.dashboard.poll_debounce(now);
    }

    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, _) => self.resize(cols),
            _ => {}
        }
    }

    pub fn resize(&mut self, cols: u16) {
        let width_px = u32::from(cols) * u32::from(self.cell_width_px);
        if self.dashboard.resize(width_px) {
            debug!(cols, width_px, "forecast window changed");
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        match self.focus {
            Focus::Search => match key.code {
                KeyCode::Esc => {
                    self.dashboard.cancel_search_edit();
                    self.focus = Focus::Dashboard;
                }
                KeyCode::Enter => {
                    self.dashboard.submit_search();
                    self.focus = Focus::Dashboard;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    self.dashboard.edit_query(self.input.clone(), now);
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    self.dashboard.edit_query(self.input.clone(), now);
                }
                _ => {}
            },
            Focus::Dashboard => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('/' | 's') => {
                    self.input = self.dashboard.current().query().to_string();
                    self.focus = Focus::Search;
                }
                KeyCode::Char('r') => self.dashboard.refresh(),
                _ => {}
            },
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
            return;
        }

        match self.map_point(mouse.column, mouse.row) {
            Some(point) => {
                self.pointer_on_map = true;
                self.dashboard.pointer_moved(point);
            }
            None if self.pointer_on_map => {
                self.pointer_on_map = false;
                self.dashboard.pointer_left();
            }
            None => {}
        }
    }

    fn map_point(&self, col: u16, row: u16) -> Option<Coordinates> {
        let (x, y) = pointer_fraction(self.map_area?, col, row)?;
        Some(self.dashboard.map()?.viewport().point_at(x, y))
    }
}

/// Position of a cell inside `area` as fractions from the top-left corner,
/// measured at the cell's center.
pub fn pointer_fraction(area: Rect, col: u16, row: u16) -> Option<(f64, f64)> {
    let inside = col >= area.x
        && row >= area.y
        && col < area.x.saturating_add(area.width)
        && row < area.y.saturating_add(area.height);
    if !inside {
        return None;
    }

    let x = (f64::from(col - area.x) + 0.5) / f64::from(area.width);
    let y = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use weather_core::{
        DashboardSettings, FixedClock, current::PanelStatus,
        provider::weatherapi::WeatherApiProvider,
    };

    fn app() -> App {
        let provider = Arc::new(WeatherApiProvider::new("http://127.0.0.1:9", "KEY".into()));
        let clock = Arc::new(FixedClock::at(12, 0));
        let dashboard = Dashboard::new(provider, clock, DashboardSettings::default());
        App::new(dashboard, 8)
    }

    fn press(app: &mut App, code: KeyCode) {
        press_at(app, code, Instant::now());
    }

    fn press_at(app: &mut App, code: KeyCode, now: Instant) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        app.handle_event(Event::Key(key), now);
    }

    #[test]
    fn typing_edits_the_search_query() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.focus, Focus::Search);

        for c in "Parisx".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "Paris");
        assert_eq!(app.dashboard.current().query(), "Paris");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::Dashboard);
        assert!(app.running);
    }

    #[tokio::test]
    async fn enter_searches_immediately() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        for c in "Oslo".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.focus, Focus::Dashboard);
        assert_eq!(app.dashboard.current().status(), PanelStatus::Loading);
        app.dashboard.shutdown();
    }

    #[test]
    fn esc_abandons_typed_query() {
        let mut app = app();
        let start = Instant::now();
        press(&mut app, KeyCode::Char('/'));
        for c in "Osl".chars() {
            press_at(&mut app, KeyCode::Char(c), start);
        }
        press(&mut app, KeyCode::Esc);

        app.tick(start + Duration::from_millis(600));
        assert_eq!(app.focus, Focus::Dashboard);
        assert_eq!(app.dashboard.current().status(), PanelStatus::Idle);
    }

    #[tokio::test]
    async fn paused_typing_searches_after_debounce() {
        let mut app = app();
        let start = Instant::now();
        press(&mut app, KeyCode::Char('/'));
        for c in "Oslo".chars() {
            press_at(&mut app, KeyCode::Char(c), start);
        }

        app.tick(start + Duration::from_millis(600));
        assert_eq!(app.dashboard.current().status(), PanelStatus::Loading);
        app.dashboard.shutdown();
    }

    #[test]
    fn q_quits_outside_search_only() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert_eq!(app.input, "q");

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn ctrl_c_quits_while_searching() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        app.handle_event(Event::Key(key), Instant::now());
        assert!(!app.running);
    }

    #[test]
    fn terminal_width_drives_forecast_window() {
        let mut app = app();
        app.handle_event(Event::Resize(80, 24), Instant::now());
        assert_eq!(app.dashboard.forecast().window_len(), 4);
        app.handle_event(Event::Resize(120, 40), Instant::now());
        assert_eq!(app.dashboard.forecast().window_len(), 10);
    }

    #[test]
    fn pointer_fraction_inside_and_outside() {
        let area = Rect::new(10, 5, 20, 10);
        assert_eq!(pointer_fraction(area, 10, 5), Some((0.025, 0.05)));
        assert_eq!(pointer_fraction(area, 29, 14), Some((0.975, 0.95)));
        assert_eq!(pointer_fraction(area, 30, 5), None);
        assert_eq!(pointer_fraction(area, 9, 7), None);
    }
}
