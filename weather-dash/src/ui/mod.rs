//! Rendering. Everything here reads from [`App`]; the only write is the
//! area the map canvas was drawn into.

mod current;
mod forecast;
mod map;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::app::{App, Focus};
use theme::Theme;

/// Below this many columns the forecast and map are stacked.
const STACK_BELOW_COLS: u16 = 100;

pub fn draw(f: &mut Frame<'_>, app: &mut App) {
    let background = app.dashboard.background();
    let theme = Theme::for_background(background);
    let area = f.area();
    f.render_widget(Block::default().style(theme.base()), area);

    let [header, body, footer] =
        Layout::vertical([Constraint::Length(9), Constraint::Min(8), Constraint::Length(1)])
            .areas(area);

    current::render(f, header, app, &theme);

    let [chart_area, map_area] = if area.width < STACK_BELOW_COLS {
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(body)
    } else {
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(body)
    };

    forecast::render(f, chart_area, app.dashboard.forecast_chart(), &theme);
    app.map_area = map::render(f, map_area, app.dashboard.map(), &theme);

    render_footer(f, footer, app, &theme);
}

fn render_footer(f: &mut Frame<'_>, area: Rect, app: &App, theme: &Theme) {
    let keys = match app.focus {
        Focus::Search => "Enter search · Esc cancel",
        Focus::Dashboard => "/ search · r refresh · q quit",
    };
    let mut spans = vec![Span::styled(keys, Style::new().fg(theme.muted))];
    if app.dashboard.is_busy() {
        spans.push(Span::styled("  loading...", theme.accent()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(theme.base()), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;
    use weather_core::{
        Dashboard, DashboardSettings, FixedClock, provider::weatherapi::WeatherApiProvider,
    };

    fn app() -> App {
        let provider = Arc::new(WeatherApiProvider::new("http://127.0.0.1:9", "KEY".into()));
        let clock = Arc::new(FixedClock::at(22, 0));
        let dashboard = Dashboard::new(provider, clock, DashboardSettings::default());
        App::new(dashboard, 8)
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn empty_dashboard_shows_placeholders() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("Loading..."));
        assert!(text.contains("Waiting for forecast..."));
        assert!(text.contains("Waiting for location..."));
        assert!(text.contains("q quit"));
        assert!(app.map_area.is_none());
    }

    #[test]
    fn search_focus_shows_input() {
        let mut app = app();
        app.focus = Focus::Search;
        app.input = "Reykjavik".into();
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("Reykjavik"));
        assert!(text.contains("Esc cancel"));
    }
}
