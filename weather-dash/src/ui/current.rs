use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use weather_core::current::PanelStatus;

use super::theme::Theme;
use crate::app::{App, Focus};

pub fn render(f: &mut Frame<'_>, area: Rect, app: &App, theme: &Theme) {
    let scenery_width = theme.scenery.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let [info, scenery] =
        Layout::horizontal([Constraint::Min(30), Constraint::Length(scenery_width + 2)])
            .areas(area);
    let [details, search] =
        Layout::vertical([Constraint::Min(5), Constraint::Length(3)]).areas(info);

    render_details(f, details, app, theme);
    render_search(f, search, app, theme);

    let art: Vec<Line<'_>> =
        theme.scenery.iter().map(|l| Line::styled(*l, theme.accent())).collect();
    f.render_widget(Paragraph::new(art).style(theme.base()), scenery);
}

fn render_details(f: &mut Frame<'_>, area: Rect, app: &App, theme: &Theme) {
    let panel = app.dashboard.current();
    let mut lines = vec![Line::from(Span::styled(
        panel.title().to_string(),
        theme.accent().add_modifier(Modifier::BOLD),
    ))];

    if let Some(date) = panel.formatted_date() {
        lines.push(Line::raw(date));
    }

    if let Some(snapshot) = panel.snapshot() {
        let now = &snapshot.current;
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:.1}°C ", now.temp_c),
                Style::new().add_modifier(Modifier::BOLD),
            ),
            Span::raw(now.condition.text.clone()),
        ]));
        lines.push(Line::raw(format!(
            "Feels like {:.1}°C · Wind {:.1} km/h {} · Humidity {}%",
            now.feelslike_c, now.wind_kph, now.wind_dir, now.humidity
        )));
    }

    if let (PanelStatus::Error, Some(message)) = (panel.status(), panel.error()) {
        lines.push(Line::styled(message.to_string(), Style::new().light_red()));
    }

    let block = Block::default().borders(Borders::NONE).style(theme.base());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_search(f: &mut Frame<'_>, area: Rect, app: &App, theme: &Theme) {
    let editing = app.focus == Focus::Search;
    let border = if editing { theme.accent() } else { Style::new().fg(theme.muted) };

    let content = if editing {
        Line::from(vec![Span::raw(app.input.clone()), Span::styled("█", theme.accent())])
    } else if app.dashboard.current().status() == PanelStatus::Loading {
        Line::styled("Searching...", Style::new().fg(theme.muted))
    } else {
        Line::styled("Press / to search for a city", Style::new().fg(theme.muted))
    };

    let block = Block::bordered().title(" City ").border_style(border).style(theme.base());
    f.render_widget(Paragraph::new(content).block(block), area);
}
