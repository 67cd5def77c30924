use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph},
};
use weather_core::forecast::{ChartPoint, ForecastChart};

use super::theme::{Theme, condition_glyph};

const TEMPERATURE: Color = Color::LightRed;
const HUMIDITY: Color = Color::LightCyan;
const WIND: Color = Color::LightGreen;

pub fn render(f: &mut Frame<'_>, area: Rect, chart: Option<ForecastChart>, theme: &Theme) {
    let block = Block::bordered()
        .title(" Forecast ")
        .border_style(Style::new().fg(theme.muted))
        .style(theme.base());

    let Some(chart) = chart.filter(|c| !c.is_empty()) else {
        let waiting = Paragraph::new("Waiting for forecast...")
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(waiting, area);
        return;
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let [plot, icons] = Layout::vertical([Constraint::Min(5), Constraint::Length(1)]).areas(inner);
    render_chart(f, plot, &chart, theme);
    render_icons(f, icons, &chart, theme);
}

fn series(chart: &ForecastChart, value: impl Fn(&ChartPoint) -> f64) -> Vec<(f64, f64)> {
    chart.points.iter().enumerate().map(|(i, p)| (i as f64, value(p))).collect()
}

fn render_chart(f: &mut Frame<'_>, area: Rect, chart: &ForecastChart, theme: &Theme) {
    let temperature = series(chart, |p| p.temperature);
    let humidity = series(chart, |p| p.humidity);
    let wind = series(chart, |p| p.wind_speed);

    let datasets = vec![
        Dataset::default()
            .name("Temperature °C")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::new().fg(TEMPERATURE))
            .data(&temperature),
        Dataset::default()
            .name("Humidity %")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::new().fg(HUMIDITY))
            .data(&humidity),
        Dataset::default()
            .name("Wind km/h")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::new().fg(WIND))
            .data(&wind),
    ];

    let (low, high) = chart.value_bounds().unwrap_or((0.0, 100.0));
    let (low, high) = (low.min(0.0).floor(), high.max(low + 1.0).ceil());
    let last = chart.points.len().saturating_sub(1).max(1) as f64;

    let first_label = chart.points.first().map(|p| p.label.clone()).unwrap_or_default();
    let last_label = chart.points.last().map(|p| p.label.clone()).unwrap_or_default();

    let axis_style = Style::new().fg(theme.muted);
    let plot = Chart::new(datasets)
        .style(theme.base())
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, last])
                .labels([Span::raw(first_label), Span::raw(last_label)]),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([low, high])
                .labels([Span::raw(format!("{low:.0}")), Span::raw(format!("{high:.0}"))]),
        );

    f.render_widget(plot, area);
}

/// One glyph and hour label per point, spread across the width.
fn render_icons(f: &mut Frame<'_>, area: Rect, chart: &ForecastChart, theme: &Theme) {
    let constraints = vec![Constraint::Ratio(1, chart.points.len() as u32); chart.points.len()];
    let cells = Layout::horizontal(constraints).split(area);

    for (cell, point) in cells.iter().zip(&chart.points) {
        let label = if cell.width >= 8 {
            format!("{} {}", condition_glyph(point.condition_code, point.is_day), point.label)
        } else {
            condition_glyph(point.condition_code, point.is_day).to_string()
        };
        f.render_widget(Paragraph::new(Line::styled(label, theme.base())), *cell);
    }
}
