use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Paragraph,
        canvas::{Canvas, Map, MapResolution, Points},
    },
};
use weather_core::map::MapPanel;

use super::theme::Theme;

/// Draw the precipitation map; returns the canvas area for pointer hit-testing.
pub fn render(
    f: &mut Frame<'_>,
    area: Rect,
    map: Option<&MapPanel>,
    theme: &Theme,
) -> Option<Rect> {
    let Some(map) = map else {
        let block = Block::bordered()
            .title(" Precipitation ")
            .border_style(Style::new().fg(theme.muted))
            .style(theme.base());
        let waiting = Paragraph::new("Waiting for location...")
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(waiting, area);
        return None;
    };

    let frame = map.frame();
    let viewport = map.viewport();
    let center = map.center();

    let mut title = vec![Span::raw(" Precipitation ")];
    let time = frame.time_label();
    if !time.is_empty() {
        title.push(Span::styled(format!("{time} "), theme.accent()));
    }

    let block = Block::bordered()
        .title(Line::from(title))
        .border_style(Style::new().fg(theme.muted))
        .style(theme.base());
    let inner = block.inner(area);

    let canvas = Canvas::default()
        .block(block)
        .background_color(theme.backdrop)
        .marker(Marker::Braille)
        .x_bounds([viewport.west, viewport.east])
        .y_bounds([viewport.south, viewport.north])
        .paint(|ctx| {
            ctx.draw(&Map { color: theme.muted, resolution: MapResolution::High });
            ctx.layer();
            ctx.draw(&Points { coords: &[(center.lon, center.lat)], color: theme.accent });

            if let Some(pointer) = frame.pointer {
                ctx.draw(&Points { coords: &[(pointer.lon, pointer.lat)], color: Color::White });
                let sample = frame.sample_label();
                if !sample.is_empty() {
                    let label = Line::styled(format!(" {sample}"), theme.accent());
                    ctx.print(pointer.lon, pointer.lat, label);
                }
            }
        });

    f.render_widget(canvas, area);
    Some(inner)
}
