use ratatui::style::{Color, Style};
use weather_core::{BackgroundId, background::ConditionGroup};

/// Palette and scenery drawn behind the panels for one backdrop.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub backdrop: Color,
    pub text: Color,
    pub accent: Color,
    pub muted: Color,
    pub scenery: &'static [&'static str],
}

const SUN: &[&str] = &[
    r"    \   |   /    ",
    r"      .---.      ",
    r"  -- (     ) --  ",
    r"      `---'      ",
    r"    /   |   \    ",
];

const MOON: &[&str] = &[
    r"       _..._   *  ",
    r"  *  .'  .::.     ",
    r"    :   ::::::  * ",
    r"    '.  '::::'    ",
    r"  *   `-...-'     ",
];

const HORIZON: &[&str] = &[
    r"       \  |  /        ",
    r"     '.  .-.  .'      ",
    r"   -- _ (   ) _ --    ",
    r"  ~~~~~~~~~~~~~~~~~~  ",
    r"    ~~~~~~~~~~~~~~    ",
];

const CLOUDS: &[&str] = &[
    r"       .--.          ",
    r"    .-(    ).  .--.  ",
    r"   (___.__)__)(    ) ",
    r"            (___.__) ",
    r"                     ",
];

const RAIN: &[&str] = &[
    r"      .-.       ",
    r"     (   ).     ",
    r"    (___(__)    ",
    r"    ‚ʻ‚ʻ‚ʻ‚ʻ    ",
    r"    ‚ʻ‚ʻ‚ʻ‚ʻ    ",
];

const SNOW: &[&str] = &[
    r"      .-.       ",
    r"     (   ).     ",
    r"    (___(__)    ",
    r"     *  *  *    ",
    r"    *  *  *     ",
];

const BLIZZARD: &[&str] = &[
    r"      .-.       ",
    r"     (   ).     ",
    r"    (___(__)    ",
    r"    * * * * *   ",
    r"   * * * * * *  ",
];

const FOG: &[&str] = &[
    r"                 ",
    r"  _ - _ - _ - _  ",
    r"   _ - _ - _ - _ ",
    r"  _ - _ - _ - _  ",
    r"                 ",
];

const THUNDER: &[&str] = &[
    r"      .-.       ",
    r"     (   ).     ",
    r"    (___(__)    ",
    r"     ⚡‚ʻ⚡‚ʻ    ",
    r"    ‚ʻ‚ʻ‚ʻ‚ʻ    ",
];

impl Theme {
    pub fn for_background(id: BackgroundId) -> Self {
        let (backdrop, text, accent, scenery) = match id {
            BackgroundId::ClearDay => (Color::Rgb(38, 110, 180), Color::White, Color::Yellow, SUN),
            BackgroundId::ClearNight => {
                (Color::Rgb(12, 16, 44), Color::Gray, Color::LightYellow, MOON)
            }
            BackgroundId::Sunrise => {
                (Color::Rgb(150, 70, 60), Color::White, Color::LightYellow, HORIZON)
            }
            BackgroundId::Rain => (Color::Rgb(40, 52, 70), Color::Gray, Color::LightBlue, RAIN),
            BackgroundId::Overcast => (Color::Rgb(70, 74, 80), Color::White, Color::Gray, CLOUDS),
            BackgroundId::SnowLight => {
                (Color::Rgb(120, 140, 160), Color::Black, Color::White, SNOW)
            }
            BackgroundId::SnowHeavy => {
                (Color::Rgb(180, 190, 200), Color::Black, Color::Blue, BLIZZARD)
            }
            BackgroundId::Fog => (Color::Rgb(96, 100, 104), Color::White, Color::Gray, FOG),
            BackgroundId::Cloud => (Color::Rgb(80, 110, 140), Color::White, Color::Gray, CLOUDS),
            BackgroundId::Thunder => (Color::Rgb(30, 24, 48), Color::Gray, Color::Yellow, THUNDER),
        };

        Self { backdrop, text, accent, muted: Color::DarkGray, scenery }
    }

    pub fn base(&self) -> Style {
        Style::new().fg(self.text).bg(self.backdrop)
    }

    pub fn accent(&self) -> Style {
        Style::new().fg(self.accent).bg(self.backdrop)
    }
}

/// Single-cell symbol for a condition in the forecast strip.
pub fn condition_glyph(code: u16, is_day: bool) -> &'static str {
    match ConditionGroup::from_code(code) {
        Some(ConditionGroup::Thunder) => "⚡",
        Some(ConditionGroup::SnowHeavy | ConditionGroup::SnowLight) => "❄",
        Some(ConditionGroup::Freezing) => "✱",
        Some(ConditionGroup::Fog) => "≡",
        Some(ConditionGroup::Rain) => "☂",
        Some(ConditionGroup::Clear) if code == 1000 => {
            if is_day { "☀" } else { "☾" }
        }
        Some(ConditionGroup::Clear | ConditionGroup::Overcast) => "☁",
        None => "·",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_backdrop_has_scenery() {
        for &id in BackgroundId::all() {
            let theme = Theme::for_background(id);
            assert_eq!(theme.scenery.len(), 5, "{id}");
            assert_ne!(theme.backdrop, theme.text, "{id}");
        }
    }

    #[test]
    fn glyphs() {
        assert_eq!(condition_glyph(1000, true), "☀");
        assert_eq!(condition_glyph(1000, false), "☾");
        assert_eq!(condition_glyph(1003, true), "☁");
        assert_eq!(condition_glyph(1195, true), "☂");
        assert_eq!(condition_glyph(1276, false), "⚡");
        assert_eq!(condition_glyph(4242, true), "·");
    }
}
