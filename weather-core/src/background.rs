//! Picks the dashboard backdrop from the latest condition.
//!
//! Codes are the weather API's condition codes. Code `0` means no weather
//! data has arrived yet.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundId {
    ClearDay,
    ClearNight,
    Sunrise,
    Rain,
    Overcast,
    SnowLight,
    SnowHeavy,
    Fog,
    Cloud,
    Thunder,
}

impl BackgroundId {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundId::ClearDay => "clear-day",
            BackgroundId::ClearNight => "clear-night",
            BackgroundId::Sunrise => "sunrise",
            BackgroundId::Rain => "rain",
            BackgroundId::Overcast => "overcast",
            BackgroundId::SnowLight => "snow-light",
            BackgroundId::SnowHeavy => "snow-heavy",
            BackgroundId::Fog => "fog",
            BackgroundId::Cloud => "cloud",
            BackgroundId::Thunder => "thunder",
        }
    }

    pub const fn all() -> &'static [BackgroundId] {
        &[
            BackgroundId::ClearDay,
            BackgroundId::ClearNight,
            BackgroundId::Sunrise,
            BackgroundId::Rain,
            BackgroundId::Overcast,
            BackgroundId::SnowLight,
            BackgroundId::SnowHeavy,
            BackgroundId::Fog,
            BackgroundId::Cloud,
            BackgroundId::Thunder,
        ]
    }
}

impl fmt::Display for BackgroundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const THUNDER: &[u16] = &[1087, 1273, 1276, 1279, 1282];
pub const SNOW_HEAVY: &[u16] = &[1114, 1117, 1219, 1222, 1225, 1258];
pub const SNOW_LIGHT: &[u16] = &[1066, 1210, 1213, 1216, 1255];
pub const FREEZING: &[u16] =
    &[1069, 1072, 1168, 1171, 1198, 1201, 1204, 1207, 1237, 1249, 1252, 1261, 1264];
pub const FOG: &[u16] = &[1030, 1135, 1147];
pub const RAIN: &[u16] = &[1063, 1150, 1153, 1180, 1183, 1186, 1189, 1192, 1195, 1240, 1243, 1246];
pub const CLEAR: &[u16] = &[1000, 1003, 1006];
pub const OVERCAST: &[u16] = &[1009];

/// Coarse family of a condition code, in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionGroup {
    Thunder,
    SnowHeavy,
    SnowLight,
    Freezing,
    Fog,
    Rain,
    Clear,
    Overcast,
}

impl ConditionGroup {
    pub fn from_code(code: u16) -> Option<Self> {
        const TABLE: &[(&[u16], ConditionGroup)] = &[
            (THUNDER, ConditionGroup::Thunder),
            (SNOW_HEAVY, ConditionGroup::SnowHeavy),
            (SNOW_LIGHT, ConditionGroup::SnowLight),
            (FREEZING, ConditionGroup::Freezing),
            (FOG, ConditionGroup::Fog),
            (RAIN, ConditionGroup::Rain),
            (CLEAR, ConditionGroup::Clear),
            (OVERCAST, ConditionGroup::Overcast),
        ];

        TABLE.iter().find(|(codes, _)| codes.contains(&code)).map(|(_, group)| *group)
    }

    fn background(self, is_day: bool) -> BackgroundId {
        match self {
            ConditionGroup::Thunder => BackgroundId::Thunder,
            ConditionGroup::SnowHeavy => BackgroundId::SnowHeavy,
            ConditionGroup::SnowLight | ConditionGroup::Freezing => BackgroundId::SnowLight,
            ConditionGroup::Fog => BackgroundId::Fog,
            ConditionGroup::Rain => BackgroundId::Rain,
            ConditionGroup::Clear => clear(is_day),
            ConditionGroup::Overcast => BackgroundId::Overcast,
        }
    }
}

/// Choose the backdrop for a condition.
///
/// `hour` only matters while there is no data yet (`code == 0`).
/// `condition_text` is consulted when the code is not in any known group.
pub fn select_background(
    code: u16,
    is_day: bool,
    condition_text: Option<&str>,
    hour: u32,
) -> BackgroundId {
    if code == 0 {
        return placeholder(hour);
    }

    if let Some(group) = ConditionGroup::from_code(code) {
        return group.background(is_day);
    }

    condition_text.and_then(|text| from_text(text, is_day)).unwrap_or(BackgroundId::Cloud)
}

fn clear(is_day: bool) -> BackgroundId {
    if is_day { BackgroundId::ClearDay } else { BackgroundId::ClearNight }
}

fn placeholder(hour: u32) -> BackgroundId {
    match hour {
        6 | 17 => BackgroundId::Sunrise,
        7..=16 => BackgroundId::ClearDay,
        _ => BackgroundId::ClearNight,
    }
}

fn from_text(text: &str, is_day: bool) -> Option<BackgroundId> {
    let text = text.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

    let id = if has(&["thunder"]) {
        BackgroundId::Thunder
    } else if has(&["blizzard", "heavy snow"]) {
        BackgroundId::SnowHeavy
    } else if has(&["snow", "sleet", "ice", "freezing"]) {
        BackgroundId::SnowLight
    } else if has(&["fog", "mist"]) {
        BackgroundId::Fog
    } else if has(&["rain", "drizzle", "shower"]) {
        BackgroundId::Rain
    } else if has(&["overcast"]) {
        BackgroundId::Overcast
    } else if has(&["cloud"]) {
        BackgroundId::Cloud
    } else if has(&["clear", "sunny"]) {
        clear(is_day)
    } else {
        return None;
    };

    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thunder_wins_regardless_of_day_flag() {
        for &code in THUNDER {
            assert_eq!(select_background(code, true, None, 12), BackgroundId::Thunder);
            assert_eq!(select_background(code, false, None, 2), BackgroundId::Thunder);
        }
    }

    #[test]
    fn clear_family_follows_day_flag() {
        for &code in CLEAR {
            assert_eq!(select_background(code, false, None, 12), BackgroundId::ClearNight);
            assert_eq!(select_background(code, true, None, 23), BackgroundId::ClearDay);
        }
    }

    #[test]
    fn heavy_rain_and_heavy_snow() {
        assert_eq!(select_background(1195, true, Some("Heavy rain"), 9), BackgroundId::Rain);
        assert_eq!(select_background(1225, true, None, 9), BackgroundId::SnowHeavy);
        assert_eq!(select_background(1225, false, None, 21), BackgroundId::SnowHeavy);
    }

    #[test]
    fn freezing_and_fog_and_overcast() {
        assert_eq!(select_background(1198, true, None, 9), BackgroundId::SnowLight);
        assert_eq!(select_background(1237, false, None, 9), BackgroundId::SnowLight);
        assert_eq!(select_background(1135, true, None, 9), BackgroundId::Fog);
        assert_eq!(select_background(1009, true, None, 9), BackgroundId::Overcast);
    }

    #[test]
    fn code_groups_do_not_overlap() {
        let groups = [THUNDER, SNOW_HEAVY, SNOW_LIGHT, FREEZING, FOG, RAIN, CLEAR, OVERCAST];
        let mut seen = std::collections::HashSet::new();
        for code in groups.iter().flat_map(|g| g.iter()) {
            assert!(seen.insert(*code), "code {code} appears in two groups");
        }
    }

    #[test]
    fn placeholder_follows_hour_when_no_data() {
        assert_eq!(select_background(0, true, None, 6), BackgroundId::Sunrise);
        assert_eq!(select_background(0, true, None, 17), BackgroundId::Sunrise);
        assert_eq!(select_background(0, false, None, 12), BackgroundId::ClearDay);
        assert_eq!(select_background(0, true, None, 18), BackgroundId::ClearNight);
        assert_eq!(select_background(0, true, None, 3), BackgroundId::ClearNight);
    }

    #[test]
    fn unknown_code_falls_back_on_text() {
        assert_eq!(
            select_background(4242, true, Some("Scattered thunderstorms"), 12),
            BackgroundId::Thunder
        );
        assert_eq!(select_background(4242, true, Some("Partly Cloudy"), 12), BackgroundId::Cloud);
        assert_eq!(select_background(4242, false, Some("Clear"), 12), BackgroundId::ClearNight);
        assert_eq!(select_background(4242, true, Some("Windy"), 12), BackgroundId::Cloud);
        assert_eq!(select_background(4242, true, None, 12), BackgroundId::Cloud);
    }
}
