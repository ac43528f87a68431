use serde::{Deserialize, Serialize};

pub const WEEKDAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];
pub const SEASONS: [&str; 4] = ["Spring", "Summer", "Autumn", "Winter"];

const SEASON_LENGTH_DAYS: u32 = 90;

/// In-game calendar/clock. The executor only reads `hour` for
/// time-gated conditions and background suffix selection; the rest is
/// display state carried through save files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeState {
    pub hour: u32,
    pub day: u32,
    pub weekday: String,
    pub season: String,
}

impl Default for TimeState {
    fn default() -> Self {
        TimeState {
            hour: 8,
            day: 1,
            weekday: WEEKDAYS[0].to_string(),
            season: SEASONS[0].to_string(),
        }
    }
}

impl TimeState {
    pub fn advance(&mut self, hours: u32) {
        let total = self.hour.saturating_add(hours);
        let days_to_add = total / 24;
        self.hour = total % 24;

        let weekday_index = WEEKDAYS
            .iter()
            .position(|w| *w == self.weekday)
            .unwrap_or(0);
        self.weekday =
            WEEKDAYS[(weekday_index + days_to_add as usize) % WEEKDAYS.len()].to_string();

        self.day = self.day.saturating_add(days_to_add);
        self.season = self.calculate_season().to_string();
    }

    fn calculate_season(&self) -> &'static str {
        let index = (self.day % (SEASON_LENGTH_DAYS * 4)) / SEASON_LENGTH_DAYS;
        SEASONS[index as usize]
    }

    pub fn formatted_hour(&self) -> String {
        let hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        let period = if self.hour < 12 { "AM" } else { "PM" };
        format!("{} {}", hour, period)
    }

    /// Time-of-day tag appended to background asset names when a scene
    /// is marked as affected by time.
    pub fn suffix(&self) -> &'static str {
        match self.hour {
            5..=14 => "_day",
            15..=19 => "_afternoon",
            _ => "_night",
        }
    }
}
