use std::fmt;

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// Coarse broadcast period selected by wall-clock hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 06:00 to 11:59
    Morning,
    /// 12:00 to 17:59
    Evening,
    /// 18:00 to 05:59
    Night,
}

impl TimeOfDay {
    /// Classify a local timestamp
    pub fn classify<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> Self {
        Self::from_hour(timestamp.hour())
    }

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
