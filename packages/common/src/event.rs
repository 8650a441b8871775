use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScheduleItem {
    #[schema(example = "7:00 - 9:00 AM")]
    pub time: String,
    #[schema(example = "Ring Ceremony")]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScheduleDay {
    /// Day of month, as printed on the card.
    #[schema(example = "04")]
    pub date: String,
    #[schema(example = "Thursday")]
    pub day: String,
    pub items: Vec<ScheduleItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Guest {
    pub name: String,
    #[schema(example = "Family")]
    pub role: String,
}

/// Confirmed guests, split by the side that invited them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RsvpList {
    #[serde(default)]
    pub groom: Vec<Guest>,
    #[serde(default)]
    pub bride: Vec<Guest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Venue {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EventDetails {
    pub title: String,
    pub couple: Vec<String>,
    pub starts_at: DateTime<Utc>,
    pub venue: Venue,
}

/// Everything the site shows that is not user-generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventContent {
    pub event: EventDetails,
    #[serde(default)]
    pub schedule: Vec<ScheduleDay>,
    #[serde(default)]
    pub rsvp: RsvpList,
}

impl EventContent {
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

/// Time remaining until the event starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub started: bool,
}

impl Countdown {
    pub fn until(starts_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = (starts_at - now).num_seconds();
        if remaining <= 0 {
            return Self {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0,
                started: true,
            };
        }

        Self {
            days: remaining / 86_400,
            hours: (remaining % 86_400) / 3_600,
            minutes: (remaining % 3_600) / 60,
            seconds: remaining % 60,
            started: false,
        }
    }
}
