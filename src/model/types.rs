//! Normalized launch record and the column vocabulary of the source table.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status label that marks a successful launch.
pub const SUCCESS_LABEL: &str = "Success";

/// Columns every source table must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Company,
    Location,
    Date,
    Time,
    Rocket,
    Mission,
    RocketStatus,
    Price,
    MissionStatus,
}

impl Column {
    /// All required columns in canonical header order.
    pub const REQUIRED: [Column; 9] = [
        Column::Company,
        Column::Location,
        Column::Date,
        Column::Time,
        Column::Rocket,
        Column::Mission,
        Column::RocketStatus,
        Column::Price,
        Column::MissionStatus,
    ];

    /// Header name as it appears in the source file.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Location => "Location",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Rocket => "Rocket",
            Self::Mission => "Mission",
            Self::RocketStatus => "RocketStatus",
            Self::Price => "Price",
            Self::MissionStatus => "MissionStatus",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// Error returned when a column name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumn(pub String);

impl std::fmt::Display for UnknownColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown column '{}'", self.0)
    }
}

impl std::error::Error for UnknownColumn {}

impl FromStr for Column {
    type Err = UnknownColumn;

    /// Accepts the canonical header plus lower/snake/kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "company" => Ok(Self::Company),
            "location" => Ok(Self::Location),
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            "rocket" => Ok(Self::Rocket),
            "mission" => Ok(Self::Mission),
            "rocketstatus" => Ok(Self::RocketStatus),
            "price" => Ok(Self::Price),
            "missionstatus" => Ok(Self::MissionStatus),
            _ => Err(UnknownColumn(s.to_string())),
        }
    }
}

/// Rule deciding whether a status label counts as a success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessRule {
    /// Label must equal `"Success"`.
    #[default]
    Exact,
    /// Label must contain `"Success"` anywhere.
    Contains,
}

impl SuccessRule {
    pub fn is_success(&self, status: &str) -> bool {
        match self {
            Self::Exact => status == SUCCESS_LABEL,
            Self::Contains => status.contains(SUCCESS_LABEL),
        }
    }
}

impl std::fmt::Display for SuccessRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Contains => write!(f, "contains"),
        }
    }
}

/// One launch event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub company: String,
    pub location: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub rocket: String,
    pub mission: String,
    pub rocket_status: String,
    pub price: Option<f64>,
    pub mission_status: String,
}

/// Hashable view of every stored field of a [`LaunchRecord`].
///
/// Two records are duplicates exactly when their identities are equal.
/// Prices compare by value, so `5` and `5.0` in the source collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordIdentity<'a> {
    company: &'a str,
    location: &'a str,
    date: NaiveDate,
    time: Option<&'a str>,
    rocket: &'a str,
    mission: &'a str,
    rocket_status: &'a str,
    price_bits: Option<u64>,
    mission_status: &'a str,
}

impl LaunchRecord {
    pub fn identity(&self) -> RecordIdentity<'_> {
        RecordIdentity {
            company: &self.company,
            location: &self.location,
            date: self.date,
            time: self.time.as_deref(),
            rocket: &self.rocket,
            mission: &self.mission,
            rocket_status: &self.rocket_status,
            // -0.0 == 0.0 but their bit patterns differ.
            price_bits: self
                .price
                .map(|p| if p == 0.0 { 0.0f64.to_bits() } else { p.to_bits() }),
            mission_status: &self.mission_status,
        }
    }

    /// Text rendering of one field, used for value filters and histograms.
    pub fn field_text(&self, column: Column) -> Cow<'_, str> {
        match column {
            Column::Company => Cow::Borrowed(&self.company),
            Column::Location => Cow::Borrowed(&self.location),
            Column::Date => Cow::Owned(self.date.format("%Y-%m-%d").to_string()),
            Column::Time => Cow::Borrowed(self.time.as_deref().unwrap_or("")),
            Column::Rocket => Cow::Borrowed(&self.rocket),
            Column::Mission => Cow::Borrowed(&self.mission),
            Column::RocketStatus => Cow::Borrowed(&self.rocket_status),
            Column::Price => match self.price {
                Some(p) => Cow::Owned(p.to_string()),
                None => Cow::Borrowed(""),
            },
            Column::MissionStatus => Cow::Borrowed(&self.mission_status),
        }
    }
}
