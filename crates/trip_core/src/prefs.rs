use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Budget {
    #[serde(rename = "budget")]
    Budget,
    #[default]
    #[serde(rename = "mid-range")]
    MidRange,
    #[serde(rename = "luxury")]
    Luxury,
}

impl Budget {
    pub fn as_str(self) -> &'static str {
        match self {
            Budget::Budget => "budget",
            Budget::MidRange => "mid-range",
            Budget::Luxury => "luxury",
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Budget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Budget::Budget, Budget::MidRange, Budget::Luxury]
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown budget {s:?} (expected budget, mid-range or luxury)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelStyle {
    Adventure,
    Cultural,
    Relaxation,
    Foodie,
    #[default]
    Mixed,
}

impl TravelStyle {
    const ALL: [TravelStyle; 5] = [
        TravelStyle::Adventure,
        TravelStyle::Cultural,
        TravelStyle::Relaxation,
        TravelStyle::Foodie,
        TravelStyle::Mixed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TravelStyle::Adventure => "adventure",
            TravelStyle::Cultural => "cultural",
            TravelStyle::Relaxation => "relaxation",
            TravelStyle::Foodie => "foodie",
            TravelStyle::Mixed => "mixed",
        }
    }
}

impl fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TravelStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown travel style {s:?}"))
    }
}

/// Caller-supplied trip description submitted when a research job is created.
///
/// Free-text fields are passed through untouched; only the destination and
/// trip length are checked locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripPreferences {
    pub destination: String,
    pub departing_from: String,
    pub nationality: String,
    pub days: u32,
    pub travel_dates: String,
    pub travelers: String,
    pub budget: Budget,
    pub travel_style: TravelStyle,
    pub interests: String,
    pub special_requirements: String,
}

impl Default for TripPreferences {
    fn default() -> Self {
        Self {
            destination: String::new(),
            departing_from: "N/A".to_string(),
            nationality: "N/A".to_string(),
            days: 5,
            travel_dates: "flexible".to_string(),
            travelers: "1 adult".to_string(),
            budget: Budget::default(),
            travel_style: TravelStyle::default(),
            interests: "general sightseeing".to_string(),
            special_requirements: "none".to_string(),
        }
    }
}

impl TripPreferences {
    pub fn for_destination(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.destination.trim().is_empty() {
            return Err(ValidationError::EmptyDestination);
        }
        if !(MIN_DAYS..=MAX_DAYS).contains(&self.days) {
            return Err(ValidationError::DaysOutOfRange(self.days));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_destination_is_rejected() {
        let prefs = TripPreferences::for_destination("   ");
        assert_eq!(prefs.validate(), Err(ValidationError::EmptyDestination));
    }

    #[test]
    fn days_bounds_are_inclusive() {
        let mut prefs = TripPreferences::for_destination("Goa");
        prefs.days = 60;
        assert!(prefs.validate().is_ok());
        prefs.days = 0;
        assert_eq!(prefs.validate(), Err(ValidationError::DaysOutOfRange(0)));
        prefs.days = 61;
        assert_eq!(prefs.validate(), Err(ValidationError::DaysOutOfRange(61)));
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("Mid-Range".parse::<Budget>(), Ok(Budget::MidRange));
        assert_eq!("FOODIE".parse::<TravelStyle>(), Ok(TravelStyle::Foodie));
        assert!("cheap".parse::<Budget>().is_err());
    }
}
