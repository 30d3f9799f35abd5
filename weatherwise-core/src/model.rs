use anyhow::Context;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{fmt, str::FromStr};
use validator::Validate;

use crate::error::InputError;

pub mod analysis;
pub mod forecast;

pub use analysis::{
    ClimateTrends, ComfortIndex, ExtremeEvent, ExtremeEvents, HistoricalAnalysis, LocationInfo,
    MonthlyPoint, Severity, Statistics, TrendDetail, TrendDirection, YearRecord,
};
pub use forecast::{ForecastDay, ForecastResult, OptimalWindow, RiskAnalysis};

/// Outdoor activity the analysis is scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Harvest,
    Planting,
    Event,
    Construction,
    Spraying,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Harvest => "harvest",
            Activity::Planting => "planting",
            Activity::Event => "event",
            Activity::Construction => "construction",
            Activity::Spraying => "spraying",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Activity::Harvest => "🌾 Harvest",
            Activity::Planting => "🌱 Planting",
            Activity::Event => "🎉 Outdoor Event",
            Activity::Construction => "🏗️ Construction",
            Activity::Spraying => "💧 Pesticide Spraying",
        }
    }

    /// Whether a crop kind is meaningful for this activity.
    pub fn uses_crop(&self) -> bool {
        matches!(self, Activity::Harvest | Activity::Planting | Activity::Spraying)
    }

    pub const fn all() -> &'static [Activity] {
        &[
            Activity::Harvest,
            Activity::Planting,
            Activity::Event,
            Activity::Construction,
            Activity::Spraying,
        ]
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activity {
    type Err = InputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_lowercase();
        Activity::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == lower)
            .ok_or_else(|| {
                let names: Vec<_> = Activity::all().iter().map(|a| a.as_str()).collect();
                InputError::unknown_variant("activity", value, &names)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Wheat,
    Rice,
    Cotton,
    Sugarcane,
    Maize,
    Soybean,
}

impl Crop {
    pub fn as_str(&self) -> &'static str {
        match self {
            Crop::Wheat => "wheat",
            Crop::Rice => "rice",
            Crop::Cotton => "cotton",
            Crop::Sugarcane => "sugarcane",
            Crop::Maize => "maize",
            Crop::Soybean => "soybean",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Crop::Wheat => "Wheat",
            Crop::Rice => "Rice",
            Crop::Cotton => "Cotton",
            Crop::Sugarcane => "Sugarcane",
            Crop::Maize => "Maize",
            Crop::Soybean => "Soybean",
        }
    }

    pub const fn all() -> &'static [Crop] {
        &[
            Crop::Wheat,
            Crop::Rice,
            Crop::Cotton,
            Crop::Sugarcane,
            Crop::Maize,
            Crop::Soybean,
        ]
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Crop {
    type Err = InputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_lowercase();
        Crop::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| {
                let names: Vec<_> = Crop::all().iter().map(|c| c.as_str()).collect();
                InputError::unknown_variant("crop", value, &names)
            })
    }
}

/// Which analysis the action button requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Historical pattern analysis, months in advance.
    #[default]
    Planning,
    /// 7-day forecast.
    Forecast,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Planning => "planning",
            Mode::Forecast => "forecast",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Mode::Planning => "📊 Historical Pattern Analysis",
            Mode::Forecast => "🌤️ Real-Time Weather Forecast",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five form fields. Coordinates stay free text until request time.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryForm {
    pub lat: String,
    pub lon: String,
    pub target_date: NaiveDate,
    pub activity: Activity,
    pub crop: Crop,
}

impl Default for QueryForm {
    fn default() -> Self {
        Self {
            lat: "20.0".to_string(),
            lon: "73.5".to_string(),
            target_date: Local::now().date_naive(),
            activity: Activity::Harvest,
            crop: Crop::Wheat,
        }
    }
}

impl QueryForm {
    pub fn historical_query(&self) -> HistoricalQuery {
        HistoricalQuery {
            lat: self.lat.clone(),
            lon: self.lon.clone(),
            date: self.target_date,
            activity: self.activity,
            crop: self.crop,
        }
    }

    pub fn forecast_query(&self) -> ForecastQuery {
        ForecastQuery {
            lat: self.lat.clone(),
            lon: self.lon.clone(),
            activity: self.activity,
            crop: self.crop,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalQuery {
    pub lat: String,
    pub lon: String,
    pub date: NaiveDate,
    pub activity: Activity,
    pub crop: Crop,
}

impl HistoricalQuery {
    /// Query-string pairs in the order the backend documents them.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("lat", self.lat.clone()),
            ("lon", self.lon.clone()),
            ("date", self.date.format("%Y-%m-%d").to_string()),
            ("activity", self.activity.as_str().to_string()),
            ("crop", self.crop.as_str().to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastQuery {
    pub lat: String,
    pub lon: String,
    pub activity: Activity,
    pub crop: Crop,
}

impl ForecastQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("lat", self.lat.clone()),
            ("lon", self.lon.clone()),
            ("activity", self.activity.as_str().to_string()),
            ("crop", self.crop.as_str().to_string()),
        ]
    }
}

/// A decoded backend payload together with the JSON it was decoded from.
///
/// Exports re-send `raw`, so fields this client does not model still reach
/// the export endpoint unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub raw: Value,
}

impl<T> Fetched<T>
where
    T: DeserializeOwned + Validate,
{
    pub fn from_value(raw: Value) -> anyhow::Result<Self> {
        let data: T = serde_json::from_value(raw.clone())
            .context("Response does not match the expected schema")?;
        data.validate()
            .context("Response contains out-of-range values")?;
        Ok(Self { data, raw })
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_as_str_roundtrip() {
        for activity in Activity::all() {
            let parsed: Activity = activity.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*activity, parsed);
        }
    }

    #[test]
    fn unknown_activity_error_lists_choices() {
        let err = "skiing".parse::<Activity>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown activity 'skiing'"));
        assert!(msg.contains("harvest, planting, event, construction, spraying"));
    }

    #[test]
    fn crop_parse_is_case_insensitive() {
        assert_eq!("Sugarcane".parse::<Crop>(), Ok(Crop::Sugarcane));
        assert!("barley".parse::<Crop>().is_err());
    }

    #[test]
    fn crop_is_used_only_by_field_activities() {
        let with_crop: Vec<_> = Activity::all().iter().filter(|a| a.uses_crop()).collect();
        assert_eq!(
            with_crop,
            vec![&Activity::Harvest, &Activity::Planting, &Activity::Spraying]
        );
    }

    #[test]
    fn historical_query_encodes_all_five_fields() {
        let form = QueryForm {
            lat: "18.5".into(),
            lon: "73.8".into(),
            target_date: NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
            activity: Activity::Planting,
            crop: Crop::Rice,
        };

        let params = form.historical_query().to_params();
        assert_eq!(
            params,
            vec![
                ("lat", "18.5".to_string()),
                ("lon", "73.8".to_string()),
                ("date", "2026-11-03".to_string()),
                ("activity", "planting".to_string()),
                ("crop", "rice".to_string()),
            ]
        );
    }

    #[test]
    fn forecast_query_omits_date() {
        let form = QueryForm::default();
        let params = form.forecast_query().to_params();
        assert!(params.iter().all(|(k, _)| *k != "date"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn coordinates_are_sent_verbatim() {
        let form = QueryForm {
            lat: "not-a-number".into(),
            lon: "200".into(),
            ..QueryForm::default()
        };
        let params = form.forecast_query().to_params();
        assert_eq!(params[0].1, "not-a-number");
        assert_eq!(params[1].1, "200");
    }
}
