//! Seven-day forecast returned by `GET /api/forecast`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::LocationInfo;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature_c: f64,
    pub conditions: String,
    pub precipitation_mm: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub precipitation_probability: f64,
    #[serde(default)]
    pub humidity_percent: Option<f64>,
    #[serde(default)]
    pub wind_speed_ms: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub soil_moisture_index: f64,
}

impl ForecastDay {
    pub fn soil_moisture_percent(&self) -> f64 {
        self.soil_moisture_index * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RiskAnalysis {
    #[validate(range(max = 100))]
    pub risk_score: u8,
    pub recommendation: String,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub reasoning: Vec<String>,
    #[serde(default)]
    pub optimal_window: Option<OptimalWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ForecastResult {
    pub location: LocationInfo,
    /// Exactly seven daily records, starting today.
    #[validate(length(equal = 7))]
    #[validate(nested)]
    pub forecast: Vec<ForecastDay>,
    #[validate(nested)]
    pub risk_analysis: RiskAnalysis,
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, model::{Activity, Fetched}};

    #[test]
    fn decodes_backend_payload() {
        let fetched = Fetched::<ForecastResult>::from_value(fixtures::forecast_json())
            .expect("fixture must decode");
        let forecast = fetched.data;

        assert_eq!(forecast.forecast.len(), 7);
        assert_eq!(forecast.location.activity_type, Activity::Event);
        assert_eq!(forecast.location.crop, None);
        assert_eq!(forecast.risk_analysis.risk_score, 62);
        assert_eq!(forecast.forecast[0].wind_speed_ms, Some(4.5));
    }

    #[test]
    fn rejects_short_forecast() {
        let mut raw = fixtures::forecast_json();
        raw["forecast"].as_array_mut().unwrap().pop();

        assert!(Fetched::<ForecastResult>::from_value(raw).is_err());
    }

    #[test]
    fn rejects_long_forecast() {
        let mut raw = fixtures::forecast_json();
        let extra = raw["forecast"][6].clone();
        raw["forecast"].as_array_mut().unwrap().push(extra);

        assert!(Fetched::<ForecastResult>::from_value(raw).is_err());
    }

    #[test]
    fn rejects_soil_moisture_out_of_range() {
        let mut raw = fixtures::forecast_json();
        raw["forecast"][3]["soil_moisture_index"] = serde_json::json!(1.4);

        assert!(Fetched::<ForecastResult>::from_value(raw).is_err());
    }

    #[test]
    fn soil_moisture_as_percent() {
        let day = &fixtures::forecast().data.forecast[0];
        assert_eq!(format!("{:.0}", day.soil_moisture_percent()), "35");
    }
}
