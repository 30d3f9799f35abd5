//! Historical pattern analysis returned by `GET /api/historical-analysis`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::{Activity, Crop};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub activity_type: Activity,
    #[serde(default)]
    pub crop: Option<Crop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Statistics {
    #[validate(range(min = 0.0, max = 100.0))]
    pub rain_probability: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub favorable_conditions_probability: f64,
    pub average_temperature_c: f64,
    #[serde(default)]
    pub average_precipitation_mm: Option<f64>,
    pub total_years_analyzed: u32,
    pub rainy_years: u32,
    pub favorable_years: u32,
}

/// Display tier of an extreme event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Moderate => "MODERATE",
            Severity::High => "HIGH",
        }
    }

    pub fn badge(&self) -> String {
        format!("{} RISK", self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ExtremeEvent {
    #[validate(range(min = 0.0, max = 100.0))]
    pub probability: f64,
    pub threshold: String,
    pub occurrences: u32,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ComfortIndex {
    #[validate(range(min = 0.0, max = 100.0))]
    pub probability: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ExtremeEvents {
    #[validate(nested)]
    pub extreme_heat: ExtremeEvent,
    #[validate(nested)]
    pub extreme_rainfall: ExtremeEvent,
    #[validate(nested)]
    pub heat_wave: ExtremeEvent,
    #[validate(nested)]
    pub dangerous_winds: ExtremeEvent,
    #[validate(nested)]
    pub comfort_index: ComfortIndex,
    #[serde(default)]
    pub summary: Vec<String>,
}

impl ExtremeEvents {
    /// The four named categories with their card titles, in display order.
    pub fn named(&self) -> [(&'static str, &ExtremeEvent); 4] {
        [
            ("Extreme Heat", &self.extreme_heat),
            ("Extreme Rainfall", &self.extreme_rainfall),
            ("Heat Wave", &self.heat_wave),
            ("Dangerous Winds", &self.dangerous_winds),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MonthlyPoint {
    pub day: u8,
    #[validate(range(min = 0.0, max = 100.0))]
    pub rain_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    #[serde(default)]
    pub date: Option<String>,
    pub rained: bool,
    pub precipitation_mm: f64,
    pub temperature_c: f64,
    pub was_favorable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDetail {
    pub trend: TrendDirection,
    pub change_per_decade: f64,
    pub total_change: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateTrends {
    pub temperature: TrendDetail,
    pub precipitation: TrendDetail,
    #[serde(default)]
    pub summary: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct HistoricalAnalysis {
    pub location: LocationInfo,
    pub target_date: NaiveDate,
    pub months_in_advance: u32,
    #[serde(default)]
    pub analysis_period: Option<String>,
    #[validate(nested)]
    pub statistics: Statistics,
    #[validate(range(max = 100))]
    pub planning_risk_score: u8,
    pub recommendation: String,
    #[serde(default)]
    pub insights: Vec<String>,
    #[validate(nested)]
    pub extreme_events: ExtremeEvents,
    #[validate(nested)]
    #[serde(default)]
    pub monthly_pattern: Vec<MonthlyPoint>,
    #[serde(default)]
    pub historical_data: Vec<YearRecord>,
    #[serde(default)]
    pub climate_trends: Option<ClimateTrends>,
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

impl HistoricalAnalysis {
    /// At most the ten most recent yearly records, oldest first.
    pub fn recent_years(&self) -> &[YearRecord] {
        let start = self.historical_data.len().saturating_sub(10);
        &self.historical_data[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, model::Fetched};

    #[test]
    fn decodes_backend_payload() {
        let fetched = Fetched::<HistoricalAnalysis>::from_value(fixtures::historical_json())
            .expect("fixture must decode");
        let analysis = fetched.data;

        assert_eq!(analysis.location.name, "Pune, Maharashtra, India");
        assert_eq!(analysis.location.crop, Some(Crop::Wheat));
        assert_eq!(analysis.target_date, NaiveDate::from_ymd_opt(2027, 3, 15).unwrap());
        assert_eq!(analysis.planning_risk_score, 35);
        assert_eq!(analysis.extreme_events.heat_wave.severity, Severity::Moderate);
        assert_eq!(analysis.statistics.rainy_years, 7);
        assert!(analysis.climate_trends.is_some());
    }

    #[test]
    fn rejects_probability_above_hundred() {
        let mut raw = fixtures::historical_json();
        raw["statistics"]["rain_probability"] = serde_json::json!(120.0);

        let err = Fetched::<HistoricalAnalysis>::from_value(raw).unwrap_err();
        assert!(format!("{err:#}").contains("out-of-range"));
    }

    #[test]
    fn rejects_unknown_severity() {
        let mut raw = fixtures::historical_json();
        raw["extreme_events"]["dangerous_winds"]["severity"] = serde_json::json!("EXTREME");

        let err = Fetched::<HistoricalAnalysis>::from_value(raw).unwrap_err();
        assert!(err.to_string().contains("expected schema"));
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let mut raw = fixtures::historical_json();
        raw.as_object_mut().unwrap().remove("extreme_events");

        assert!(Fetched::<HistoricalAnalysis>::from_value(raw).is_err());
    }

    #[test]
    fn recent_years_keeps_last_ten() {
        let mut analysis = fixtures::historical().data;
        analysis.historical_data = (2004..2024)
            .map(|year| YearRecord {
                year,
                date: None,
                rained: false,
                precipitation_mm: 0.0,
                temperature_c: 25.0,
                was_favorable: true,
            })
            .collect();

        let recent = analysis.recent_years();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].year, 2014);
        assert_eq!(recent[9].year, 2023);
    }

    #[test]
    fn severity_badge() {
        assert_eq!(Severity::High.badge(), "HIGH RISK");
    }
}
