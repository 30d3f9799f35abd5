//! Backend payloads shared by the unit tests.

use serde_json::{Value, json};

use crate::model::{Fetched, ForecastResult, HistoricalAnalysis};

pub fn historical_json() -> Value {
    json!({
        "location": {
            "name": "Pune, Maharashtra, India",
            "lat": 18.5,
            "lon": 73.8,
            "activity_type": "harvest",
            "crop": "wheat"
        },
        "target_date": "2027-03-15",
        "months_in_advance": 5,
        "analysis_period": "2004-2024 (20 years of NASA data)",
        "statistics": {
            "rain_probability": 35.0,
            "favorable_conditions_probability": 65.0,
            "average_temperature_c": 31.4,
            "average_precipitation_mm": 27.3,
            "total_years_analyzed": 20,
            "rainy_years": 7,
            "favorable_years": 13
        },
        "planning_risk_score": 35,
        "recommendation": "MODERATE RISK - HAVE BACKUP PLAN",
        "insights": [
            "Low rain probability (35%) - generally favorable conditions",
            "Summer period - typically dry but hot conditions"
        ],
        "extreme_events": {
            "extreme_heat": {
                "probability": 25.0,
                "threshold": "38°C (100°F)",
                "occurrences": 5,
                "severity": "HIGH",
                "description": "Days with dangerously high temperatures above 38°C"
            },
            "extreme_rainfall": {
                "probability": 5.0,
                "threshold": "50mm",
                "occurrences": 1,
                "severity": "LOW",
                "description": "Days with heavy rainfall exceeding 50mm"
            },
            "heat_wave": {
                "probability": 10.0,
                "threshold": "3+ days above 36°C",
                "occurrences": 2,
                "severity": "MODERATE",
                "description": "Multi-day heat waves with temperatures exceeding 36°C"
            },
            "dangerous_winds": {
                "probability": 0.0,
                "threshold": ">60 km/h (>37 mph)",
                "occurrences": 0,
                "severity": "LOW",
                "description": "High winds that could impact outdoor activities"
            },
            "comfort_index": {
                "probability": 90.0,
                "description": "Overall probability of comfortable conditions without extreme events"
            },
            "summary": ["⚠️ High risk of extreme heat - shade and hydration critical"]
        },
        "monthly_pattern": [
            {"day": 1, "rain_probability": 10},
            {"day": 2, "rain_probability": 25},
            {"day": 3, "rain_probability": 0},
            {"day": 4, "rain_probability": 100}
        ],
        "historical_data": [
            {"year": 2022, "date": "2022-03-15", "rained": false, "precipitation_mm": 2, "temperature_c": 33, "was_favorable": true},
            {"year": 2023, "date": "2023-03-15", "rained": true, "precipitation_mm": 41, "temperature_c": 29, "was_favorable": false}
        ],
        "climate_trends": {
            "temperature": {
                "trend": "INCREASING",
                "change_per_decade": 0.42,
                "total_change": 0.8,
                "description": "Temperatures have risen by 0.8°C over the past decade"
            },
            "precipitation": {
                "trend": "STABLE",
                "change_per_decade": 0.3,
                "total_change": 0.6,
                "description": "Rainfall patterns have remained relatively stable over the past decade"
            },
            "summary": ["🌡️ Climate warming trend detected - consider heat adaptation strategies"]
        },
        "data_sources": [
            "NASA GPM IMERG (Historical Precipitation - 20 years)",
            "Statistical Analysis Engine"
        ],
        "generated_at": "2026-10-18T09:00:00"
    })
}

pub fn historical() -> Fetched<HistoricalAnalysis> {
    Fetched::from_value(historical_json()).expect("historical fixture must decode")
}

pub fn forecast_json() -> Value {
    let days: Vec<Value> = (0..7)
        .map(|i| {
            json!({
                "date": format!("2026-10-{:02}", 18 + i),
                "temperature_c": 24 + i,
                "precipitation_mm": if i % 2 == 0 { 1 } else { 18 },
                "precipitation_probability": if i % 2 == 0 { 15 } else { 75 },
                "humidity_percent": 45,
                "wind_speed_ms": 4.5,
                "soil_moisture_index": if i % 2 == 0 { 0.35 } else { 0.65 },
                "conditions": if i % 2 == 0 { "Clear" } else { "Rain Likely" }
            })
        })
        .collect();

    json!({
        "location": {
            "name": "Delhi, India",
            "lat": 28.6,
            "lon": 77.2,
            "activity_type": "event",
            "crop": null
        },
        "forecast": days,
        "risk_analysis": {
            "risk_score": 62,
            "recommendation": "RESCHEDULE RECOMMENDED",
            "confidence": "MEDIUM",
            "reasoning": [
                "Significant rain expected (avg 12.3mm over next 3 days)",
                "🚫 Poor conditions - consider delaying"
            ],
            "optimal_window": {"start": "2026-10-18", "end": "2026-10-18", "confidence": "HIGH"}
        },
        "data_sources": ["NASA GPM IMERG (Precipitation)", "Meteomatics Weather API"],
        "generated_at": "2026-10-18T09:00:00"
    })
}

pub fn forecast() -> Fetched<ForecastResult> {
    Fetched::from_value(forecast_json()).expect("forecast fixture must decode")
}
