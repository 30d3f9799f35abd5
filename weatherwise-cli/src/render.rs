//! Text rendering of the dashboard: form summary, result cards and charts.

use std::fmt::Write as _;

use weatherwise_core::{
    ForecastResult, HistoricalAnalysis, Mode, RiskTier, ViewState,
    model::{ExtremeEvent, TrendDetail, TrendDirection},
};

const BAR_WIDTH: usize = 30;
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Horizontal bar of `value` against `max`, at most `width` cells long.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let cells = ((value / max).clamp(0.0, 1.0) * width as f64).round() as usize;
    "█".repeat(cells)
}

/// One glyph per value on a 0-100 scale.
pub fn sparkline(values: impl IntoIterator<Item = f64>) -> String {
    values
        .into_iter()
        .map(|v| {
            let idx = (v.clamp(0.0, 100.0) / 100.0 * (SPARKS.len() - 1) as f64).round() as usize;
            SPARKS[idx]
        })
        .collect()
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "─".repeat(title.chars().count().max(20)));
}

fn bullets(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "  • {item}");
    }
}

fn sources(out: &mut String, data_sources: &[String]) {
    if !data_sources.is_empty() {
        let _ = writeln!(out, "\nData Sources: {}", data_sources.join(" • "));
    }
}

pub fn form_summary(state: &ViewState) -> String {
    let form = &state.form;
    let mut out = String::new();

    heading(&mut out, state.mode.title());
    let _ = writeln!(out, "  Activity:  {}", form.activity.label());
    if form.activity.uses_crop() {
        let _ = writeln!(out, "  Crop:      {}", form.crop.label());
    }
    let _ = writeln!(out, "  Location:  {}, {}", form.lat, form.lon);
    if state.mode == Mode::Planning {
        let _ = writeln!(out, "  Target:    {}", form.target_date);
    }
    if state.loading {
        let _ = writeln!(out, "  ⏳ Analyzing...");
    }

    out
}

fn extreme_card(out: &mut String, icon: &str, title: &str, event: &ExtremeEvent) {
    let _ = writeln!(
        out,
        "  {icon} {title}: {}% · {}",
        event.probability,
        event.severity.badge()
    );
    let _ = writeln!(out, "     {} · {}", event.threshold, event.description);
    let _ = writeln!(out, "     {} occurrences in 20 years", event.occurrences);
}

fn trend_line(out: &mut String, label: &str, detail: &TrendDetail, unit: &str) {
    let arrow = match detail.trend {
        TrendDirection::Increasing => "↗",
        TrendDirection::Decreasing => "↘",
        TrendDirection::Stable => "→",
    };
    let _ = writeln!(
        out,
        "  {arrow} {label}: {:+}{unit} per decade ({:+}{unit} total)",
        detail.change_per_decade, detail.total_change
    );
    let _ = writeln!(out, "     {}", detail.description);
}

pub fn historical_view(analysis: &HistoricalAnalysis) -> String {
    let stats = &analysis.statistics;
    let events = &analysis.extreme_events;
    let tier = RiskTier::from_score(analysis.planning_risk_score);
    let mut out = String::new();

    heading(&mut out, "📅 Long-Term Planning Analysis");
    let _ = writeln!(
        out,
        "  🗓️ Target: {} · 📍 {} · ⏰ Planning {} months in advance",
        analysis.target_date, analysis.location.name, analysis.months_in_advance
    );
    if let Some(period) = &analysis.analysis_period {
        let _ = writeln!(out, "  Period analyzed: {period}");
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  ☔ Rain Probability       {:>5}%   {} of {} years",
        stats.rain_probability, stats.rainy_years, stats.total_years_analyzed
    );
    let _ = writeln!(
        out,
        "  ✅ Favorable Conditions   {:>5}%   {} favorable years",
        stats.favorable_conditions_probability, stats.favorable_years
    );
    let _ = writeln!(
        out,
        "  🌡️ Avg Temperature        {:>5}°C  Historical average",
        stats.average_temperature_c
    );
    if let Some(precip) = stats.average_precipitation_mm {
        let _ = writeln!(out, "  💧 Avg Rain (wet years)   {precip:>5}mm");
    }
    let _ = writeln!(
        out,
        "  {} Planning Risk Score    {:>5}/100",
        tier.marker(),
        analysis.planning_risk_score
    );

    heading(&mut out, "📊 Weather Probabilities Comparison");
    let comparison = [
        ("Rain", stats.rain_probability),
        ("Favorable", stats.favorable_conditions_probability),
        ("Extreme Heat", events.extreme_heat.probability),
        ("Heavy Rain", events.extreme_rainfall.probability),
        ("Heat Wave", events.heat_wave.probability),
    ];
    for (name, probability) in comparison {
        let _ = writeln!(
            out,
            "  {name:<12} {:<width$} {probability}%",
            bar(probability, 100.0, BAR_WIDTH),
            width = BAR_WIDTH
        );
    }

    if !analysis.monthly_pattern.is_empty() {
        heading(&mut out, "Monthly Rain Probability Pattern");
        let line = sparkline(analysis.monthly_pattern.iter().map(|p| p.rain_probability));
        let _ = writeln!(out, "  {line}");
        if let Some(peak) = analysis
            .monthly_pattern
            .iter()
            .max_by(|a, b| a.rain_probability.total_cmp(&b.rain_probability))
        {
            let _ = writeln!(
                out,
                "  day 1-{} · peak {}% on day {}",
                analysis.monthly_pattern.len(),
                peak.rain_probability,
                peak.day
            );
        }
    }

    let years = analysis.recent_years();
    if !years.is_empty() {
        heading(&mut out, "10-Year Historical Temperature Trends");
        // Bars show magnitude so sub-zero years still get one.
        let max_temp = years.iter().map(|y| y.temperature_c.abs()).fold(0.0, f64::max);
        let max_precip = years.iter().map(|y| y.precipitation_mm).fold(0.0, f64::max);
        for year in years {
            let _ = writeln!(
                out,
                "  {} 🌡 {:<12} {:>5}°C  💧 {:<12} {:>5}mm",
                year.year,
                bar(year.temperature_c.abs(), max_temp, 12),
                year.temperature_c,
                bar(year.precipitation_mm, max_precip, 12),
                year.precipitation_mm
            );
        }
    }

    heading(&mut out, "📋 Planning Recommendation");
    let _ = writeln!(
        out,
        "  {} {}  [{}]",
        tier.marker(),
        analysis.recommendation,
        tier.as_str()
    );

    if !analysis.insights.is_empty() {
        heading(&mut out, "💡 Key Insights (Based on 20 Years NASA Data)");
        bullets(&mut out, &analysis.insights);
    }

    heading(&mut out, "⚠️ Extreme Weather Events Analysis");
    let icons = ["🌡️", "🌊", "🔥", "💨"];
    for (icon, (title, event)) in icons.iter().zip(events.named()) {
        extreme_card(&mut out, icon, title, event);
    }
    let _ = writeln!(
        out,
        "  😊 Overall Comfort Index: {}%\n     {}",
        events.comfort_index.probability, events.comfort_index.description
    );
    if !events.summary.is_empty() {
        let _ = writeln!(out, "\n  ⚡ Extreme Events Summary");
        bullets(&mut out, &events.summary);
    }

    if let Some(trends) = &analysis.climate_trends {
        heading(&mut out, "🌍 Climate Trends");
        trend_line(&mut out, "Temperature", &trends.temperature, "°C");
        trend_line(&mut out, "Precipitation", &trends.precipitation, "mm");
        bullets(&mut out, &trends.summary);
    }

    if !years.is_empty() {
        heading(&mut out, "📈 Historical Data (Last 10 Years)");
        for year in years {
            let _ = writeln!(
                out,
                "  {}  {:<10} {:>5}°C {:>5}mm  {}",
                year.year,
                if year.rained { "🌧️ Rained" } else { "☀️ Dry" },
                year.temperature_c,
                year.precipitation_mm,
                if year.was_favorable { "favorable" } else { "unfavorable" }
            );
        }
    }

    sources(&mut out, &analysis.data_sources);
    out
}

pub fn forecast_view(result: &ForecastResult) -> String {
    let risk = &result.risk_analysis;
    let tier = RiskTier::from_score(risk.risk_score);
    let mut out = String::new();

    heading(&mut out, "🎯 7-Day Weather Forecast");
    let _ = writeln!(out, "  📍 {}", result.location.name);
    let _ = writeln!(out, "  Activity: {}", result.location.activity_type);
    let _ = writeln!(out, "  {} {} / 100 Risk Score", tier.marker(), risk.risk_score);
    let _ = writeln!(out, "  {} {}", tier.verdict_icon(), risk.recommendation);
    if let Some(confidence) = &risk.confidence {
        let _ = writeln!(out, "  Confidence: {confidence}");
    }

    if !risk.reasoning.is_empty() {
        let _ = writeln!(out, "\n  Key Insights:");
        bullets(&mut out, &risk.reasoning);
    }

    if let Some(window) = &risk.optimal_window {
        let _ = writeln!(
            out,
            "\n  Best window: {} to {} ({} confidence)",
            window.start.format("%b %-d"),
            window.end.format("%b %-d"),
            window.confidence
        );
    }

    heading(&mut out, "7-Day Detailed Forecast");
    for day in &result.forecast {
        let _ = write!(
            out,
            "  {:<6} {:>4}°C  {:<12} 💧 {}mm  ☔ {}%  🌱 {:.0}%",
            day.date.format("%b %-d").to_string(),
            day.temperature_c,
            day.conditions,
            day.precipitation_mm,
            day.precipitation_probability,
            day.soil_moisture_percent()
        );
        if let Some(wind) = day.wind_speed_ms {
            let _ = write!(out, "  💨 {wind} m/s");
        }
        if let Some(humidity) = day.humidity_percent {
            let _ = write!(out, "  {humidity}% RH");
        }
        out.push('\n');
    }

    sources(&mut out, &result.data_sources);
    out
}
