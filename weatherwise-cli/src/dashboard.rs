//! The interactive dashboard: a menu loop over the view controller.

use anyhow::Result;
use chrono::Local;
use inquire::{DateSelect, InquireError, Select, Text};
use std::fmt;
use weatherwise_core::{Activity, Crop, ExportFormat, FetchOutcome, Mode, ViewState};

use crate::{cli::Dashboard, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Run(Mode),
    SwitchMode(Mode),
    Activity,
    Crop,
    Preset,
    Map,
    Coordinates,
    TargetDate,
    ShowResults,
    Download(ExportFormat),
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Run(Mode::Planning) => f.write_str("📊 Analyze Historical Patterns"),
            Action::Run(Mode::Forecast) => f.write_str("🚀 Get Weather Forecast"),
            Action::SwitchMode(mode) => write!(f, "Switch to {}", mode.title()),
            Action::Activity => f.write_str("Change activity"),
            Action::Crop => f.write_str("Change crop"),
            Action::Preset => f.write_str("📍 Quick select location"),
            Action::Map => f.write_str("🗺️ Pick location on map"),
            Action::Coordinates => f.write_str("Edit coordinates"),
            Action::TargetDate => f.write_str("🗓️ Change target date"),
            Action::ShowResults => f.write_str("Show results again"),
            Action::Download(ExportFormat::Csv) => f.write_str("📥 Download CSV"),
            Action::Download(ExportFormat::Json) => f.write_str("📄 Download JSON"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

/// A selectable value shown under a friendlier label.
struct Choice<T> {
    value: T,
    label: String,
}

impl<T> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

fn other_mode(mode: Mode) -> Mode {
    match mode {
        Mode::Planning => Mode::Forecast,
        Mode::Forecast => Mode::Planning,
    }
}

/// Menu entries for the current state. Crop, date and downloads only appear
/// where they apply.
fn menu(state: &ViewState) -> Vec<Action> {
    let mut actions = vec![
        Action::Run(state.mode),
        Action::SwitchMode(other_mode(state.mode)),
        Action::Activity,
    ];

    if state.form.activity.uses_crop() {
        actions.push(Action::Crop);
    }
    actions.extend([Action::Preset, Action::Map, Action::Coordinates]);
    if state.mode == Mode::Planning {
        actions.push(Action::TargetDate);
    }
    if state.historical.is_some() || state.forecast.is_some() {
        actions.push(Action::ShowResults);
    }
    if state.historical.is_some() {
        actions.extend(ExportFormat::all().iter().copied().map(Action::Download));
    }

    actions.push(Action::Quit);
    actions
}

/// Whatever result is stored, rendered.
fn results(state: &ViewState) -> Option<String> {
    if let Some(fetched) = &state.historical {
        return Some(render::historical_view(&fetched.data));
    }
    state
        .forecast
        .as_ref()
        .map(|fetched| render::forecast_view(&fetched.data))
}

/// Esc backs out of a sub-prompt without changing anything.
fn or_back<T>(res: Result<T, InquireError>) -> Result<Option<T>> {
    match res {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub async fn run(dashboard: &Dashboard) -> Result<()> {
    loop {
        let state = dashboard.snapshot();
        print!("{}", render::form_summary(&state));

        let action = match Select::new("What next?", menu(&state)).with_page_size(14).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match action {
            Action::Run(_) => {
                println!("⏳ Analyzing...");
                if dashboard.submit().await == FetchOutcome::Applied {
                    if let Some(view) = results(&dashboard.snapshot()) {
                        print!("{view}");
                    }
                }
            }
            Action::SwitchMode(mode) => dashboard.set_mode(mode),
            Action::Activity => choose_activity(dashboard, state.form.activity)?,
            Action::Crop => choose_crop(dashboard, state.form.crop)?,
            Action::Preset => choose_preset(dashboard)?,
            Action::Map => pick_on_map(dashboard)?,
            Action::Coordinates => edit_coordinates(dashboard, &state)?,
            Action::TargetDate => choose_date(dashboard, &state)?,
            Action::ShowResults => {
                if let Some(view) = results(&state) {
                    print!("{view}");
                }
            }
            Action::Download(format) => {
                dashboard.download(format).await;
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

fn choose_activity(dashboard: &Dashboard, current: Activity) -> Result<()> {
    let choices: Vec<_> = Activity::all()
        .iter()
        .map(|a| Choice { value: *a, label: a.label().to_string() })
        .collect();
    let cursor = Activity::all().iter().position(|a| *a == current).unwrap_or(0);

    if let Some(choice) = or_back(
        Select::new("Activity:", choices)
            .with_starting_cursor(cursor)
            .prompt(),
    )? {
        dashboard.set_activity(choice.value);
    }
    Ok(())
}

fn choose_crop(dashboard: &Dashboard, current: Crop) -> Result<()> {
    let choices: Vec<_> = Crop::all()
        .iter()
        .map(|c| Choice { value: *c, label: c.label().to_string() })
        .collect();
    let cursor = Crop::all().iter().position(|c| *c == current).unwrap_or(0);

    if let Some(choice) = or_back(
        Select::new("Crop:", choices)
            .with_starting_cursor(cursor)
            .prompt(),
    )? {
        dashboard.set_crop(choice.value);
    }
    Ok(())
}

fn choose_preset(dashboard: &Dashboard) -> Result<()> {
    let choices: Vec<_> = dashboard
        .presets()
        .iter()
        .map(|p| Choice {
            value: p.key.clone(),
            label: format!("{} ({}, {})", p.name, p.lat, p.lon),
        })
        .collect();

    if let Some(choice) = or_back(Select::new("Location:", choices).prompt())? {
        dashboard.select_preset(&choice.value)?;
    }
    Ok(())
}

fn pick_on_map(dashboard: &Dashboard) -> Result<()> {
    let mut picker = match dashboard.picker() {
        Ok(picker) => picker,
        Err(err) => {
            eprintln!("{err}\nFix the coordinates before opening the map.");
            return Ok(());
        }
    };

    loop {
        println!("\n{}", picker.render());
        println!("{}", picker.center_tile().url());

        let Some(input) = or_back(
            Text::new("Cell to select (e.g. E9), + or - to zoom:")
                .with_help_message("Esc to go back")
                .prompt(),
        )?
        else {
            return Ok(());
        };

        match input.trim() {
            "+" => {
                let zoom = picker.zoom().saturating_add(1);
                picker = picker.with_zoom(zoom);
            }
            "-" => {
                let zoom = picker.zoom().saturating_sub(1);
                picker = picker.with_zoom(zoom);
            }
            cell => match picker.click_cell(cell) {
                Ok(point) => {
                    println!("📍 Selected {:.2}, {:.2}", point.lat, point.lon);
                    return Ok(());
                }
                Err(err) => eprintln!("{err}"),
            },
        }
    }
}

fn edit_coordinates(dashboard: &Dashboard, state: &ViewState) -> Result<()> {
    if let Some(lat) = or_back(
        Text::new("Latitude:")
            .with_initial_value(&state.form.lat)
            .prompt(),
    )? {
        dashboard.set_latitude(lat.trim());
    }
    if let Some(lon) = or_back(
        Text::new("Longitude:")
            .with_initial_value(&state.form.lon)
            .prompt(),
    )? {
        dashboard.set_longitude(lon.trim());
    }
    Ok(())
}

fn choose_date(dashboard: &Dashboard, state: &ViewState) -> Result<()> {
    let today = Local::now().date_naive();

    if let Some(date) = or_back(
        DateSelect::new("Target date:")
            .with_min_date(today)
            .with_starting_date(state.form.target_date.max(today))
            .prompt(),
    )? {
        dashboard.set_target_date(date);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherwise_core::fixtures;

    #[test]
    fn planning_menu_offers_date_and_crop() {
        let state = ViewState::default();
        let actions = menu(&state);

        assert_eq!(actions[0], Action::Run(Mode::Planning));
        assert_eq!(actions[1], Action::SwitchMode(Mode::Forecast));
        assert!(actions.contains(&Action::Crop));
        assert!(actions.contains(&Action::TargetDate));
        assert!(!actions.contains(&Action::ShowResults));
        assert!(!actions.contains(&Action::Download(ExportFormat::Csv)));
        assert_eq!(actions.last(), Some(&Action::Quit));
    }

    #[test]
    fn forecast_menu_hides_date_and_crop_for_events() {
        let mut state = ViewState::default();
        state.mode = Mode::Forecast;
        state.form.activity = Activity::Event;

        let actions = menu(&state);
        assert_eq!(actions[0], Action::Run(Mode::Forecast));
        assert!(!actions.contains(&Action::Crop));
        assert!(!actions.contains(&Action::TargetDate));
    }

    #[test]
    fn downloads_only_with_historical_results() {
        let mut state = ViewState::default();
        state.forecast = Some(fixtures::forecast());

        let actions = menu(&state);
        assert!(actions.contains(&Action::ShowResults));
        assert!(!actions.contains(&Action::Download(ExportFormat::Json)));

        state.forecast = None;
        state.historical = Some(fixtures::historical());

        let actions = menu(&state);
        assert!(actions.contains(&Action::Download(ExportFormat::Csv)));
        assert!(actions.contains(&Action::Download(ExportFormat::Json)));
    }

    #[test]
    fn results_render_the_stored_view() {
        let mut state = ViewState::default();
        assert!(results(&state).is_none());

        state.forecast = Some(fixtures::forecast());
        assert!(results(&state).unwrap().contains("7-Day Detailed Forecast"));

        state.forecast = None;
        state.historical = Some(fixtures::historical());
        assert!(results(&state).unwrap().contains("Long-Term Planning Analysis"));
    }

    #[test]
    fn action_labels_follow_mode() {
        assert_eq!(Action::Run(Mode::Planning).to_string(), "📊 Analyze Historical Patterns");
        assert_eq!(Action::Run(Mode::Forecast).to_string(), "🚀 Get Weather Forecast");
        assert_eq!(
            Action::SwitchMode(Mode::Forecast).to_string(),
            "Switch to 🌤️ Real-Time Weather Forecast"
        );
    }
}
