use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, Select, Text};
use std::{path::PathBuf, process::ExitCode};
use tracing::debug;
use weatherwise_core::{
    Activity, Config, Crop, DashboardBackend, DirectorySink, ExportFormat, FetchOutcome,
    HttpBackend, Mode, PresetConfig, PresetRegistry, ViewController, backend_from_config,
};

use crate::{dashboard, render, terminal::TerminalNotifier};

pub type Dashboard = ViewController<HttpBackend, TerminalNotifier, DirectorySink>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weatherwise",
    version,
    about = "Plan months ahead with historical patterns, execute with a 7-day forecast"
)]
pub struct Cli {
    /// Backend address; overrides the configured one for this run.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log requests and state changes to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where and what to analyze.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Quick-select location, e.g. "pune". See `weatherwise presets`.
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub preset: Option<String>,

    /// Latitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<String>,

    /// Longitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<String>,

    /// harvest, planting, event, construction or spraying.
    #[arg(long, default_value = "harvest")]
    pub activity: Activity,

    /// Crop kind; only sent along for harvest, planting and spraying.
    #[arg(long, default_value = "wheat")]
    pub crop: Crop,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit the backend address, download folder and presets.
    Configure,

    /// List the quick-select locations.
    Presets,

    /// Check that the backend is up.
    Health,

    /// Historical pattern analysis for a future date.
    Historical {
        #[command(flatten)]
        query: QueryArgs,

        /// Target date (YYYY-MM-DD), today or later. Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Save the analysis as a report after showing it.
        #[arg(long)]
        export: Option<ExportFormat>,
    },

    /// 7-day forecast with a risk verdict.
    Forecast {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Interactive dashboard with mode switch, map picker and downloads.
    Dashboard,
}

impl QueryArgs {
    fn apply(&self, dashboard: &Dashboard) -> Result<()> {
        if let Some(key) = &self.preset {
            dashboard.select_preset(key)?;
        }
        if let Some(lat) = &self.lat {
            dashboard.set_latitude(lat.as_str());
        }
        if let Some(lon) = &self.lon {
            dashboard.set_longitude(lon.as_str());
        }
        dashboard.set_activity(self.activity);
        dashboard.set_crop(self.crop);
        Ok(())
    }
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let Cli { base_url, command, .. } = self;
        let mut config = Config::load()?;

        // `configure` edits the stored file, so the one-off override must not leak into it.
        if let Some(base_url) = base_url.filter(|_| !matches!(command, Command::Configure)) {
            config.base_url = base_url;
        }

        match command {
            Command::Configure => {
                configure(config)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Presets => {
                print_presets(&PresetRegistry::from_config(&config));
                Ok(ExitCode::SUCCESS)
            }
            Command::Health => health(&config).await,
            Command::Historical { query, date, export } => {
                let dashboard = build_dashboard(&config, false)?;
                query.apply(&dashboard)?;
                dashboard.set_target_date(target_date(date, Local::now().date_naive())?);
                dashboard.set_mode(Mode::Planning);

                if dashboard.submit().await != FetchOutcome::Applied {
                    return Ok(ExitCode::FAILURE);
                }
                if let Some(fetched) = dashboard.historical() {
                    print!("{}", render::historical_view(&fetched.data));
                }
                if let Some(format) = export {
                    if dashboard.download(format).await.is_none() {
                        return Ok(ExitCode::FAILURE);
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Forecast { query } => {
                let dashboard = build_dashboard(&config, false)?;
                query.apply(&dashboard)?;
                dashboard.set_mode(Mode::Forecast);

                if dashboard.submit().await != FetchOutcome::Applied {
                    return Ok(ExitCode::FAILURE);
                }
                if let Some(fetched) = dashboard.forecast() {
                    print!("{}", render::forecast_view(&fetched.data));
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Dashboard => {
                let dashboard = build_dashboard(&config, true)?;
                dashboard::run(&dashboard).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn build_dashboard(config: &Config, interactive: bool) -> Result<Dashboard> {
    let backend = backend_from_config(config)?;
    let dashboard = ViewController::new(
        backend,
        TerminalNotifier::new(interactive),
        DirectorySink::new(config.download_dir()),
    )
    .with_presets(PresetRegistry::from_config(config));

    debug!(
        base_url = %config.base_url,
        download_dir = %config.download_dir().display(),
        "dashboard ready"
    );

    if let Some(key) = &config.default_location {
        dashboard
            .select_preset(key)
            .context("Configured default_location is not a known preset")?;
    }

    Ok(dashboard)
}

/// Dates before today are refused; the backend only analyzes upcoming dates.
fn target_date(requested: Option<NaiveDate>, today: NaiveDate) -> Result<NaiveDate> {
    let date = requested.unwrap_or(today);
    if date < today {
        bail!("Target date {date} is in the past; pick {today} or later");
    }
    Ok(date)
}

fn print_presets(presets: &PresetRegistry) {
    for preset in presets.iter() {
        println!(
            "{:<12} {:<24} {:>7}, {}",
            preset.key, preset.name, preset.lat, preset.lon
        );
    }
}

async fn health(config: &Config) -> Result<ExitCode> {
    let backend = backend_from_config(config)?;
    match backend.health().await {
        Ok(status) => {
            println!("{} at {}: {}", status.status, backend.base_url(), status.message);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Backend at {} is unreachable: {err:#}", backend.base_url());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn configure(mut config: Config) -> Result<()> {
    config.base_url = Text::new("Backend URL:")
        .with_initial_value(&config.base_url)
        .prompt()?;

    let current_dir = config.download_dir().display().to_string();
    let dir = Text::new("Download folder:")
        .with_initial_value(&current_dir)
        .prompt()?;
    config.download_dir = (!dir.trim().is_empty()).then(|| PathBuf::from(dir.trim()));

    let timeout = CustomType::<u64>::new("Request timeout in seconds (0 waits indefinitely):")
        .with_default(config.request_timeout_secs.unwrap_or(0))
        .prompt()?;
    config.request_timeout_secs = (timeout > 0).then_some(timeout);

    while Confirm::new("Add or replace a custom preset?")
        .with_default(false)
        .prompt()?
    {
        let key = Text::new("Preset key (e.g. mumbai):").prompt()?;
        let name = Text::new("Display name:").prompt()?;
        let lat = Text::new("Latitude:").prompt()?;
        let lon = Text::new("Longitude:").prompt()?;
        config.upsert_preset(key.trim(), PresetConfig { name, lat, lon });
    }

    let registry = PresetRegistry::from_config(&config);
    let mut choices = vec!["(none)".to_string()];
    choices.extend(registry.iter().map(|p| p.key.clone()));
    let default = Select::new("Default location for new dashboards:", choices).prompt()?;
    config.default_location = (default != "(none)").then_some(default);

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}
