//! Dashboard state and request orchestration.
//!
//! [`ViewController`] owns the form fields, the selected mode, the loading
//! flag and the two mutually exclusive result slots. Every fetch is stamped
//! with a generation number when it starts; only the most recently started
//! fetch may touch the state when it completes, so a slow response can never
//! overwrite the result of a request issued after it.

use anyhow::anyhow;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::{
    backend::DashboardBackend,
    error::InputError,
    export::{DownloadError, ExportFormat, FileSink, pretty_json},
    model::{Activity, Crop, Fetched, ForecastResult, HistoricalAnalysis, Mode, QueryForm},
    notify::Notifier,
    picker::{Coordinate, LocationPicker},
    presets::PresetRegistry,
};

pub const HISTORICAL_FETCH_FAILED: &str =
    "Failed to load analysis. Make sure the backend is running!";
pub const FORECAST_FETCH_FAILED: &str =
    "Failed to load forecast. Make sure the backend is running!";
pub const NO_ANALYSIS_TO_DOWNLOAD: &str = "No data to download. Please run an analysis first.";
pub const DOWNLOAD_FAILED: &str = "Failed to download. Please try again.";

/// What happened to a fetch once it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the displayed result.
    Applied,
    /// The request failed; the user was alerted and prior results kept.
    Failed,
    /// A newer fetch started meanwhile; the response was dropped.
    Superseded,
    /// Not sent because a fetch was already loading.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub mode: Mode,
    pub loading: bool,
    pub historical: Option<Fetched<HistoricalAnalysis>>,
    pub forecast: Option<Fetched<ForecastResult>>,
    pub form: QueryForm,
    generation: u64,
}

impl ViewState {
    fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }
}

pub struct ViewController<B, N, S> {
    backend: B,
    notifier: N,
    sink: S,
    presets: PresetRegistry,
    state: Mutex<ViewState>,
}

impl<B, N, S> ViewController<B, N, S>
where
    B: DashboardBackend,
    N: Notifier,
    S: FileSink,
{
    pub fn new(backend: B, notifier: N, sink: S) -> Self {
        Self {
            backend,
            notifier,
            sink,
            presets: PresetRegistry::default(),
            state: Mutex::new(ViewState::default()),
        }
    }

    pub fn with_presets(mut self, presets: PresetRegistry) -> Self {
        self.presets = presets;
        self
    }

    pub fn with_form(self, form: QueryForm) -> Self {
        self.state.lock().form = form;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn presets(&self) -> &PresetRegistry {
        &self.presets
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.lock().clone()
    }

    pub fn form(&self) -> QueryForm {
        self.state.lock().form.clone()
    }

    pub fn mode(&self) -> Mode {
        self.state.lock().mode
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn historical(&self) -> Option<Fetched<HistoricalAnalysis>> {
        self.state.lock().historical.clone()
    }

    pub fn forecast(&self) -> Option<Fetched<ForecastResult>> {
        self.state.lock().forecast.clone()
    }

    /// Switching mode only changes which request the action button sends.
    pub fn set_mode(&self, mode: Mode) {
        self.state.lock().mode = mode;
    }

    pub fn set_activity(&self, activity: Activity) {
        self.state.lock().form.activity = activity;
    }

    pub fn set_crop(&self, crop: Crop) {
        self.state.lock().form.crop = crop;
    }

    pub fn set_latitude(&self, lat: impl Into<String>) {
        self.state.lock().form.lat = lat.into();
    }

    pub fn set_longitude(&self, lon: impl Into<String>) {
        self.state.lock().form.lon = lon.into();
    }

    pub fn set_target_date(&self, date: NaiveDate) {
        self.state.lock().form.target_date = date;
    }

    pub fn crop_selector_visible(&self) -> bool {
        self.state.lock().form.activity.uses_crop()
    }

    /// Copies a preset's coordinates into the form. Other fields are untouched.
    pub fn select_preset(&self, key: &str) -> Result<(), InputError> {
        let preset = self.presets.get(key)?;
        let mut state = self.state.lock();
        state.form.lat = preset.lat.clone();
        state.form.lon = preset.lon.clone();
        Ok(())
    }

    /// Receives a map click; coordinates are shown with two decimals.
    pub fn select_on_map(&self, point: Coordinate) {
        let mut state = self.state.lock();
        state.form.lat = format!("{:.2}", point.lat);
        state.form.lon = format!("{:.2}", point.lon);
    }

    /// A map centered on the current form coordinates whose clicks update the form.
    pub fn picker(&self) -> Result<LocationPicker<impl FnMut(Coordinate) + '_>, InputError> {
        let form = self.form();
        LocationPicker::from_strings(&form.lat, &form.lon, move |point| {
            self.select_on_map(point)
        })
    }

    /// The action button: fetches whatever the current mode shows.
    pub async fn submit(&self) -> FetchOutcome {
        let mode = {
            let state = self.state.lock();
            if state.loading {
                debug!("action ignored while a fetch is loading");
                return FetchOutcome::Ignored;
            }
            state.mode
        };

        match mode {
            Mode::Planning => self.fetch_historical().await,
            Mode::Forecast => self.fetch_forecast().await,
        }
    }

    pub async fn fetch_historical(&self) -> FetchOutcome {
        let (ticket, query) = {
            let mut state = self.state.lock();
            (state.begin_fetch(), state.form.historical_query())
        };
        debug!(
            generation = ticket,
            lat = %query.lat,
            lon = %query.lon,
            date = %query.date,
            activity = %query.activity,
            crop = %query.crop,
            "fetching historical analysis"
        );

        let result = self.backend.historical_analysis(&query).await;

        self.complete(ticket, result, HISTORICAL_FETCH_FAILED, |state, fetched| {
            state.historical = Some(fetched);
            state.forecast = None;
        })
    }

    pub async fn fetch_forecast(&self) -> FetchOutcome {
        let (ticket, query) = {
            let mut state = self.state.lock();
            (state.begin_fetch(), state.form.forecast_query())
        };
        debug!(
            generation = ticket,
            lat = %query.lat,
            lon = %query.lon,
            activity = %query.activity,
            crop = %query.crop,
            "fetching forecast"
        );

        let result = self.backend.forecast(&query).await;

        self.complete(ticket, result, FORECAST_FETCH_FAILED, |state, fetched| {
            state.forecast = Some(fetched);
            state.historical = None;
        })
    }

    fn complete<T>(
        &self,
        ticket: u64,
        result: anyhow::Result<T>,
        failure_message: &str,
        apply: impl FnOnce(&mut ViewState, T),
    ) -> FetchOutcome {
        let err = {
            let mut state = self.state.lock();
            if state.generation != ticket {
                debug!(
                    generation = ticket,
                    latest = state.generation,
                    "discarding superseded response"
                );
                return FetchOutcome::Superseded;
            }

            state.loading = false;
            match result {
                Ok(data) => {
                    apply(&mut state, data);
                    info!(generation = ticket, mode = %state.mode, "view updated");
                    return FetchOutcome::Applied;
                }
                Err(err) => err,
            }
        };

        warn!(generation = ticket, "fetch failed: {err:#}");
        self.notifier.alert(failure_message);
        FetchOutcome::Failed
    }

    /// Exports the displayed historical analysis. Forecasts are not exportable.
    ///
    /// Returns where the file was saved; every failure has already been
    /// reported through the notifier.
    pub async fn download(&self, format: ExportFormat) -> Option<PathBuf> {
        match self.try_download(format).await {
            Ok((filename, path)) => {
                info!(%format, path = %path.display(), "download saved");
                self.notifier.info(&format!("Downloaded {filename}"));
                Some(path)
            }
            Err(DownloadError::NoAnalysis) => {
                self.notifier.alert(NO_ANALYSIS_TO_DOWNLOAD);
                None
            }
            Err(err) => {
                warn!(%format, "download failed: {err:#}");
                self.notifier.alert(DOWNLOAD_FAILED);
                None
            }
        }
    }

    async fn try_download(&self, format: ExportFormat) -> Result<(String, PathBuf), DownloadError> {
        let raw = self
            .state
            .lock()
            .historical
            .as_ref()
            .map(|fetched| fetched.raw.clone())
            .ok_or(DownloadError::NoAnalysis)?;

        let (filename, bytes) = match format {
            ExportFormat::Csv => {
                let csv = self.backend.download_csv(&raw).await?;
                (csv.filename(), csv.bytes)
            }
            ExportFormat::Json => {
                let envelope = self.backend.download_json(&raw).await?;
                if !envelope.success {
                    return Err(DownloadError::Rejected);
                }
                let filename = envelope
                    .filename
                    .filter(|name| !name.trim().is_empty())
                    .ok_or_else(|| anyhow!("Export envelope carries no filename"))?;
                (filename, pretty_json(&envelope.content)?)
            }
        };

        let path = self.sink.save(&filename, &bytes)?;
        Ok((filename, path))
    }
}
