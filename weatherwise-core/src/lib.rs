//! Core library for the `weatherwise` dashboard.
//!
//! This crate defines:
//! - Domain models for historical analyses and forecasts
//! - The backend abstraction and its HTTP implementation
//! - Configuration, presets and the location picker
//! - The view controller that ties form state, requests and downloads together
//!
//! It is used by `weatherwise-cli`, but can also be reused by other front ends.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod model;
pub mod notify;
pub mod picker;
pub mod presets;
pub mod risk;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use backend::{DashboardBackend, HttpBackend, backend_from_config};
pub use config::{Config, PresetConfig};
pub use controller::{FetchOutcome, ViewController, ViewState};
pub use error::InputError;
pub use export::{DirectorySink, ExportFormat, FileSink};
pub use model::{Activity, Crop, Fetched, ForecastResult, HistoricalAnalysis, Mode, QueryForm};
pub use notify::Notifier;
pub use picker::{Coordinate, LocationPicker};
pub use presets::{Preset, PresetRegistry};
pub use risk::RiskTier;
