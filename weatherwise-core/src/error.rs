use thiserror::Error;

/// Rejected user input: form values, command-line arguments, map cells.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Unknown {kind} '{value}'. Supported values: {expected}.")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("Unknown preset '{0}'.\nHint: run `weatherwise presets` to list the available locations.")]
    UnknownPreset(String),

    #[error("Invalid {axis} '{value}': expected a decimal number")]
    InvalidCoordinate { axis: &'static str, value: String },

    #[error("Map cell '{0}' is outside the visible map")]
    InvalidCell(String),
}

impl InputError {
    pub(crate) fn unknown_variant(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}
