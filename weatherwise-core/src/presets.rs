use crate::{config::Config, error::InputError};

/// A quick-select location. Coordinates are kept as the strings the form shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub key: String,
    pub name: String,
    pub lat: String,
    pub lon: String,
}

const BUILTIN: &[(&str, &str, &str, &str)] = &[
    ("nashik", "Nashik, Maharashtra", "20.0", "73.5"),
    ("pune", "Pune, Maharashtra", "18.5", "73.8"),
    ("delhi", "Delhi", "28.6", "77.2"),
    ("bangalore", "Bangalore", "12.9", "77.6"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetRegistry {
    presets: Vec<Preset>,
}

impl Default for PresetRegistry {
    fn default() -> Self {
        let presets = BUILTIN
            .iter()
            .map(|(key, name, lat, lon)| Preset {
                key: key.to_string(),
                name: name.to_string(),
                lat: lat.to_string(),
                lon: lon.to_string(),
            })
            .collect();

        Self { presets }
    }
}

impl PresetRegistry {
    /// Built-in presets, with configured presets replacing or extending them.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::default();

        for (key, preset) in &config.presets {
            let preset = Preset {
                key: key.clone(),
                name: preset.name.clone(),
                lat: preset.lat.clone(),
                lon: preset.lon.clone(),
            };

            match registry.presets.iter_mut().find(|p| p.key == preset.key) {
                Some(existing) => *existing = preset,
                None => registry.presets.push(preset),
            }
        }

        registry
    }

    pub fn get(&self, key: &str) -> Result<&Preset, InputError> {
        let key = key.trim().to_lowercase();
        self.presets
            .iter()
            .find(|p| p.key == key)
            .ok_or(InputError::UnknownPreset(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }
}
