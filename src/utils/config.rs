//! Configuration file management.
//!
//! Handles loading and saving user preferences to `~/.wishfire.toml`.
//! Everything is optional; unset keys fall back to the canonical show
//! tuning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use log::info;

use crate::engine::Tuning;

const CONFIG_TEMPLATE: &str = r#"# wishfire configuration file

# Last selected audio device (auto-saved)
# last_device = "Device Name"
# last_device_is_input = true

# =============================================================================
# Launch rate
# =============================================================================

# Volume thresholds on the 0-255 spectral scale
# low_volume = 80.0
# high_volume = 110.0

# Per-frame launch probabilities
# baseline_probability = 0.01
# narrow_baseline_probability = 0.005   # used below narrow_width
# mid_probability = 0.06
# high_probability = 0.15
# narrow_width = 768.0

# =============================================================================
# Bursts and captions
# =============================================================================

# burst_count = 60
# secondary_burst = false       # slower second wave with independent colors
# secondary_count = 30
# caption_chance = 0.3
# caption_margin = 0.2          # captions keep this fraction of width off each edge
# caption_max_life = 140
# trail_fade = 0.1              # per-frame black veil alpha
"#;

#[derive(Serialize, Deserialize, Default)]
pub struct Config {
    pub last_device: Option<String>,
    pub last_device_is_input: Option<bool>,

    // Engine tuning overrides (flattened for simpler TOML)
    pub low_volume: Option<f32>,
    pub high_volume: Option<f32>,
    pub baseline_probability: Option<f32>,
    pub narrow_baseline_probability: Option<f32>,
    pub mid_probability: Option<f32>,
    pub high_probability: Option<f32>,
    pub narrow_width: Option<f32>,
    pub burst_count: Option<usize>,
    pub secondary_burst: Option<bool>,
    pub secondary_count: Option<usize>,
    pub caption_chance: Option<f32>,
    pub caption_margin: Option<f32>,
    pub caption_max_life: Option<u32>,
    pub trail_fade: Option<f32>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".wishfire.toml"))
    }

    pub fn load() -> Self {
        let path = match Self::path() {
            Some(path) => path,
            None => return Self::default(),
        };

        // Create template file if it doesn't exist
        if !path.exists() {
            let _ = fs::write(&path, CONFIG_TEMPLATE);
            info!("created config template at {:?}", path);
        }

        fs::read_to_string(&path)
            .ok()
            .and_then(|text| toml::from_str(&text).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Ok(content) = toml::to_string(self) {
                let _ = fs::write(&path, &content);
            }
        }
    }

    pub fn set_device(&mut self, name: &str, is_input: bool) {
        self.last_device = Some(name.to_string());
        self.last_device_is_input = Some(is_input);
        self.save();
    }

    /// Engine tuning with the canonical defaults for anything unset.
    pub fn tuning(&self) -> Tuning {
        let defaults = Tuning::default();
        Tuning {
            low_volume: self.low_volume.unwrap_or(defaults.low_volume),
            high_volume: self.high_volume.unwrap_or(defaults.high_volume),
            baseline_probability: self
                .baseline_probability
                .unwrap_or(defaults.baseline_probability),
            narrow_baseline_probability: self
                .narrow_baseline_probability
                .unwrap_or(defaults.narrow_baseline_probability),
            mid_probability: self.mid_probability.unwrap_or(defaults.mid_probability),
            high_probability: self.high_probability.unwrap_or(defaults.high_probability),
            narrow_width: self.narrow_width.unwrap_or(defaults.narrow_width),
            burst_count: self.burst_count.unwrap_or(defaults.burst_count),
            secondary_burst: self.secondary_burst.unwrap_or(defaults.secondary_burst),
            secondary_count: self.secondary_count.unwrap_or(defaults.secondary_count),
            caption_chance: self.caption_chance.unwrap_or(defaults.caption_chance),
            caption_margin: self.caption_margin.unwrap_or(defaults.caption_margin),
            caption_max_life: self.caption_max_life.unwrap_or(defaults.caption_max_life),
            trail_fade: self.trail_fade.unwrap_or(defaults.trail_fade),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_yields_canonical_tuning() {
        let config = Config::default();
        let tuning = config.tuning();
        let defaults = Tuning::default();

        assert_eq!(tuning.low_volume, defaults.low_volume);
        assert_eq!(tuning.burst_count, defaults.burst_count);
        assert_eq!(tuning.caption_max_life, defaults.caption_max_life);
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let parsed: Config = toml::from_str("burst_count = 90\ncaption_chance = 0.5").unwrap();
        let tuning = parsed.tuning();

        assert_eq!(tuning.burst_count, 90);
        assert_eq!(tuning.caption_chance, 0.5);
        assert_eq!(tuning.high_volume, Tuning::default().high_volume);
    }
}
