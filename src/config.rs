//! Simulation configuration, loaded from a JSON file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::disease::DiseaseParams;
use crate::error::EpigridError;
use crate::hashing::HashSet;

fn default_tile_size() -> i32 {
    16
}

fn default_compliance() -> f64 {
    0.95
}

fn default_return_interval() -> u32 {
    7
}

/// A half-open window of simulation days during which a command is active:
/// the command starts on `start` and is lifted on `stop`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: u32,
    pub stop: u32,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Number of days to simulate.
    pub days: u32,
    /// Grid extent in cells.
    pub nx: i32,
    pub ny: i32,
    /// Tile edge length in cells.
    #[serde(default = "default_tile_size")]
    pub tile_size: i32,
    /// Base random seed.
    #[serde(default)]
    pub seed: u64,
    /// Unordered (faster) binning; results may differ in the low bits across
    /// runs. Off by default: stable binning, bit-identical reruns.
    #[serde(default)]
    pub fast_bin: bool,

    pub diseases: Vec<DiseaseParams>,

    #[serde(default = "default_compliance")]
    pub shelter_compliance: f64,
    #[serde(default = "default_compliance")]
    pub symptomatic_withdraw_compliance: f64,

    /// Shelter-in-place window.
    #[serde(default)]
    pub shelter: Option<DayWindow>,
    /// School-closure window.
    #[serde(default)]
    pub school_closure: Option<DayWindow>,

    /// Per-day probability of starting a random trip; 0 disables.
    #[serde(default)]
    pub random_travel_prob: f64,
    /// Days between returning random travellers home.
    #[serde(default = "default_return_interval")]
    pub random_travel_return_interval: u32,
    /// Days between returning air travellers home.
    #[serde(default = "default_return_interval")]
    pub air_travel_return_interval: u32,

    /// Path to a JSON array of agent attributes, read by the runner.
    #[serde(default)]
    pub population: Option<PathBuf>,
}

impl SimConfig {
    pub fn from_file(path: &Path) -> Result<Self, EpigridError> {
        let text = fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EpigridError> {
        if self.diseases.is_empty() {
            return Err(EpigridError::BadConfig(
                "at least one disease must be configured".into(),
            ));
        }
        let mut names = HashSet::default();
        for params in &self.diseases {
            params.validate()?;
            if !names.insert(params.name.as_str()) {
                return Err(EpigridError::BadConfig(format!(
                    "duplicate disease name '{}'",
                    params.name
                )));
            }
        }
        for (label, p) in [
            ("shelter_compliance", self.shelter_compliance),
            (
                "symptomatic_withdraw_compliance",
                self.symptomatic_withdraw_compliance,
            ),
            ("random_travel_prob", self.random_travel_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EpigridError::BadConfig(format!(
                    "{label} = {p} outside [0, 1]"
                )));
            }
        }
        for (label, window) in [
            ("shelter", self.shelter),
            ("school_closure", self.school_closure),
        ] {
            if let Some(w) = window {
                if w.stop < w.start {
                    return Err(EpigridError::BadConfig(format!(
                        "{label} window stops before it starts"
                    )));
                }
            }
        }
        if self.random_travel_return_interval == 0 || self.air_travel_return_interval == 0 {
            return Err(EpigridError::BadConfig(
                "travel return intervals must be at least one day".into(),
            ));
        }
        Ok(())
    }

    /// A minimal configuration for tests: one default disease on an
    /// `nx` x `ny` grid.
    #[must_use]
    pub fn for_testing(nx: i32, ny: i32, days: u32) -> Self {
        SimConfig {
            days,
            nx,
            ny,
            tile_size: default_tile_size(),
            seed: 0,
            fast_bin: false,
            diseases: vec![DiseaseParams::with_name("default")],
            shelter_compliance: default_compliance(),
            symptomatic_withdraw_compliance: default_compliance(),
            shelter: None,
            school_closure: None,
            random_travel_prob: 0.0,
            random_travel_return_interval: default_return_interval(),
            air_travel_return_interval: default_return_interval(),
            population: None,
        }
    }
}
