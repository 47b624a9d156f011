//! Session configuration.
//!
//! Configs are plain serde structs with defaults for every field, so a RON
//! file only needs the values it overrides:
//!
//! ```
//! use skirmish_core::config::SessionConfig;
//!
//! let config = SessionConfig::from_ron_str("(tier: 3, mission: Some(\"survival\"))").unwrap();
//! assert_eq!(config.tier, 3);
//! assert_eq!(config.width, 12);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::map::preset_by_name;
use crate::objective::MissionKind;
use crate::rng::SimRng;

/// Everything needed to build a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Difficulty tier, from 1.
    pub tier: u32,
    /// Mission name; random when unset.
    pub mission: Option<String>,
    /// Map preset name; random when unset.
    pub preset: Option<String>,
    /// RNG seed; drawn from OS entropy when unset.
    pub seed: Option<u64>,
    /// Grid width.
    pub width: i32,
    /// Grid height.
    pub height: i32,
    /// Distance at which monsters spot heroes.
    pub aggro_radius: u32,
    /// Prebattle ticks before combat starts regardless.
    pub max_patrol_ticks: u32,
    /// Rounds before the battle is called a draw.
    pub max_rounds: u32,
    /// Round-ends a capture point must be held.
    pub capture_required: u32,
    /// Rounds to survive.
    pub survival_rounds: u32,
    /// Rounds between reinforcement waves.
    pub survival_interval: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tier: 1,
            mission: None,
            preset: None,
            seed: None,
            width: 12,
            height: 8,
            aggro_radius: 5,
            max_patrol_ticks: 10,
            max_rounds: 100,
            capture_required: 3,
            survival_rounds: 10,
            survival_interval: 3,
        }
    }
}

impl SessionConfig {
    /// Default config at the given tier.
    #[must_use]
    pub fn new(tier: u32) -> Self {
        Self {
            tier,
            ..Self::default()
        }
    }

    /// Select a mission by name.
    #[must_use]
    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }

    /// Select a map preset by name.
    #[must_use]
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    /// Fix the RNG seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the grid size.
    #[must_use]
    pub const fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse a config from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron)?;
        Ok(config)
    }

    /// Reject values that cannot produce a playable session.
    pub fn validate(&self) -> Result<()> {
        if self.tier == 0 {
            return Err(SimError::InvalidConfig("tier must be at least 1".into()));
        }
        if self.width < 6 || self.height < 4 {
            return Err(SimError::InvalidConfig(format!(
                "map {}x{} is smaller than 6x4",
                self.width, self.height
            )));
        }
        if self.max_rounds == 0
            || self.capture_required == 0
            || self.survival_rounds == 0
            || self.survival_interval == 0
        {
            return Err(SimError::InvalidConfig(
                "round limits and mission thresholds must be non-zero".into(),
            ));
        }
        if let Some(mission) = &self.mission {
            mission.parse::<MissionKind>()?;
        }
        if let Some(preset) = &self.preset {
            preset_by_name(preset)?;
        }
        Ok(())
    }

    /// The configured mission, or a uniform pick when unset.
    pub fn resolve_mission(&self, rng: &mut SimRng) -> Result<MissionKind> {
        match &self.mission {
            Some(name) => name.parse(),
            None => rng
                .choose(&MissionKind::ALL)
                .copied()
                .ok_or_else(|| SimError::InvalidConfig("no missions defined".into())),
        }
    }

    /// The configured seed, or a fresh one from OS entropy.
    #[must_use]
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
