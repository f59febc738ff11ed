//! Serializable playback configuration
//!
//! A [`PlaybackSettings`] describes a whole manager setup in one value so a
//! host can load it from a file and hand it to
//! [`CreatureManager::apply_settings`](crate::CreatureManager::apply_settings).
//!
//! ```json
//! {
//!   "animation": "walk",
//!   "time_scale": 30.0,
//!   "custom_time_range": { "start": 0, "end": 20 },
//!   "blending": {
//!     "animations": ["walk", "run"],
//!     "ramp": { "source": 0.0, "target": 1.0, "transition_time": 15.0 }
//!   }
//! }
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Inclusive frame range playback is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i32,
    pub end: i32,
}

/// Linear ramp of the blend factor over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendRamp {
    pub source: f32,
    pub target: f32,
    pub transition_time: f32,
}

/// Two clips mixed by a factor, optionally ramped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendSettings {
    pub animations: [String; 2],
    #[serde(default)]
    pub factor: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp: Option<BlendRamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    pub is_playing: bool,
    pub time_scale: f32,
    pub should_loop: bool,
    pub mirror_y: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_time_range: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blending: Option<BlendSettings>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            animation: None,
            is_playing: true,
            time_scale: 1.0,
            should_loop: true,
            mirror_y: false,
            custom_time_range: None,
            blending: None,
        }
    }
}

impl PlaybackSettings {
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading playback settings: {}", path.display());
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
