// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Drive configuration and disc layouts
//!
//! Both are plain TOML.
//!
//! # Drive configuration
//!
//! ```toml
//! coarse_seek = 2200
//! fine_seek = 10
//! pre_roll = 4
//! skip_sectors_per_track = 15
//! ```
//!
//! Every key is optional and falls back to the firmware default.
//!
//! # Disc layout
//!
//! ```toml
//! [[track]]
//! type = "data"
//! length = "10:00:00"
//! pregap = "00:02:00"
//!
//! [[track]]
//! type = "audio"
//! length = "03:30:00"
//! ```
//!
//! Tracks are laid end to end in the order given.
//!
//! # Example
//!
//! ```
//! use segacd_cdd::core::config::{CddConfig, DiscLayout};
//! use segacd_cdd::core::media::Media;
//!
//! let config = CddConfig::from_toml_str("fine_seek = 20").unwrap();
//! assert_eq!(config.fine_seek, 20);
//! assert_eq!(config.coarse_seek, 2200);
//!
//! let layout = DiscLayout::from_toml_str(
//!     r#"
//!     [[track]]
//!     type = "data"
//!     length = "00:10:00"
//!     pregap = "00:02:00"
//!     "#,
//! )
//! .unwrap();
//! let disc = layout.build().unwrap();
//! assert_eq!(disc.tracks()[0].end_lba, 750);
//! assert_eq!(disc.tracks()[0].fake_pregap, 150);
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::core::cdd::msf::Msf;
use crate::core::error::{ConfigError, Result};
use crate::core::media::{MemoryDisc, TrackType};

/// Default coarse seek step in blocks
pub const DEFAULT_COARSE_SEEK: u32 = 2200;

/// Default fine seek step in blocks
pub const DEFAULT_FINE_SEEK: u32 = 10;

/// Default pre-roll subtracted from Read/Play targets
pub const DEFAULT_PRE_ROLL: u32 = 4;

/// Default track skip estimate in blocks per track
pub const DEFAULT_SKIP_SECTORS_PER_TRACK: u32 = 15;

/// Drive mechanics configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CddConfig {
    /// Step used while far from the seek target or inside the lead-in
    pub coarse_seek: u32,

    /// Step used near the seek target; also the pause wobble window
    pub fine_seek: u32,

    /// Blocks subtracted from Read/Play targets
    pub pre_roll: u32,

    /// Estimated track length used by track skip
    pub skip_sectors_per_track: u32,
}

impl Default for CddConfig {
    fn default() -> Self {
        Self {
            coarse_seek: DEFAULT_COARSE_SEEK,
            fine_seek: DEFAULT_FINE_SEEK,
            pre_roll: DEFAULT_PRE_ROLL,
            skip_sectors_per_track: DEFAULT_SKIP_SECTORS_PER_TRACK,
        }
    }
}

impl CddConfig {
    /// Check the seek profile
    ///
    /// The fine step must be at least one block and strictly smaller than
    /// the coarse step, otherwise the seek ramp has no fine stage.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.fine_seek == 0 || self.coarse_seek <= self.fine_seek {
            return Err(ConfigError::InvalidSeekProfile {
                coarse: self.coarse_seek,
                fine: self.fine_seek,
            });
        }
        Ok(())
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a TOML file
    ///
    /// # Returns
    ///
    /// - `Ok(CddConfig)` if the file was read and validated
    /// - `Err(EmulatorError)` on I/O, parse or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Config: Loaded {}", path.display());
        Ok(config)
    }
}

/// One `[[track]]` entry of a disc layout
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackEntry {
    /// `audio` or `data`
    #[serde(rename = "type")]
    pub track_type: TrackType,

    /// Track length as `MM:SS:FF`
    pub length: String,

    /// Fake pregap as `MM:SS:FF`
    #[serde(default)]
    pub pregap: Option<String>,
}

/// Disc track layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiscLayout {
    #[serde(rename = "track", default)]
    pub tracks: Vec<TrackEntry>,
}

impl DiscLayout {
    /// Parse a layout from TOML text
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a layout file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(Self::from_toml_str(&text)?)
    }

    /// Build an in-memory disc from the layout
    pub fn build(&self) -> std::result::Result<MemoryDisc, ConfigError> {
        let mut lengths = Vec::with_capacity(self.tracks.len());
        for entry in &self.tracks {
            let length = entry.length.parse::<Msf>()?.to_lba();
            let pregap = match &entry.pregap {
                Some(text) => text.parse::<Msf>()?.to_lba(),
                None => 0,
            };
            lengths.push((entry.track_type, length, pregap));
        }

        let disc = MemoryDisc::from_lengths(&lengths)?;
        log::debug!("Config: Built disc with {} tracks", lengths.len());
        Ok(disc)
    }
}
