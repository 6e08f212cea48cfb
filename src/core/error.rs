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

/// Emulator error types
///
/// Drive protocol errors (bad checksum, rejected commands) are not Rust
/// errors: the drive latches them and reports them through the next status
/// record. The types here cover the host side: building media, loading
/// configuration and files.
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),
}

/// Media (track table) error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MediaError {
    #[error("Disc has no tracks")]
    NoTracks,

    #[error("Too many tracks: {count} (maximum 99)")]
    TooManyTracks { count: usize },

    #[error("Track {track} ends before it starts ({start}..{end})")]
    InvertedTrack { track: usize, start: u32, end: u32 },

    #[error("Track {track} starts at {start}, before the previous track ends at {previous_end}")]
    OverlappingTrack {
        track: usize,
        start: u32,
        previous_end: u32,
    },

    #[error("Disc is {blocks} blocks long (maximum 449999, 99:59:74)")]
    DiscTooLong { blocks: u64 },

    #[error("Sector data is {got} bytes (expected {expected})")]
    SectorDataSize { expected: usize, got: usize },
}

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid MSF time: '{0}'")]
    InvalidMsf(String),

    #[error("Invalid seek profile: coarse step {coarse} must exceed fine step {fine} (fine >= 1)")]
    InvalidSeekProfile { coarse: u32, fine: u32 },

    #[error("Invalid track layout: {0}")]
    Layout(#[from] MediaError),
}
