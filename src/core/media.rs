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

//! Disc media as seen by the drive
//!
//! The drive never parses image files. It only needs an ordered track
//! table and the ability to position on a block and pull bytes out of the
//! current sector; [`Media`] is that seam. [`MemoryDisc`] implements it
//! over an in-memory track table, with optional raw sector data.
//!
//! # Addressing
//!
//! Block addresses handed to [`Media::seek`] are disc-relative logical
//! addresses that *include* every track's fake pregap. Track
//! `start_lba`/`end_lba` values exclude them:
//!
//! ```text
//! lba:   0 ........ 150 ............... 150+end0  ....
//!        [ pregap 0 ][ track 0 data    ][ pregap 1 ][ track 1 ...
//! ```

use serde::Deserialize;

use crate::core::cdd::msf::MAX_LBA;
use crate::core::error::MediaError;

/// Bytes in one raw CD sector
pub const SECTOR_SIZE: usize = 2352;

/// Maximum number of tracks on a CD
pub const MAX_TRACKS: usize = 99;

/// Kind of media attached to the drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// Compact disc
    CdRom,
    /// Anything else (cartridge-only boot, no disc)
    Cartridge,
}

/// Track content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    /// CD-DA audio
    Audio,
    /// Mode 1/2 data
    Data,
}

/// One entry of the disc track table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    /// First block of the track, excluding fake pregaps
    pub start_lba: u32,

    /// One past the last block of the track, excluding fake pregaps
    pub end_lba: u32,

    /// Blocks of silence inserted ahead of the track
    pub fake_pregap: u32,

    /// Audio or data
    pub track_type: TrackType,
}

impl Track {
    /// Create a track table entry
    pub fn new(track_type: TrackType, start_lba: u32, end_lba: u32, fake_pregap: u32) -> Self {
        Self {
            start_lba,
            end_lba,
            fake_pregap,
            track_type,
        }
    }

    /// Length of the track in blocks
    pub fn length(&self) -> u32 {
        self.end_lba - self.start_lba
    }
}

/// Disc media collaborator
///
/// The drive holds one of these for its whole lifetime and calls
/// [`Media::seek`] whenever the head lands on a new block, then
/// [`Media::read`] once per byte of that block.
pub trait Media {
    /// Kind of media
    fn media_type(&self) -> MediaType;

    /// Ordered track table
    fn tracks(&self) -> &[Track];

    /// Number of tracks
    fn num_tracks(&self) -> usize {
        self.tracks().len()
    }

    /// Position on a disc-relative block and return the owning track index
    fn seek(&mut self, lba: u32) -> usize;

    /// Read one byte of the current block
    fn read(&mut self, offset: usize) -> u8;
}

/// In-memory disc
///
/// Without sector data, blocks read back a deterministic pattern derived
/// from the block address, which is enough to follow sectors through the
/// data separator in tests.
#[derive(Debug, Clone)]
pub struct MemoryDisc {
    media_type: MediaType,
    tracks: Vec<Track>,
    data: Option<Vec<u8>>,

    /// Block inside the track data area, or `None` while in a pregap or past the end
    current_block: Option<u32>,
}

impl MemoryDisc {
    /// Build a disc from a validated track table
    ///
    /// # Returns
    ///
    /// - `Ok(MemoryDisc)` if the track table is consistent
    /// - `Err(MediaError)` for an empty table, more than 99 tracks,
    ///   inverted/overlapping ranges, or a disc longer than 99:59:74
    pub fn new(tracks: Vec<Track>) -> Result<Self, MediaError> {
        validate_tracks(&tracks)?;
        Ok(Self {
            media_type: MediaType::CdRom,
            tracks,
            data: None,
            current_block: None,
        })
    }

    /// Build a disc from consecutive `(type, length, fake_pregap)` entries
    ///
    /// # Example
    ///
    /// ```
    /// use segacd_cdd::core::media::{Media, MemoryDisc, TrackType};
    ///
    /// let disc = MemoryDisc::from_lengths(&[
    ///     (TrackType::Data, 4500, 150),
    ///     (TrackType::Audio, 2000, 0),
    /// ])
    /// .unwrap();
    /// assert_eq!(disc.tracks()[1].start_lba, 4500);
    /// assert_eq!(disc.tracks()[1].end_lba, 6500);
    /// ```
    pub fn from_lengths(layout: &[(TrackType, u32, u32)]) -> Result<Self, MediaError> {
        let mut start = 0;
        let tracks = layout
            .iter()
            .map(|&(track_type, length, pregap)| {
                let track = Track::new(track_type, start, start + length, pregap);
                start += length;
                track
            })
            .collect();
        Self::new(tracks)
    }

    /// Attach raw sector data covering every track block
    pub fn with_sector_data(mut self, data: Vec<u8>) -> Result<Self, MediaError> {
        let expected = self.last_block() as usize * SECTOR_SIZE;
        if data.len() != expected {
            return Err(MediaError::SectorDataSize {
                expected,
                got: data.len(),
            });
        }
        self.data = Some(data);
        Ok(self)
    }

    /// Override the media type
    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    /// Block the last `seek` landed on, if it is inside a track
    pub fn current_block(&self) -> Option<u32> {
        self.current_block
    }

    fn last_block(&self) -> u32 {
        self.tracks.last().map_or(0, |t| t.end_lba)
    }

    fn pattern_byte(block: u32, offset: usize) -> u8 {
        (block as u8) ^ (offset as u8).rotate_left(3)
    }
}

impl Media for MemoryDisc {
    fn media_type(&self) -> MediaType {
        self.media_type
    }

    fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn seek(&mut self, lba: u32) -> usize {
        let mut shift = 0;
        for (index, track) in self.tracks.iter().enumerate() {
            shift += track.fake_pregap;
            if lba < track.end_lba + shift {
                self.current_block = (lba >= track.start_lba + shift).then(|| lba - shift);
                return index;
            }
        }
        self.current_block = None;
        self.tracks.len().saturating_sub(1)
    }

    fn read(&mut self, offset: usize) -> u8 {
        let Some(block) = self.current_block else {
            return 0;
        };
        match &self.data {
            Some(data) => data
                .get(block as usize * SECTOR_SIZE + offset)
                .copied()
                .unwrap_or(0),
            None => Self::pattern_byte(block, offset),
        }
    }
}

fn validate_tracks(tracks: &[Track]) -> Result<(), MediaError> {
    if tracks.is_empty() {
        return Err(MediaError::NoTracks);
    }
    if tracks.len() > MAX_TRACKS {
        return Err(MediaError::TooManyTracks {
            count: tracks.len(),
        });
    }

    let mut previous_end = 0;
    for (index, track) in tracks.iter().enumerate() {
        let number = index + 1;
        if track.end_lba < track.start_lba {
            return Err(MediaError::InvertedTrack {
                track: number,
                start: track.start_lba,
                end: track.end_lba,
            });
        }
        if track.start_lba < previous_end {
            return Err(MediaError::OverlappingTrack {
                track: number,
                start: track.start_lba,
                previous_end,
            });
        }
        previous_end = track.end_lba;
    }

    // Pregaps included; TOCO reports this length as MSF digits
    let pregaps: u64 = tracks.iter().map(|t| u64::from(t.fake_pregap)).sum();
    let blocks = u64::from(previous_end) + pregaps;
    if blocks > u64::from(MAX_LBA) {
        return Err(MediaError::DiscTooLong { blocks });
    }
    Ok(())
}
