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

//! Data separator (CDC) sink
//!
//! The drive streams every raw sector byte to the CD data controller
//! (an LC8951 on the Sega CD). The decoder itself lives outside this crate;
//! [`DataSeparator`] is the seam and [`SectorCapture`] a minimal sink that
//! reassembles whole sectors.

use crate::core::media::SECTOR_SIZE;
use crate::core::timing::Cycle;

/// Consumer of raw sector bytes
pub trait DataSeparator {
    /// Accept one sector byte
    ///
    /// # Arguments
    ///
    /// * `cycle` - Host (master clock) cycle the byte arrives on
    /// * `index` - Byte offset within the sector (0-2351)
    /// * `byte` - Raw sector byte
    fn write_byte(&mut self, cycle: Cycle, index: usize, byte: u8);
}

/// Sink that collects bytes into complete sectors
#[derive(Debug, Clone)]
pub struct SectorCapture {
    current: Vec<u8>,
    sectors: Vec<Vec<u8>>,
    first_cycle: Option<Cycle>,
    last_cycle: Option<Cycle>,
}

impl SectorCapture {
    /// Create an empty capture
    pub fn new() -> Self {
        Self {
            current: Vec::with_capacity(SECTOR_SIZE),
            sectors: Vec::new(),
            first_cycle: None,
            last_cycle: None,
        }
    }

    /// Completed sectors, oldest first
    pub fn sectors(&self) -> &[Vec<u8>] {
        &self.sectors
    }

    /// Bytes received for the sector in progress
    pub fn partial_len(&self) -> usize {
        self.current.len()
    }

    /// Host cycle of the first byte received
    pub fn first_cycle(&self) -> Option<Cycle> {
        self.first_cycle
    }

    /// Host cycle of the most recent byte
    pub fn last_cycle(&self) -> Option<Cycle> {
        self.last_cycle
    }
}

impl Default for SectorCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSeparator for SectorCapture {
    fn write_byte(&mut self, cycle: Cycle, index: usize, byte: u8) {
        if index == 0 && !self.current.is_empty() {
            log::warn!(
                "CDC: Sector restarted after {} bytes, dropping partial sector",
                self.current.len()
            );
            self.current.clear();
        }
        if index != self.current.len() {
            log::warn!(
                "CDC: Out of order byte {} (expected {})",
                index,
                self.current.len()
            );
            return;
        }

        self.first_cycle.get_or_insert(cycle);
        self.last_cycle = Some(cycle);
        self.current.push(byte);

        if self.current.len() == SECTOR_SIZE {
            log::trace!("CDC: Sector {} complete", self.sectors.len());
            self.sectors.push(std::mem::take(&mut self.current));
            self.current.reserve(SECTOR_SIZE);
        }
    }
}
