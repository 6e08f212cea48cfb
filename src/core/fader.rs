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

//! CD-DA fader
//!
//! The drive pushes one byte per byte clock into the fader whether or not
//! audio is playing; silence is pushed as zero. CD audio is 44.1kHz, 16-bit
//! stereo little-endian PCM, so four bytes make one stereo sample and a
//! 2352-byte sector holds 588 of them.

use std::collections::VecDeque;

/// Bytes per stereo sample (2x signed 16-bit)
pub const BYTES_PER_SAMPLE: usize = 4;

/// Full-scale fader volume
pub const MAX_FADER_VOLUME: u16 = 0x400;

/// Consumer of the drive's audio byte stream
pub trait Fader {
    /// Accept one byte (zero when muted or idle)
    fn data(&mut self, byte: u8);

    /// Whether the next byte starts a new stereo sample
    ///
    /// The drive only starts streaming a sector on a sample boundary.
    fn sample_aligned(&self) -> bool {
        true
    }
}

/// Fader that assembles stereo samples and applies a volume
#[derive(Debug, Clone)]
pub struct CdFader {
    /// Bytes of the sample in progress
    pending: [u8; BYTES_PER_SAMPLE],

    /// Number of bytes in `pending`
    byte_counter: usize,

    /// Attenuation, 0 (silent) to 0x400 (unity)
    volume: u16,

    /// Finished samples waiting for the mixer
    samples: VecDeque<(i16, i16)>,

    /// Cap on queued samples; the oldest are dropped past this
    capacity: usize,
}

impl CdFader {
    /// Default sample queue capacity (one second of audio)
    pub const DEFAULT_CAPACITY: usize = 44_100;

    /// Create a fader at full volume
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a fader with a specific sample queue capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: [0; BYTES_PER_SAMPLE],
            byte_counter: 0,
            volume: MAX_FADER_VOLUME,
            samples: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Set the fader volume (clamped to 0x400)
    pub fn set_volume(&mut self, volume: u16) {
        self.volume = volume.min(MAX_FADER_VOLUME);
        log::trace!("Fader: Volume set to {:03X}", self.volume);
    }

    /// Current fader volume
    pub fn volume(&self) -> u16 {
        self.volume
    }

    /// Pop the oldest finished sample
    pub fn pop_sample(&mut self) -> Option<(i16, i16)> {
        self.samples.pop_front()
    }

    /// Number of finished samples queued
    pub fn queued(&self) -> usize {
        self.samples.len()
    }

    fn scale(&self, sample: i16) -> i16 {
        let scaled = (i32::from(sample) * i32::from(self.volume)) >> 10;
        scaled.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

impl Default for CdFader {
    fn default() -> Self {
        Self::new()
    }
}

impl Fader for CdFader {
    #[inline]
    fn data(&mut self, byte: u8) {
        self.pending[self.byte_counter] = byte;
        self.byte_counter += 1;
        if self.byte_counter < BYTES_PER_SAMPLE {
            return;
        }
        self.byte_counter = 0;

        let left = i16::from_le_bytes([self.pending[0], self.pending[1]]);
        let right = i16::from_le_bytes([self.pending[2], self.pending[3]]);
        let sample = (self.scale(left), self.scale(right));

        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    fn sample_aligned(&self) -> bool {
        self.byte_counter == 0
    }
}
