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

//! Clock domain bridge
//!
//! The drive microcontroller runs from the CD block clock (16.9344 MHz),
//! while the rest of the Sega CD counts cycles of the 50 MHz master clock.
//! Every timestamp that crosses the boundary goes through [`ClockBridge`].
//!
//! # Architecture
//!
//! ```text
//!   host (master clock)            drive (CD block clock)
//!   ───────────────────            ──────────────────────
//!   run(target)      ──to_internal──▶  internal cycle target
//!   next_interrupt   ◀──to_host─────   subcode cycle + sector
//!   data separator   ◀──to_host─────   byte cycle
//! ```
//!
//! Conversions use a 64-bit intermediate so a 32-bit cycle count never
//! overflows during the multiply, and every conversion starts from an
//! absolute count, so rounding never accumulates.
//!
//! # Example
//!
//! ```
//! use segacd_cdd::core::timing::{ClockBridge, SECTOR_CLOCKS};
//!
//! let bridge = ClockBridge::SEGA_CD;
//!
//! // One sector period on the drive side is 1/75 s of master clock
//! assert_eq!(bridge.to_host(SECTOR_CLOCKS), 666_666);
//! assert_eq!(bridge.to_internal(50_000_000), 16_934_400);
//! ```

/// Cycle count type (either clock domain)
pub type Cycle = u32;

/// Sega CD master clock rate (host domain)
pub const MASTER_CLOCK_RATE: u64 = 50_000_000;

/// CD block clock rate (drive domain)
pub const CD_BLOCK_CLOCK_RATE: u64 = 16_934_400;

/// CD block cycles per microcontroller step
pub const MCU_DIVIDER: Cycle = 8;

/// CD block cycles per sector (75 sectors per second)
pub const SECTOR_CLOCKS: Cycle = (CD_BLOCK_CLOCK_RATE / 75) as Cycle;

/// CD block cycles per status/command nibble
pub const NIBBLE_CLOCKS: Cycle = MCU_DIVIDER * 77;

/// CD block cycles per raw sector byte
pub const BYTE_CLOCKS: Cycle = SECTOR_CLOCKS / 2352;

/// Exact integer rate conversion between two clock domains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockBridge {
    /// Host (master) clock rate in Hz
    host_rate: u64,

    /// Internal (drive) clock rate in Hz
    internal_rate: u64,
}

impl ClockBridge {
    /// Sega CD master clock to CD block clock
    pub const SEGA_CD: Self = Self::new(MASTER_CLOCK_RATE, CD_BLOCK_CLOCK_RATE);

    /// Create a bridge between a host clock and an internal clock
    ///
    /// # Arguments
    ///
    /// * `host_rate` - Host clock rate in Hz (non-zero)
    /// * `internal_rate` - Internal clock rate in Hz (non-zero)
    pub const fn new(host_rate: u64, internal_rate: u64) -> Self {
        Self {
            host_rate,
            internal_rate,
        }
    }

    /// Convert a host cycle count to the internal clock domain
    #[inline]
    pub fn to_internal(&self, host_cycle: Cycle) -> Cycle {
        (u64::from(host_cycle) * self.internal_rate / self.host_rate) as Cycle
    }

    /// Convert an internal cycle count to the host clock domain
    #[inline]
    pub fn to_host(&self, internal_cycle: Cycle) -> Cycle {
        (u64::from(internal_cycle) * self.host_rate / self.internal_rate) as Cycle
    }
}

impl Default for ClockBridge {
    fn default() -> Self {
        Self::SEGA_CD
    }
}

/// Subtract a rebase deduction from an optional cycle stamp
///
/// `None` ("never") stays `None`; real stamps clamp at zero.
#[inline]
pub fn rebase(stamp: Option<Cycle>, deduction: Cycle) -> Option<Cycle> {
    stamp.map(|cycle| cycle.saturating_sub(deduction))
}
