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

//! Host-visible CDD register window of the sub-CPU gate array
//!
//! # Register Map
//!
//! ```text
//! Index 0      CDD control      bit 8: MUTE  bit 2: HOCK  bit 1: DRS  bit 0: DTS
//! Index 1-5    CDD status       nibbles 0-9 (even nibble = high byte)
//! Index 6-10   CDD command      nibbles 0-9 (even nibble = high byte)
//! ```
//!
//! The drive controller only touches the documented control bits and the
//! nibble slots; everything else belongs to the host.

use bitflags::bitflags;

/// Number of 16-bit registers in the CDD window
pub const CDD_REGISTER_COUNT: usize = 11;

/// Size of a status or command record in nibbles
pub const RECORD_NIBBLES: usize = 10;

bitflags! {
    /// CDD control register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CddControl: u16 {
        /// CD audio output muted
        const MUTE = 0x0100;
        /// Host has enabled the drive link (handshake on)
        const HOCK = 0x0004;
        /// Drive is shifting a status record out (data ready)
        const DRS = 0x0002;
        /// Drive is shifting a command record in (command ready)
        const DTS = 0x0001;
    }
}

/// CDD register window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateArray {
    regs: [u16; CDD_REGISTER_COUNT],
}

impl GateArray {
    /// Control register index
    pub const CTRL: usize = 0;

    /// First status register index
    pub const STATUS: usize = 1;

    /// First command register index
    pub const COMMAND: usize = Self::STATUS + RECORD_NIBBLES / 2;

    /// Create a register window with every register cleared
    pub fn new() -> Self {
        Self {
            regs: [0; CDD_REGISTER_COUNT],
        }
    }

    /// Read a raw register
    pub fn read(&self, index: usize) -> u16 {
        self.regs[index]
    }

    /// Write a raw register
    pub fn write(&mut self, index: usize, value: u16) {
        self.regs[index] = value;
    }

    /// Current control bits (unknown bits dropped)
    pub fn control(&self) -> CddControl {
        CddControl::from_bits_truncate(self.regs[Self::CTRL])
    }

    /// Check whether all of `bits` are set in the control register
    pub fn control_set(&self, bits: CddControl) -> bool {
        self.control().contains(bits)
    }

    /// Set control bits, leaving every other bit alone
    pub fn set_control(&mut self, bits: CddControl) {
        self.regs[Self::CTRL] |= bits.bits();
    }

    /// Clear control bits, leaving every other bit alone
    pub fn clear_control(&mut self, bits: CddControl) {
        self.regs[Self::CTRL] &= !bits.bits();
    }

    /// Place one status nibble into its slot
    pub fn put_status_nibble(&mut self, nibble: usize, value: u8) {
        put_nibble(&mut self.regs[Self::STATUS + (nibble >> 1)], nibble, value);
    }

    /// Fetch one command nibble from its slot
    pub fn take_command_nibble(&self, nibble: usize) -> u8 {
        get_nibble(self.regs[Self::COMMAND + (nibble >> 1)], nibble)
    }

    /// Host side: load a full command record into the command registers
    pub fn write_command(&mut self, record: &[u8; RECORD_NIBBLES]) {
        for (nibble, &value) in record.iter().enumerate() {
            put_nibble(&mut self.regs[Self::COMMAND + (nibble >> 1)], nibble, value);
        }
    }

    /// Host side: read the full status record from the status registers
    pub fn read_status(&self) -> [u8; RECORD_NIBBLES] {
        let mut record = [0; RECORD_NIBBLES];
        for (nibble, value) in record.iter_mut().enumerate() {
            *value = get_nibble(self.regs[Self::STATUS + (nibble >> 1)], nibble);
        }
        record
    }
}

impl Default for GateArray {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn put_nibble(reg: &mut u16, nibble: usize, value: u8) {
    if nibble & 1 != 0 {
        *reg = u16::from(value) | (*reg & 0xFF00);
    } else {
        *reg = (u16::from(value) << 8) | (*reg & 0x00FF);
    }
}

#[inline]
fn get_nibble(reg: u16, nibble: usize) -> u8 {
    if nibble & 1 != 0 {
        reg as u8
    } else {
        (reg >> 8) as u8
    }
}
