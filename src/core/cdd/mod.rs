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

//! Sega CD drive control MCU (CDD)
//!
//! This module emulates the microcontroller that sits between the disc
//! mechanism and the sub-CPU's gate array. It handles:
//! - Head seeking and the TOC scan
//! - Drive status reporting in several formats
//! - Command processing
//! - The nibble-wide serial link to the gate array
//! - Streaming raw sector bytes to the CDC and the fader
//!
//! # Timing
//!
//! The MCU runs off the 16.9344MHz CD block clock, stepping every 8
//! cycles. Once per sector (1/75 s) it rebuilds its status record and
//! shifts it out one nibble every 616 cycles. After the last status nibble
//! the host may hand a command record back, shifted in at the same rate.
//! Sector bytes go out every 96 cycles.
//!
//! ```text
//! subcode ─┬─ status nibbles 0..9 ──── command nibbles 0..9 ─┬─ subcode
//!          │  DRS set                 DTS set                │
//!          │         nibble 7: interrupt                     │
//!          └─────────────── 225792 CD block cycles ──────────┘
//! ```
//!
//! # Commands
//!
//! | Command | Name           | Description                              |
//! |---------|----------------|------------------------------------------|
//! | 0x0     | Nop            | Status poll                              |
//! | 0x1     | Stop           | Stop the disc                            |
//! | 0x2     | Report request | Select the status report format          |
//! | 0x3     | Read           | Seek to MSF and play                     |
//! | 0x4     | Seek           | Seek to MSF and pause                    |
//! | 0x6     | Pause          | Pause at the current position            |
//! | 0x7     | Play           | Play from the current position           |
//! | 0xA     | Track skip     | Jump a number of tracks either way       |
//!
//! Fast forward, rewind, track cue and the door commands are accepted but
//! not implemented.
//!
//! # Example
//!
//! ```rust
//! use segacd_cdd::core::cdc::SectorCapture;
//! use segacd_cdd::core::cdd::packet::{Command, ReportFormat};
//! use segacd_cdd::core::cdd::CddMcu;
//! use segacd_cdd::core::config::CddConfig;
//! use segacd_cdd::core::fader::CdFader;
//! use segacd_cdd::core::gate_array::{CddControl, GateArray};
//! use segacd_cdd::core::media::{MemoryDisc, TrackType};
//!
//! let disc = MemoryDisc::from_lengths(&[(TrackType::Data, 4500, 150)]).unwrap();
//! let mut cdd = CddMcu::new(Some(Box::new(disc)), CddConfig::default());
//! let mut gate_array = GateArray::new();
//! let mut cdc = SectorCapture::new();
//! let mut fader = CdFader::new();
//!
//! gate_array.set_control(CddControl::HOCK);
//! cdd.hock_enabled();
//!
//! // Queue a TOC track count request for the next command window
//! gate_array.write_command(&Command::ReportRequest {
//!     format: ReportFormat::TocTrackCount as u8,
//!     track: 0,
//! }
//! .to_record());
//! cdd.start_command_receive(&mut gate_array);
//!
//! // Run two sectors worth of master clock cycles
//! cdd.run(1_333_334, &mut gate_array, &mut cdc, &mut fader);
//! assert!(cdd.first_command_received());
//! ```

pub mod commands;
pub mod msf;
pub mod packet;
pub mod seek;
pub mod status;
#[cfg(test)]
mod tests;

use crate::core::cdc::DataSeparator;
use crate::core::config::CddConfig;
use crate::core::fader::Fader;
use crate::core::gate_array::{CddControl, GateArray};
use crate::core::media::{Media, Track, SECTOR_SIZE};
use crate::core::timing::{
    rebase, ClockBridge, Cycle, BYTE_CLOCKS, MCU_DIVIDER, NIBBLE_CLOCKS, SECTOR_CLOCKS,
};

use packet::{DriveStatus, Record, ReportFormat, StatusPacket, RECORD_SIZE};

pub use msf::Msf;

/// PBA of logical block 0 (length of the simulated lead-in)
pub const LEADIN_SECTORS: u32 = 10_875;

/// Status nibble whose placement raises the sub-CPU interrupt
const INTERRUPT_NIBBLE: usize = 7;

#[inline]
fn due(cycle: Cycle, at: Option<Cycle>) -> bool {
    at.is_some_and(|at| cycle >= at)
}

/// CDD microcontroller
///
/// Owns the drive state and the media; the gate array, CDC and fader are
/// lent to [`CddMcu::run`] by the surrounding system.
pub struct CddMcu {
    /// Seek profile and timing estimates
    config: CddConfig,

    /// Master clock <-> CD block clock conversion
    clock: ClockBridge,

    /// Loaded media (if any)
    media: Option<Box<dyn Media>>,

    /// Current drive mode
    status: DriveStatus,

    /// Error reported (once) by the next status record
    pending_error: Option<DriveStatus>,

    /// Report format selected by the host
    requested_format: ReportFormat,

    /// 1-based track for TOCN reports
    requested_track: u8,

    /// Read head position (PBA, lead-in included)
    head_pba: u32,

    /// Seek target
    seek_pba: u32,

    /// Point the head wobbles around while paused
    pause_pba: u32,

    seeking: bool,

    /// Set once the TOC scan has run
    toc_valid: bool,

    /// Status records stay zero until the first valid command
    first_command_received: bool,

    /// Current CD block cycle
    cycle: Cycle,

    /// Predicted sub-CPU interrupt (master clock domain)
    next_interrupt_cycle: Option<Cycle>,

    /// Start of the current subcode period
    last_subcode_cycle: Option<Cycle>,

    /// Last status or command nibble transfer
    last_nibble_cycle: Option<Cycle>,

    next_byte_cycle: Cycle,

    /// Status nibble being shifted out
    status_nibble: Option<usize>,

    /// Command nibble being shifted in
    command_nibble: Option<usize>,

    /// Sector byte being streamed
    sector_byte: Option<usize>,

    status_record: Record,
    command_record: Record,

    /// Host asked for a command window before the status shift finished
    command_receive_pending: bool,

    /// Status shift finished and no command window was requested yet
    command_receive_waiting: bool,

    interrupt_pending: bool,
}

impl CddMcu {
    /// Create a drive with all clocks stopped
    ///
    /// # Arguments
    ///
    /// * `media` - Disc in the tray, or `None` for an empty drive
    /// * `config` - Seek profile and timing estimates
    pub fn new(media: Option<Box<dyn Media>>, config: CddConfig) -> Self {
        Self {
            config,
            clock: ClockBridge::SEGA_CD,
            media,
            status: DriveStatus::Stopped,
            pending_error: None,
            requested_format: ReportFormat::NotReady,
            requested_track: 0,
            head_pba: 0,
            seek_pba: 0,
            pause_pba: 0,
            seeking: false,
            toc_valid: false,
            first_command_received: false,
            cycle: 0,
            next_interrupt_cycle: None,
            last_subcode_cycle: None,
            last_nibble_cycle: None,
            next_byte_cycle: 0,
            status_nibble: None,
            command_nibble: None,
            sector_byte: None,
            status_record: StatusPacket::IDLE.to_record(),
            command_record: [0; RECORD_SIZE],
            command_receive_pending: false,
            command_receive_waiting: false,
            interrupt_pending: false,
        }
    }

    /// Run the MCU up to a master clock cycle
    ///
    /// # Arguments
    ///
    /// * `cycle` - Target master clock cycle
    /// * `gate_array` - CDD register window
    /// * `cdc` - Receives raw sector bytes
    /// * `fader` - Receives one audio byte per byte clock
    pub fn run(
        &mut self,
        cycle: Cycle,
        gate_array: &mut GateArray,
        cdc: &mut dyn DataSeparator,
        fader: &mut dyn Fader,
    ) {
        let target = self.clock.to_internal(cycle);

        if !gate_array.control_set(CddControl::HOCK) {
            // Link down: only the byte clock keeps running
            while self.cycle < target {
                if self.cycle >= self.next_byte_cycle {
                    fader.data(0);
                    self.next_byte_cycle += BYTE_CLOCKS;
                }
                self.cycle += MCU_DIVIDER;
            }
            gate_array.set_control(CddControl::MUTE);
            return;
        }

        let mut next_subcode = self
            .last_subcode_cycle
            .map(|c| c.saturating_add(SECTOR_CLOCKS));
        let mut next_status_nibble = self
            .status_nibble
            .and(self.last_nibble_cycle)
            .map(|c| c + NIBBLE_CLOCKS);
        let mut next_command_nibble = self
            .command_nibble
            .and(self.last_nibble_cycle)
            .map(|c| c + NIBBLE_CLOCKS);

        while self.cycle < target {
            if due(self.cycle, next_subcode) {
                self.last_subcode_cycle = Some(self.cycle);
                next_subcode = Some(self.cycle + SECTOR_CLOCKS);
                self.update_status(gate_array);

                next_status_nibble = Some(self.cycle);
                self.status_nibble = Some(0);
                gate_array.set_control(CddControl::DRS);
                if matches!(self.status, DriveStatus::Playing | DriveStatus::Paused)
                    && self.head_pba >= LEADIN_SECTORS
                {
                    self.sector_byte = Some(0);
                }
            }

            if due(self.cycle, next_status_nibble) {
                next_status_nibble = self.shift_status_nibble(gate_array, &mut next_command_nibble);
            } else if due(self.cycle, next_command_nibble) {
                next_command_nibble = self.shift_command_nibble(gate_array);
            }

            if self.cycle >= self.next_byte_cycle {
                self.stream_byte(gate_array, cdc, fader, &mut next_subcode);
                self.next_byte_cycle += BYTE_CLOCKS;
            }

            self.cycle += MCU_DIVIDER;
        }
    }

    /// Place the next status nibble, or close the status shift
    ///
    /// Returns when the next status nibble is due.
    fn shift_status_nibble(
        &mut self,
        gate_array: &mut GateArray,
        next_command_nibble: &mut Option<Cycle>,
    ) -> Option<Cycle> {
        let index = self.status_nibble?;

        if index == RECORD_SIZE {
            self.status_nibble = None;
            gate_array.clear_control(CddControl::DRS);
            if self.command_receive_pending {
                self.command_receive_pending = false;
                self.command_nibble = Some(0);
                self.last_nibble_cycle = Some(self.cycle);
                gate_array.set_control(CddControl::DTS);
                *next_command_nibble = Some(self.cycle + NIBBLE_CLOCKS);
                log::trace!("CDD: Command receive started");
            } else {
                self.command_receive_waiting = true;
            }
            return None;
        }

        gate_array.put_status_nibble(index, self.status_record[index]);
        if index == INTERRUPT_NIBBLE {
            self.interrupt_pending = true;
            self.next_interrupt_cycle = Some(self.clock.to_host(self.cycle + SECTOR_CLOCKS));
        }
        self.status_nibble = Some(index + 1);
        self.last_nibble_cycle = Some(self.cycle);
        Some(self.cycle + NIBBLE_CLOCKS)
    }

    /// Capture the next command nibble, or run the completed command
    ///
    /// Returns when the next command nibble is due.
    fn shift_command_nibble(&mut self, gate_array: &mut GateArray) -> Option<Cycle> {
        let index = self.command_nibble?;

        if index == RECORD_SIZE {
            self.command_nibble = None;
            gate_array.clear_control(CddControl::DTS);
            self.run_command();
            return None;
        }

        self.command_record[index] = gate_array.take_command_nibble(index);
        self.command_nibble = Some(index + 1);
        self.last_nibble_cycle = Some(self.cycle);
        Some(self.cycle + NIBBLE_CLOCKS)
    }

    /// One byte clock of sector streaming
    ///
    /// A sector only starts on a fader sample boundary; until then the
    /// subcode clock slips by a byte period.
    fn stream_byte(
        &mut self,
        gate_array: &GateArray,
        cdc: &mut dyn DataSeparator,
        fader: &mut dyn Fader,
        next_subcode: &mut Option<Cycle>,
    ) {
        match self.sector_byte {
            Some(index) if index > 0 || fader.sample_aligned() => {
                let byte = self.media.as_mut().map_or(0, |m| m.read(index));
                cdc.write_byte(self.clock.to_host(self.cycle), index, byte);
                let muted = gate_array.control_set(CddControl::MUTE);
                fader.data(if muted { 0 } else { byte });

                let next = index + 1;
                self.sector_byte = (next < SECTOR_SIZE).then_some(next);
            }
            Some(_) => {
                fader.data(0);
                *next_subcode = next_subcode.map(|c| c + BYTE_CLOCKS);
                self.last_subcode_cycle = self.last_subcode_cycle.map(|c| c + BYTE_CLOCKS);
            }
            None => fader.data(0),
        }
    }

    /// Host enabled the drive link (HOCK set)
    ///
    /// Starts the subcode clock now and predicts the first interrupt.
    pub fn hock_enabled(&mut self) {
        self.last_subcode_cycle = Some(self.cycle);
        self.next_interrupt_cycle = Some(
            self.clock
                .to_host(self.cycle + SECTOR_CLOCKS + INTERRUPT_NIBBLE as Cycle * NIBBLE_CLOCKS),
        );
        log::debug!("CDD: Link enabled at cycle {}", self.cycle);
    }

    /// Host disabled the drive link (HOCK cleared)
    ///
    /// Stops the subcode, interrupt and nibble clocks and abandons any
    /// shift in progress.
    pub fn hock_disabled(&mut self) {
        self.last_subcode_cycle = None;
        self.next_interrupt_cycle = None;
        self.last_nibble_cycle = None;
        self.status_nibble = None;
        self.command_nibble = None;
        log::debug!("CDD: Link disabled at cycle {}", self.cycle);
    }

    /// Host requests a command window
    ///
    /// If the status shift already finished, command reception starts right
    /// away; otherwise it starts as soon as the shift completes.
    pub fn start_command_receive(&mut self, gate_array: &mut GateArray) {
        if self.command_receive_waiting {
            self.command_receive_waiting = false;
            self.command_nibble = Some(0);
            self.last_nibble_cycle = Some(self.cycle);
            gate_array.set_control(CddControl::DTS);
            log::trace!("CDD: Command receive started");
        } else {
            self.command_receive_pending = true;
        }
    }

    /// Rebase every cycle stamp after the host rewinds its master clock
    ///
    /// # Arguments
    ///
    /// * `deduction` - Master clock cycles subtracted by the host
    pub fn adjust_cycle(&mut self, deduction: Cycle) {
        let internal = self.clock.to_internal(deduction);
        self.cycle = self.cycle.saturating_sub(internal);
        self.next_interrupt_cycle = rebase(self.next_interrupt_cycle, deduction);
        self.last_subcode_cycle = rebase(self.last_subcode_cycle, internal);
        self.last_nibble_cycle = rebase(self.last_nibble_cycle, internal);
        self.next_byte_cycle = self.next_byte_cycle.saturating_sub(internal);
    }

    /// Track table of the loaded media (empty without media)
    fn tracks(&self) -> &[Track] {
        match &self.media {
            Some(media) => media.tracks(),
            None => &[],
        }
    }

    /// Current drive mode
    pub fn status(&self) -> DriveStatus {
        self.status
    }

    /// Report format selected by the host
    pub fn report_format(&self) -> ReportFormat {
        self.requested_format
    }

    /// Last status record built
    pub fn status_record(&self) -> &Record {
        &self.status_record
    }

    /// Read head position (PBA)
    pub fn head_pba(&self) -> u32 {
        self.head_pba
    }

    /// Seek target (PBA)
    pub fn seek_pba(&self) -> u32 {
        self.seek_pba
    }

    pub fn seeking(&self) -> bool {
        self.seeking
    }

    pub fn toc_valid(&self) -> bool {
        self.toc_valid
    }

    pub fn first_command_received(&self) -> bool {
        self.first_command_received
    }

    /// Whether a sector is being streamed
    pub fn streaming(&self) -> bool {
        self.sector_byte.is_some()
    }

    /// Current CD block cycle
    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    /// Interrupt raised by the status shift, not yet acknowledged
    pub fn interrupt_pending(&self) -> bool {
        self.interrupt_pending
    }

    /// Clear the pending interrupt
    pub fn acknowledge_interrupt(&mut self) {
        self.interrupt_pending = false;
    }

    /// Predicted next interrupt (master clock cycle)
    pub fn next_interrupt_cycle(&self) -> Option<Cycle> {
        self.next_interrupt_cycle
    }

    pub fn config(&self) -> &CddConfig {
        &self.config
    }

    /// Loaded media
    pub fn media(&self) -> Option<&dyn Media> {
        self.media.as_deref()
    }
}
