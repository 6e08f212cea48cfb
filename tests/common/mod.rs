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

//! Shared fixtures for drive integration tests
//!
//! [`Host`] plays the sub-CPU side of the link: it enables the drive,
//! queues commands and reads back one status record per sector.

#![allow(dead_code)]

use segacd_cdd::core::cdc::SectorCapture;
use segacd_cdd::core::cdd::packet::{Command, StatusPacket};
use segacd_cdd::core::fader::CdFader;
use segacd_cdd::core::gate_array::CddControl;
use segacd_cdd::core::media::TrackType;
use segacd_cdd::core::timing::{
    Cycle, CD_BLOCK_CLOCK_RATE, MASTER_CLOCK_RATE, NIBBLE_CLOCKS, SECTOR_CLOCKS,
};
use segacd_cdd::core::{CddConfig, CddMcu, GateArray, MemoryDisc};

/// Data track (60s, 2s pregap) followed by two audio tracks (40s, 20s)
pub fn three_track_disc() -> MemoryDisc {
    MemoryDisc::from_lengths(&[
        (TrackType::Data, 4500, 150),
        (TrackType::Audio, 3000, 0),
        (TrackType::Audio, 1500, 0),
    ])
    .expect("valid track table")
}

/// Data track (60s, 2s pregap) followed by one audio track (40s)
pub fn two_track_disc() -> MemoryDisc {
    MemoryDisc::from_lengths(&[(TrackType::Data, 4500, 150), (TrackType::Audio, 3000, 0)])
        .expect("valid track table")
}

/// Master clock cycle that converts to exactly `internal`
pub fn host_cycle(internal: Cycle) -> Cycle {
    (u64::from(internal) * MASTER_CLOCK_RATE).div_ceil(CD_BLOCK_CLOCK_RATE) as Cycle
}

/// Sub-CPU stand-in driving one drive
pub struct Host {
    pub cdd: CddMcu,
    pub ga: GateArray,
    pub cdc: SectorCapture,
    pub fader: CdFader,
    pub interrupts: usize,
}

impl Host {
    /// Enable the link and run until the first status record is shifted out
    pub fn new(disc: Option<MemoryDisc>) -> Self {
        let media = disc.map(|d| Box::new(d) as Box<dyn segacd_cdd::core::Media>);
        let mut host = Self {
            cdd: CddMcu::new(media, CddConfig::default()),
            ga: GateArray::new(),
            cdc: SectorCapture::new(),
            fader: CdFader::new(),
            interrupts: 0,
        };
        host.ga.set_control(CddControl::HOCK);
        host.cdd.hock_enabled();
        host.run_to(SECTOR_CLOCKS + 11 * NIBBLE_CLOCKS + 1);
        host
    }

    fn run_to(&mut self, internal: Cycle) {
        self.cdd.run(
            host_cycle(internal),
            &mut self.ga,
            &mut self.cdc,
            &mut self.fader,
        );
        if self.cdd.interrupt_pending() {
            self.interrupts += 1;
            self.cdd.acknowledge_interrupt();
        }
    }

    /// Queue a command for the current command window
    pub fn send(&mut self, command: Command) {
        self.ga.write_command(&command.to_record());
        self.cdd.start_command_receive(&mut self.ga);
    }

    /// Run one sector period and return the new status record
    pub fn sector(&mut self) -> StatusPacket {
        let target = self.cdd.cycle() + SECTOR_CLOCKS;
        self.run_to(target);
        self.report()
    }

    /// Send a command and return the first status record that reflects it
    pub fn command(&mut self, command: Command) -> StatusPacket {
        self.send(command);
        self.sector()
    }

    /// Decode the status record currently in the registers
    pub fn report(&self) -> StatusPacket {
        StatusPacket::from_record(&self.ga.read_status()).expect("status checksum should match")
    }
}
