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

use clap::Parser;
use log::{error, info};
use segacd_cdd::core::cdc::SectorCapture;
use segacd_cdd::core::cdd::packet::{Command, Record, ReportFormat, StatusPacket};
use segacd_cdd::core::error::Result;
use segacd_cdd::core::fader::CdFader;
use segacd_cdd::core::gate_array::CddControl;
use segacd_cdd::core::media::TrackType;
use segacd_cdd::core::timing::{ClockBridge, SECTOR_CLOCKS};
use segacd_cdd::core::{CddConfig, CddMcu, DiscLayout, GateArray, MemoryDisc};

/// Sega CD drive controller trace harness
#[derive(Parser)]
#[command(name = "cdd-trace")]
#[command(about = "Boot the CDD like the sub-CPU BIOS and log its status records", long_about = None)]
struct Args {
    /// Drive configuration (TOML)
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Disc layout (TOML); a one-track data disc is used if omitted
    #[arg(short = 'd', long)]
    disc: Option<String>,

    /// Number of sectors to run
    #[arg(short = 'n', long, default_value = "300")]
    sectors: u32,
}

fn default_disc() -> Result<MemoryDisc> {
    Ok(MemoryDisc::from_lengths(&[(TrackType::Data, 4500, 150)])?)
}

/// Drive wired to its collaborators, stepped one sector at a time
struct Trace {
    cdd: CddMcu,
    gate_array: GateArray,
    cdc: SectorCapture,
    fader: CdFader,
    clock: ClockBridge,
}

impl Trace {
    /// Enable the link on a fresh drive
    fn new(disc: MemoryDisc, config: CddConfig) -> Self {
        let mut trace = Self {
            cdd: CddMcu::new(Some(Box::new(disc)), config),
            gate_array: GateArray::new(),
            cdc: SectorCapture::new(),
            fader: CdFader::new(),
            clock: ClockBridge::SEGA_CD,
        };
        trace.gate_array.set_control(CddControl::HOCK);
        trace.cdd.hock_enabled();
        trace
    }

    /// Run one sector period and return the status registers
    ///
    /// The host clock is rewound after every sector so the master cycle
    /// count stays within a few sector periods and cannot wrap.
    fn sector(&mut self) -> Record {
        let target = self.clock.to_host(self.cdd.cycle() + SECTOR_CLOCKS);
        self.cdd.run(target, &mut self.gate_array, &mut self.cdc, &mut self.fader);
        self.cdd.acknowledge_interrupt();

        // Every live stamp is younger than two sector periods
        let keep = 2 * SECTOR_CLOCKS;
        if self.cdd.cycle() > keep {
            let deduction = self.clock.to_host(self.cdd.cycle() - keep);
            self.cdd.adjust_cycle(deduction);
        }

        self.gate_array.read_status()
    }

    /// Queue a command for the next command window
    fn send(&mut self, command: &Command) {
        self.gate_array.write_command(&command.to_record());
        self.cdd.start_command_receive(&mut self.gate_array);
    }
}

fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("cdd-trace v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CddConfig::load(path)?,
        None => CddConfig::default(),
    };

    let disc = match &args.disc {
        Some(path) => {
            info!("Loading disc layout from: {}", path);
            DiscLayout::load(path)?.build().map_err(|e| {
                error!("Failed to build disc: {}", e);
                e
            })?
        }
        None => default_disc()?,
    };

    let mut trace = Trace::new(disc, config);

    // Host script: TOC first, then play once the TOC is in
    let mut script = vec![
        Command::ReportRequest {
            format: ReportFormat::TocTrackCount as u8,
            track: 0,
        },
        Command::Play,
    ]
    .into_iter()
    .peekable();

    let mut last_record = None;
    for sector in 0..args.sectors {
        let record = trace.sector();
        if last_record != Some(record) {
            match StatusPacket::from_record(&record) {
                Some(packet) => info!(
                    "Sector {:5}: {:?} {:?} {:?} flags {:X}",
                    sector, packet.status, packet.format, packet.payload, packet.flags
                ),
                None => info!("Sector {:5}: raw {:X?}", sector, record),
            }
            last_record = Some(record);
        }

        let ready = match script.peek() {
            Some(Command::Play) => trace.cdd.toc_valid() && !trace.cdd.seeking(),
            Some(_) => true,
            None => false,
        };
        if ready {
            if let Some(command) = script.next() {
                info!("Sending {:?}", command);
                trace.send(&command);
            }
        }
    }

    info!(
        "Done: {} sectors read, head at PBA {}, status {:?}",
        trace.cdc.sectors().len(),
        trace.cdd.head_pba(),
        trace.cdd.status()
    );

    Ok(())
}
