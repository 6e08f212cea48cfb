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

//! Sega CD drive controller emulation library
//!
//! This library emulates the CDD, the microcontroller that runs the Sega CD
//! disc mechanism and talks to the sub-CPU through a nibble-wide serial
//! link in the gate array.
//!
//! # Example
//!
//! ```
//! use segacd_cdd::core::cdc::SectorCapture;
//! use segacd_cdd::core::fader::CdFader;
//! use segacd_cdd::core::gate_array::CddControl;
//! use segacd_cdd::core::media::TrackType;
//! use segacd_cdd::core::{CddConfig, CddMcu, GateArray, MemoryDisc};
//!
//! let disc = MemoryDisc::from_lengths(&[(TrackType::Audio, 4500, 150)]).unwrap();
//! let mut cdd = CddMcu::new(Some(Box::new(disc)), CddConfig::default());
//! let mut gate_array = GateArray::new();
//!
//! gate_array.set_control(CddControl::HOCK);
//! cdd.hock_enabled();
//! cdd.run(50_000_000, &mut gate_array, &mut SectorCapture::new(), &mut CdFader::new());
//!
//! // No command yet: the status record is all zero
//! assert_eq!(gate_array.read_status(), [0, 0, 0, 0, 0, 0, 0, 0, 0, 0xF]);
//! ```

pub mod core;
