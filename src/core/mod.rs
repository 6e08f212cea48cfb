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

//! Core emulation components
//!
//! This module contains the Sega CD drive side of the sub-CPU:
//! - CDD (drive control MCU)
//! - Gate array CDD register window
//! - Media, CDC and fader collaborators
//! - Clock domain conversion
//! - Configuration and errors

pub mod cdc;
pub mod cdd;
pub mod config;
pub mod error;
pub mod fader;
pub mod gate_array;
pub mod media;
pub mod timing;

// Re-export commonly used types
pub use cdd::CddMcu;
pub use config::{CddConfig, DiscLayout};
pub use error::{EmulatorError, Result};
pub use gate_array::GateArray;
pub use media::{Media, MemoryDisc};
