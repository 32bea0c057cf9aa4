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

//! Emulator error types
//!
//! All fallible host-side operations (file loading, save states, trace
//! output, configuration parsing) report through [`EmulatorError`]. The CPU
//! core itself never returns errors: guest-visible faults become guest
//! exceptions, and diagnostics go to the logger.

use thiserror::Error;

/// Top-level error type for the emulator
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// Host I/O failure (ROM/BIOS loading, trace files, save states)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A ROM image failed validation
    #[error("invalid ROM image: {0}")]
    InvalidRom(String),

    /// Configuration file could not be parsed or contained bad values
    #[error("configuration error: {0}")]
    Config(String),

    /// A save state could not be encoded or decoded
    #[error("save state error: {0}")]
    SaveState(String),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, EmulatorError>;
