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

//! Emulator configuration
//!
//! Loaded from a TOML file; command-line arguments override individual
//! fields. Every field has a default so a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{EmulatorError, Result};

/// Emulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Program ROM image
    pub rom: Option<PathBuf>,

    /// System BIOS image
    pub bios: Option<PathBuf>,

    /// Frames to run in headless mode
    pub frames: u32,

    /// Per-instruction trace output file
    pub trace_file: Option<PathBuf>,

    /// Print block-cache statistics after the run
    pub dump_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rom: None,
            bios: None,
            frames: 60,
            trace_file: None,
            dump_stats: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|err| EmulatorError::Config(err.to_string()))
    }
}
