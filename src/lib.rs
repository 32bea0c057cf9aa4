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

//! neorx: A Neo Geo (MVS/AES) arcade emulator
//!
//! This crate provides a Neo Geo emulator built around a block-compiling
//! Motorola 68000 CPU core.
//!
//! # Architecture
//!
//! The emulator is organized into the following modules:
//!
//! - [`core`]: Core emulation components (CPU, Memory, Interrupts, System)
//!
//! # Example
//!
//! ```no_run
//! use neorx::core::system::System;
//!
//! let mut system = System::new();
//! // system.load_rom("path/to/program.p1")?;
//! // system.reset();
//! // system.run_frame();
//! # Ok::<(), neorx::core::error::EmulatorError>(())
//! ```
//!
//! # Getting Started
//!
//! 1. Create a [`core::system::System`] instance
//! 2. Load a program ROM (and optionally a BIOS image)
//! 3. Call [`core::system::System::reset`] and drive frames
//!
//! # Modules
//!
//! - [`core::cpu`]: Motorola 68000 CPU emulation (block-compiling interpreter)
//! - [`core::memory`]: Memory bus and 24-bit address decoding
//! - [`core::interrupt`]: Interrupt line controller
//! - [`core::system`]: System integration and frame loop
//!
//! # Error Handling
//!
//! All fallible operations return [`core::error::Result<T>`] which is an alias for
//! `Result<T, EmulatorError>`.

pub mod core;

// Re-export commonly used types
pub use core::error::{EmulatorError, Result};
