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

//! CPU execution tracer for debugging
//!
//! Logs one line per instruction to a file: PC, raw opcode, disassembly and
//! a few registers. Tracing forces the single-step path, so only enable it
//! when hunting a problem.

use std::fs::File;
use std::io::Write;

use super::{Cpu, Disassembler};
use crate::core::error::Result;
use crate::core::memory::{Bus, ADDR_MASK};

/// CPU execution tracer
///
/// # Example
/// ```no_run
/// use neorx::core::cpu::{Cpu, CpuTracer};
/// use neorx::core::memory::Bus;
///
/// let mut cpu = Cpu::new();
/// let mut bus = Bus::new();
/// let mut tracer = CpuTracer::new("trace.log").unwrap();
///
/// tracer.trace(&cpu, &bus).unwrap();
/// cpu.step(&mut bus);
/// ```
pub struct CpuTracer {
    /// Enable/disable tracing
    enabled: bool,
    /// Output file handle
    output: File,
}

impl CpuTracer {
    /// Create a tracer writing to `path` (truncates an existing file)
    pub fn new(path: &str) -> Result<Self> {
        let output = File::create(path)?;
        Ok(Self {
            enabled: true,
            output,
        })
    }

    /// Enable or disable tracing
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// True when tracing is active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Write one trace line for the instruction the CPU is about to run
    pub fn trace(&mut self, cpu: &Cpu, bus: &Bus) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let pc = cpu.regs.pc & ADDR_MASK;
        writeln!(
            self.output,
            "{pc:06X}  {:04X}  {:<28} d0={:08X} d1={:08X} a0={:08X} a7={:08X} sr={:04X}",
            bus.read_word(pc),
            Disassembler::disassemble(bus, pc),
            cpu.regs.d[0],
            cpu.regs.d[1],
            cpu.regs.a[0],
            cpu.regs.a[7],
            cpu.regs.sr.bits(),
        )?;
        Ok(())
    }
}
