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

//! System integration module
//!
//! Ties the CPU and the memory bus together and provides the frame loop:
//! a fixed cycle budget per frame, with the CPU's overrun carried into the
//! next frame so long-term timing stays honest. The VBlank line is raised
//! at each frame boundary.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::cpu::{Cpu, CpuState, CpuTracer};
use super::error::{EmulatorError, Result};
use super::interrupt::lines;
use super::memory::{Bus, BusState};

/// Main CPU clock on the Neo Geo board
pub const CPU_CLOCK_HZ: u32 = 12_000_000;

/// Nominal frame rate
pub const FRAMES_PER_SECOND: u32 = 60;

/// CPU clocks budgeted per frame
pub const CLOCKS_PER_FRAME: u32 = CPU_CLOCK_HZ / FRAMES_PER_SECOND;

/// Serializable machine state
///
/// Covers the register file and guest RAM; the compiled-block cache is
/// reproducible from ROM and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    pub cpu: CpuState,
    pub bus: BusState,
    pub frames: u64,
}

/// Neo Geo system
///
/// # Example
/// ```no_run
/// use neorx::core::system::System;
///
/// let mut system = System::new();
/// system.load_rom("game.p1")?;
/// system.reset();
/// for _ in 0..60 {
///     system.run_frame();
/// }
/// # Ok::<(), neorx::core::error::EmulatorError>(())
/// ```
pub struct System {
    /// CPU instance
    cpu: Cpu,
    /// Memory bus
    bus: Bus,
    /// Clocks the previous frame ran over its budget
    overrun: u32,
    /// Frames executed since reset
    frames: u64,
    /// Optional per-instruction tracer (forces the single-step path)
    tracer: Option<CpuTracer>,
}

impl System {
    /// Create a system with empty ROMs
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(),
            overrun: 0,
            frames: 0,
            tracer: None,
        }
    }

    /// Load the program ROM
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.bus.load_rom(path)
    }

    /// Load the system BIOS
    pub fn load_bios<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.bus.load_bios(path)
    }

    /// Cold-start the machine: CPU vectors fetched from ROM, counters reset
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.overrun = 0;
        self.frames = 0;
    }

    /// Attach a per-instruction tracer writing to `path`
    pub fn set_trace_output(&mut self, path: &str) -> Result<()> {
        self.tracer = Some(CpuTracer::new(path)?);
        Ok(())
    }

    /// Run one video frame worth of CPU time
    ///
    /// The previous frame's overrun is subtracted from this frame's budget.
    /// Returns this frame's overrun.
    pub fn run_frame(&mut self) -> u32 {
        let budget = CLOCKS_PER_FRAME.saturating_sub(self.overrun);
        self.overrun = if self.tracer.is_some() {
            self.run_budget_traced(budget)
        } else {
            self.cpu.execute(&mut self.bus, budget)
        };
        self.frames += 1;
        self.bus.interrupts_mut().raise(lines::VBLANK);
        self.overrun
    }

    /// Single-step budget loop used when tracing is active
    fn run_budget_traced(&mut self, budget: u32) -> u32 {
        let mut remaining = i64::from(budget);
        while remaining > 0 {
            if let Some(tracer) = &mut self.tracer {
                if let Err(err) = tracer.trace(&self.cpu, &self.bus) {
                    log::warn!("trace output failed: {err}");
                }
            }
            let clks = self.cpu.step(&mut self.bus);
            if clks == 0 {
                // Stopped and waiting for an interrupt: idle the frame
                return 0;
            }
            remaining -= i64::from(clks);
        }
        (-remaining) as u32
    }

    /// Execute a single instruction (traced if a tracer is attached)
    pub fn step(&mut self) -> u32 {
        if let Some(tracer) = &mut self.tracer {
            if let Err(err) = tracer.trace(&self.cpu, &self.bus) {
                log::warn!("trace output failed: {err}");
            }
        }
        self.cpu.step(&mut self.bus)
    }

    /// Run host-driven peripheral catch-up with interrupt delivery inhibited
    ///
    /// While the closure runs, interrupt requests latch instead of
    /// delivering; the CPU picks them up at its next block boundary.
    pub fn with_cpu_frozen<F: FnOnce(&mut Bus)>(&mut self, f: F) {
        self.cpu.set_frozen(true);
        f(&mut self.bus);
        self.cpu.set_frozen(false);
    }

    /// Frames executed since reset
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The CPU
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The CPU, mutably
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// The memory bus
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The memory bus, mutably
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Dump CPU registers to stdout
    pub fn dump_registers(&self) {
        self.cpu.dump_registers();
    }

    /// Dump block-cache chains to stdout
    pub fn dump_cache_stats(&self) {
        self.cpu.dump_cache_stats();
    }

    // -- Save states -------------------------------------------------------

    /// Serialize the machine state to a file
    pub fn save_state_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let state = SaveState {
            cpu: self.cpu.save_state(),
            bus: self.bus.save_state(),
            frames: self.frames,
        };
        let bytes = bincode::serde::encode_to_vec(&state, bincode::config::standard())
            .map_err(|err| EmulatorError::SaveState(err.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Restore machine state from a file (ROMs must already be loaded)
    pub fn load_state_from<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let (state, _): (SaveState, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|err| EmulatorError::SaveState(err.to_string()))?;
        self.cpu.load_state(state.cpu);
        self.bus.load_state(state.bus)?;
        self.frames = state.frames;
        self.overrun = 0;
        Ok(())
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A ROM whose reset vectors point at a tight idle loop
    fn idle_rom(system: &mut System) {
        let bus = system.bus_mut();
        bus.patch_rom_long(0, 0x0010_F000); // initial SSP
        bus.patch_rom_long(4, 0x0000_1000); // entry point
        bus.patch_rom_word(0x1000, 0x60FE); // BRA.S -2
        // VBlank handler: acknowledge and loop
        bus.patch_rom_long(0x60, 0x0000_2000);
        bus.patch_rom_word(0x2000, 0x60FE);
    }

    #[test]
    fn test_reset_loads_vectors() {
        let mut system = System::new();
        idle_rom(&mut system);
        system.reset();

        assert_eq!(system.cpu().regs.pc, 0x1000);
        assert_eq!(system.cpu().regs.sp(), 0x10_F000);
    }

    #[test]
    fn test_frame_budget_and_overrun_carry() {
        let mut system = System::new();
        idle_rom(&mut system);
        system.reset();

        let overrun = system.run_frame();
        // The idle loop is 10 clocks per block; a frame budget always
        // overshoots by less than one block
        assert!(overrun < 10);
        let total = system.cpu().clocks();
        assert_eq!(total, u64::from(CLOCKS_PER_FRAME) + u64::from(overrun));

        // Next frame compensates for the carry
        let overrun2 = system.run_frame();
        assert_eq!(
            system.cpu().clocks(),
            2 * u64::from(CLOCKS_PER_FRAME) + u64::from(overrun2)
        );
        assert_eq!(system.frames(), 2);
    }

    #[test]
    fn test_vblank_line_raised_each_frame() {
        let mut system = System::new();
        idle_rom(&mut system);
        system.reset();
        // Reset state masks all interrupts, so the line stays asserted
        system.run_frame();
        assert_eq!(system.bus().interrupt_level(), Some(lines::VBLANK));
    }

    #[test]
    fn test_frozen_window_latches_interrupts() {
        let mut system = System::new();
        idle_rom(&mut system);
        system.reset();
        system.cpu_mut().regs.set_sr(0x2000); // unmask

        system.with_cpu_frozen(|bus| {
            bus.interrupts_mut().raise(lines::TIMER);
        });
        // Not delivered during the window
        assert_eq!(system.cpu().pending(), 0);
        assert!(!system.cpu().frozen());

        // Delivered at the next block boundary
        system.bus_mut().patch_rom_long(0x64, 0x0000_2000);
        system.step();
        assert_eq!(system.cpu().regs.sr.interrupt_mask(), lines::TIMER);
    }

    #[test]
    fn test_save_state_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.bin");

        let mut system = System::new();
        idle_rom(&mut system);
        system.reset();
        system.run_frame();
        system.bus_mut().write_long(0x10_1000, 0xCAFE_F00D);

        let clocks = system.cpu().clocks();
        let pc = system.cpu().regs.pc;
        system.save_state_to(&path).unwrap();

        let mut restored = System::new();
        idle_rom(&mut restored);
        restored.reset();
        restored.load_state_from(&path).unwrap();

        assert_eq!(restored.cpu().clocks(), clocks);
        assert_eq!(restored.cpu().regs.pc, pc);
        assert_eq!(restored.bus().read_long(0x10_1000), 0xCAFE_F00D);
        assert_eq!(restored.frames(), 1);
        // The block cache is never persisted
        assert!(restored.cpu().cache().is_empty());
    }
}
