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

//! CPU core benchmarks: cached block execution versus single stepping

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use neorx::core::cpu::Cpu;
use neorx::core::memory::Bus;

/// A ROM loop: 30 NOPs followed by a branch back to the start
fn nop_loop_rom(bus: &mut Bus, base: u32) {
    let mut addr = base;
    for _ in 0..30 {
        bus.patch_rom_word(addr, 0x4E71);
        addr += 2;
    }
    // BRA.W back to base
    bus.patch_rom_word(addr, 0x6000);
    let disp = base.wrapping_sub(addr + 2) as u16;
    bus.patch_rom_word(addr + 2, disp);
}

fn bench_cached_execution(c: &mut Criterion) {
    let mut bus = Bus::new();
    nop_loop_rom(&mut bus, 0x20_0000);

    let mut cpu = Cpu::new();
    cpu.regs.pc = 0x20_0000;
    // Warm the cache so the loop measures steady-state block replay
    cpu.execute(&mut bus, 1_000);

    c.bench_function("execute_cached_blocks_100k", |b| {
        b.iter(|| {
            let overrun = cpu.execute(&mut bus, black_box(100_000));
            black_box(overrun)
        })
    });
}

fn bench_single_stepping(c: &mut Criterion) {
    let mut bus = Bus::new();
    nop_loop_rom(&mut bus, 0x20_0000);

    let mut cpu = Cpu::new();
    cpu.regs.pc = 0x20_0000;

    c.bench_function("step_100k_clocks", |b| {
        b.iter(|| {
            let mut spent = 0u32;
            while spent < 100_000 {
                spent += cpu.step(&mut bus);
            }
            black_box(spent)
        })
    });
}

fn bench_ram_execution(c: &mut Criterion) {
    let mut bus = Bus::new();
    // The same loop in work RAM, where every pass re-decodes
    let base = 0x10_0000;
    let mut addr = base;
    for _ in 0..30 {
        bus.write_word(addr, 0x4E71);
        addr += 2;
    }
    bus.write_word(addr, 0x6000);
    bus.write_word(addr + 2, base.wrapping_sub(addr + 2) as u16);

    let mut cpu = Cpu::new();
    cpu.regs.pc = base;

    c.bench_function("execute_uncached_ram_100k", |b| {
        b.iter(|| {
            let overrun = cpu.execute(&mut bus, black_box(100_000));
            black_box(overrun)
        })
    });
}

criterion_group!(
    benches,
    bench_cached_execution,
    bench_single_stepping,
    bench_ram_execution
);
criterion_main!(benches);
