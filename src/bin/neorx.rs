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

//! Headless Neo Geo runner
//!
//! Loads a program ROM (and optionally a BIOS), runs a number of frames,
//! then dumps the CPU state. Useful for regression runs and profiling the
//! CPU core without any video output.

use clap::Parser;
use std::path::PathBuf;

use neorx::core::config::Config;
use neorx::core::system::System;

#[derive(Parser)]
#[command(name = "neorx", version, about = "Neo Geo emulator (headless runner)")]
struct Args {
    /// Program ROM image
    rom: Option<PathBuf>,

    /// System BIOS image
    #[arg(long)]
    bios: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames to run
    #[arg(long)]
    frames: Option<u32>,

    /// Write a per-instruction trace to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Print block-cache statistics after the run
    #[arg(long)]
    stats: bool,

    /// Write a save state to this file after the run
    #[arg(long)]
    save_state: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    // File configuration first, command line on top
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if args.rom.is_some() {
        config.rom = args.rom.clone();
    }
    if args.bios.is_some() {
        config.bios = args.bios.clone();
    }
    if let Some(frames) = args.frames {
        config.frames = frames;
    }
    if args.trace.is_some() {
        config.trace_file = args.trace.clone();
    }
    config.dump_stats |= args.stats;

    let Some(rom) = &config.rom else {
        eprintln!("no program ROM given (argument or config file)");
        std::process::exit(1);
    };

    let mut system = System::new();
    system.load_rom(rom)?;
    if let Some(bios) = &config.bios {
        system.load_bios(bios)?;
    }
    if let Some(trace) = &config.trace_file {
        system.set_trace_output(&trace.to_string_lossy())?;
    }

    system.reset();
    log::info!("running {} frames", config.frames);

    for _ in 0..config.frames {
        system.run_frame();
    }

    println!(
        "ran {} frames, {} CPU clocks",
        system.frames(),
        system.cpu().clocks()
    );
    system.dump_registers();
    if config.dump_stats {
        system.dump_cache_stats();
    }

    if let Some(path) = &args.save_state {
        system.save_state_to(path)?;
        log::info!("save state written to {}", path.display());
    }

    Ok(())
}
