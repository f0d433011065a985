//! NES emulation core with a frame-stepped environment facade.
//!
//! The crate integrates the [`nesgym_cpu`] interpreter with the PPU, the
//! system bus, a cartridge seam and the controller ports into one owned
//! [`Machine`], and wraps it in an [`Environment`] suitable for
//! reinforcement learning: one `step(action)` emulates one frame and the
//! observation is the 256x240 framebuffer.
//!
//! # Architecture
//!
//! ```text
//! Environment ── owns ──> Machine
//!                          ├─ Cpu (nesgym-cpu)
//!                          └─ NesBus
//!                              ├─ 2 KiB work RAM
//!                              ├─ Ppu (nametable/palette/OAM RAM, pipeline)
//!                              ├─ ApuStub
//!                              ├─ Box<dyn Cartridge>
//!                              ├─ Joypad (2 ports)
//!                              └─ Box<dyn FrameSink>
//! ```
//!
//! The CPU is the timing master: every one of its memory accesses first
//! ticks the bus, which steps the PPU three dots, so the interleaving of
//! the two chips matches hardware order exactly. Snapshots (`backup` /
//! `restore`) are plain deep clones of the machine value.
//!
//! # Example
//!
//! ```no_run
//! use nesgym_core::Environment;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut env = Environment::new("game.nes")?;
//! env.backup();
//! for _ in 0..60 {
//!     env.step(0b0000_0001); // hold A for a second
//! }
//! let observation = env.frame();
//! # let _ = observation;
//! env.restore();
//! # Ok(())
//! # }
//! ```

mod apu;
mod bus;
pub mod cartridge;
mod env;
mod frame;
mod input;
mod machine;
pub mod palette;
mod ppu;

pub use apu::ApuStub;
pub use bus::NesBus;
pub use cartridge::{
    load_cartridge, Cartridge, Cnrom, Mirroring, Nrom, Rom, RomError, RomHeader, Uxrom,
};
pub use env::{EnvError, Environment};
pub use frame::{BufferSink, FrameSink, FRAME_HEIGHT, FRAME_SIZE, FRAME_WIDTH};
pub use input::{Button, Joypad};
pub use machine::Machine;
pub use ppu::{Ppu, PpuCtrl, PpuMask, PpuStatus, Scroll, Sprite};

// The CPU crate's surface, re-exported for integrators.
pub use nesgym_cpu::{Bus, Cpu, Interrupt, Status, TOTAL_CYCLES};
