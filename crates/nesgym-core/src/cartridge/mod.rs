//! Cartridge capability and the shipped mapper implementations.
//!
//! The core consumes cartridges through the [`Cartridge`] trait: PRG-space
//! access from the CPU bus, CHR-space access from the PPU, the per-scanline
//! signal some mappers count for IRQs, and the nametable mirroring the board
//! wires. Snapshots clone the live mapper through [`Cartridge::clone_box`],
//! which is what carries bank registers, PRG-RAM and CHR-RAM across
//! backup/restore.

mod cnrom;
mod nrom;
mod rom;
mod uxrom;

pub use cnrom::Cnrom;
pub use nrom::Nrom;
pub use rom::{Rom, RomError, RomHeader};
pub use uxrom::Uxrom;

/// Nametable mirroring arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000/$2800 share a table, $2400/$2C00 share the other.
    Vertical,
    /// $2000/$2400 share a table, $2800/$2C00 share the other.
    Horizontal,
    /// Every nametable maps to the first 1 KiB page.
    SingleScreen0,
    /// Every nametable maps to the second 1 KiB page.
    SingleScreen1,
    /// Four-screen boards; folded onto the 2 KiB of console VRAM.
    FourScreen,
}

/// Cartridge seam between the buses and the mapper hardware.
pub trait Cartridge {
    /// CPU-space read, $4018-$FFFF.
    fn read_prg(&self, addr: u16) -> u8;

    /// CPU-space write: PRG-RAM stores or mapper register writes.
    fn write_prg(&mut self, addr: u16, value: u8);

    /// PPU-space read, $0000-$1FFF.
    fn read_chr(&self, addr: u16) -> u8;

    /// PPU-space write; effective only on CHR-RAM boards.
    fn write_chr(&mut self, addr: u16, value: u8);

    /// Nametable mirroring wired by the board.
    fn mirroring(&self) -> Mirroring;

    /// Called by the PPU at dot 260 of every rendered scanline, for mappers
    /// that count scanlines.
    fn signal_scanline(&mut self) {}

    /// Level of the mapper's IRQ output.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Deep copy for machine snapshots.
    fn clone_box(&self) -> Box<dyn Cartridge>;
}

impl Clone for Box<dyn Cartridge> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Parse an iNES image and build the matching mapper.
///
/// # Errors
///
/// Returns a [`RomError`] when the image is malformed or uses a mapper this
/// crate does not ship.
pub fn load_cartridge(data: &[u8]) -> Result<Box<dyn Cartridge>, RomError> {
    let rom = Rom::parse(data)?;
    log::info!(
        "loaded iNES image: mapper {}, {} KiB PRG, {} KiB CHR, {:?} mirroring",
        rom.header.mapper,
        rom.header.prg_rom_size / 1024,
        rom.header.chr_rom_size / 1024,
        rom.header.mirroring,
    );
    match rom.header.mapper {
        0 => Ok(Box::new(Nrom::new(&rom))),
        2 => Ok(Box::new(Uxrom::new(&rom))),
        3 => Ok(Box::new(Cnrom::new(&rom))),
        mapper => Err(RomError::UnsupportedMapper(mapper)),
    }
}
