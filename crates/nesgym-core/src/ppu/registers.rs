//! PPUCTRL, PPUMASK and PPUSTATUS register files.

use bitflags::bitflags;

bitflags! {
    /// PPUCTRL ($2000), write only.
    ///
    /// ```text
    /// 7  bit  0
    /// VPHB SINN
    /// |||| ||++- base nametable
    /// |||| |+--- VRAM increment (0: +1, 1: +32)
    /// |||| +---- sprite pattern table (8x8 mode)
    /// |||+------ background pattern table
    /// ||+------- sprite size (0: 8x8, 1: 8x16)
    /// |+-------- master/slave (unused)
    /// +--------- NMI at start of vblank
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PpuCtrl: u8 {
        /// Nametable select, low bit.
        const NAMETABLE_X = 1 << 0;
        /// Nametable select, high bit.
        const NAMETABLE_Y = 1 << 1;
        /// PPUDATA address increment step.
        const INCREMENT = 1 << 2;
        /// Sprite pattern table for 8x8 sprites.
        const SPRITE_TABLE = 1 << 3;
        /// Background pattern table.
        const BG_TABLE = 1 << 4;
        /// 8x16 sprites when set.
        const SPRITE_SIZE = 1 << 5;
        /// Master/slave select, unused on the NES.
        const MASTER_SLAVE = 1 << 6;
        /// Raise NMI when vblank begins.
        const NMI_ENABLE = 1 << 7;
    }
}

impl PpuCtrl {
    /// Base nametable bits (0-3).
    #[inline]
    pub fn nametable(self) -> u8 {
        self.bits() & 0x03
    }

    /// PPUDATA increment: 1 across, 32 down.
    #[inline]
    pub fn vram_step(self) -> u16 {
        if self.contains(Self::INCREMENT) { 32 } else { 1 }
    }

    /// Pattern table base for 8x8 sprites.
    #[inline]
    pub fn sprite_table_addr(self) -> u16 {
        if self.contains(Self::SPRITE_TABLE) { 0x1000 } else { 0x0000 }
    }

    /// Pattern table base for the background.
    #[inline]
    pub fn bg_table_addr(self) -> u16 {
        if self.contains(Self::BG_TABLE) { 0x1000 } else { 0x0000 }
    }

    /// Sprite height in scanlines, 8 or 16.
    #[inline]
    pub fn sprite_height(self) -> u8 {
        if self.contains(Self::SPRITE_SIZE) { 16 } else { 8 }
    }

    /// Whether vblank raises an NMI.
    #[inline]
    pub fn nmi_enabled(self) -> bool {
        self.contains(Self::NMI_ENABLE)
    }
}

bitflags! {
    /// PPUMASK ($2001), write only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PpuMask: u8 {
        /// Grayscale output.
        const GRAYSCALE = 1 << 0;
        /// Show background in the leftmost 8 columns.
        const BG_LEFT = 1 << 1;
        /// Show sprites in the leftmost 8 columns.
        const SPRITE_LEFT = 1 << 2;
        /// Background enable.
        const SHOW_BG = 1 << 3;
        /// Sprite enable.
        const SHOW_SPRITES = 1 << 4;
        /// Emphasize red.
        const EMPHASIZE_RED = 1 << 5;
        /// Emphasize green.
        const EMPHASIZE_GREEN = 1 << 6;
        /// Emphasize blue.
        const EMPHASIZE_BLUE = 1 << 7;
    }
}

impl PpuMask {
    /// Rendering is on when either layer is enabled.
    #[inline]
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BG | Self::SHOW_SPRITES)
    }

    /// Background layer enabled.
    #[inline]
    pub fn show_bg(self) -> bool {
        self.contains(Self::SHOW_BG)
    }

    /// Sprite layer enabled.
    #[inline]
    pub fn show_sprites(self) -> bool {
        self.contains(Self::SHOW_SPRITES)
    }

    /// Background visible in the leftmost 8 columns.
    #[inline]
    pub fn bg_left(self) -> bool {
        self.contains(Self::BG_LEFT)
    }

    /// Sprites visible in the leftmost 8 columns.
    #[inline]
    pub fn sprite_left(self) -> bool {
        self.contains(Self::SPRITE_LEFT)
    }

    /// Grayscale palette mask active.
    #[inline]
    pub fn grayscale(self) -> bool {
        self.contains(Self::GRAYSCALE)
    }
}

bitflags! {
    /// PPUSTATUS ($2002), read only; the low five bits are open bus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PpuStatus: u8 {
        /// More than eight sprites matched a scanline.
        const SPRITE_OVERFLOW = 1 << 5;
        /// Opaque sprite-0 pixel overlapped an opaque background pixel.
        const SPRITE_ZERO_HIT = 1 << 6;
        /// Inside vertical blank.
        const VBLANK = 1 << 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_derived_values() {
        assert_eq!(PpuCtrl::empty().vram_step(), 1);
        assert_eq!(PpuCtrl::INCREMENT.vram_step(), 32);
        assert_eq!(PpuCtrl::empty().sprite_height(), 8);
        assert_eq!(PpuCtrl::SPRITE_SIZE.sprite_height(), 16);
        assert_eq!(PpuCtrl::BG_TABLE.bg_table_addr(), 0x1000);
        assert_eq!(
            (PpuCtrl::NAMETABLE_X | PpuCtrl::NAMETABLE_Y).nametable(),
            3
        );
    }

    #[test]
    fn mask_rendering_enable() {
        assert!(!PpuMask::empty().rendering_enabled());
        assert!(PpuMask::SHOW_BG.rendering_enabled());
        assert!(PpuMask::SHOW_SPRITES.rendering_enabled());
    }
}
