//! CPU status register (P).
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! ```
//!
//! B (bit 4) and U (bit 5) are not backed by hardware storage; they only
//! appear in copies of P pushed to the stack. This implementation keeps U
//! permanently set in the live register so the readable byte matches what
//! debuggers (and nestest) expect, and masks B according to the push source.

use bitflags::bitflags;

bitflags! {
    /// CPU status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable (masks IRQ, never NMI).
        const I = 1 << 2;
        /// Decimal mode. Settable, but the 2A03 ALU ignores it.
        const D = 1 << 3;
        /// Break marker, present only in pushed copies (1 from PHP/BRK).
        const B = 1 << 4;
        /// Unused bit, always 1 in pushed copies.
        const U = 1 << 5;
        /// Overflow.
        const V = 1 << 6;
        /// Negative.
        const N = 1 << 7;
    }
}

impl Status {
    /// Register state at power-on: interrupts disabled.
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Set or clear the zero and negative flags from a result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set_flag(Self::Z, value == 0);
        self.set_flag(Self::N, value & 0x80 != 0);
    }

    /// Set or clear a single flag.
    #[inline]
    pub fn set_flag(&mut self, flag: Self, value: bool) {
        if value {
            *self |= flag;
        } else {
            *self &= !flag;
        }
    }

    /// Byte pushed onto the stack. U is always set; B is set for PHP and
    /// BRK pushes, clear for IRQ and NMI pushes.
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, brk: bool) -> u8 {
        let bits = self.bits() | Self::U.bits();
        if brk { bits | Self::B.bits() } else { bits }
    }

    /// Register value loaded from a stack byte: B cleared, U forced set.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}
