//! Frame-stepped environment facade.
//!
//! The surface an RL wrapper drives: load a ROM, then repeat
//! `step(action)` to emulate one frame per call and read the framebuffer
//! as the observation. `backup`/`restore` snapshot the whole machine so an
//! agent can branch and rewind deterministically.

use std::fs;
use std::path::Path;

use crate::cartridge::{load_cartridge, Cartridge, RomError};
use crate::frame::{BufferSink, FRAME_SIZE};
use crate::machine::Machine;

/// Errors surfaced while constructing an environment.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// The ROM file could not be read.
    #[error("failed to read ROM image: {0}")]
    Io(#[from] std::io::Error),

    /// The ROM image could not be parsed or is unsupported.
    #[error(transparent)]
    Rom(#[from] RomError),
}

/// A NES as a reinforcement-learning environment.
///
/// The action byte maps one bit per button, bit 0 first:
/// A, B, Select, Start, Up, Down, Left, Right; 1 means pressed.
pub struct Environment {
    /// Pristine cartridge image, cloned on every reset.
    cart_image: Box<dyn Cartridge>,
    machine: Machine,
    backup: Option<Machine>,
}

impl Environment {
    /// Load an iNES ROM from disk and power the machine.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, the image is malformed, or its
    /// mapper is unsupported.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, EnvError> {
        Ok(Self::from_bytes(&fs::read(path)?)?)
    }

    /// Build an environment from an in-memory iNES image.
    ///
    /// # Errors
    ///
    /// Fails when the image is malformed or its mapper is unsupported.
    pub fn from_bytes(data: &[u8]) -> Result<Self, RomError> {
        let cart_image = load_cartridge(data)?;
        let mut env = Self {
            machine: Machine::new(cart_image.clone(), Box::new(BufferSink::new())),
            cart_image,
            backup: None,
        };
        env.machine.power();
        Ok(env)
    }

    /// Discard all progress and boot a fresh machine from the pristine
    /// cartridge. The backup slot is left untouched.
    pub fn reset(&mut self) {
        self.machine = Machine::new(self.cart_image.clone(), Box::new(BufferSink::new()));
        self.machine.power();
    }

    /// Apply the action to controller 0 and emulate one frame.
    pub fn step(&mut self, action: u8) {
        self.machine.set_buttons(0, action);
        self.machine.run_frame();
    }

    /// Snapshot the machine into the backup slot.
    pub fn backup(&mut self) {
        self.backup = Some(self.machine.clone());
    }

    /// Replace the machine with the backup snapshot. Without a prior
    /// [`Environment::backup`] this is a no-op.
    pub fn restore(&mut self) {
        if let Some(backup) = &self.backup {
            self.machine = backup.clone();
        }
    }

    /// The observation: the framebuffer of the last completed frame.
    #[must_use]
    pub fn frame(&self) -> &[u32; FRAME_SIZE] {
        self.machine.frame()
    }

    /// Side-effect-free memory read, for reward extraction.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        self.machine.peek(addr)
    }

    /// Direct RAM store, for memory hacks.
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.machine.poke(addr, value);
    }

    /// The live machine.
    #[must_use]
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// The live machine, mutably.
    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }
}
