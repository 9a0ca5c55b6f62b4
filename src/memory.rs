use std::fmt::{Display, Formatter};

use anyhow::Error;

/// A guest address range that does not resolve to backing memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidRange {
    pub address: u32,
    pub length: usize,
}

impl Display for InvalidRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid guest range {:#010x}+{:#x}", self.address, self.length)
    }
}

impl std::error::Error for InvalidRange {}

/// Accessor for the emulated system's memory, where request payloads live.
pub trait GuestMemory {
    /// Resolves `length` bytes at `address`, or None if any part is unmapped.
    fn range_mut(&mut self, address: u32, length: usize) -> Option<&mut [u8]>;

    fn read_bytes(&mut self, address: u32, out: &mut [u8]) -> Result<(), Error> {
        let length = out.len();
        let range = self.range_mut(address, length).ok_or(InvalidRange { address, length })?;
        out.copy_from_slice(range);
        Ok(())
    }

    fn write_bytes(&mut self, address: u32, data: &[u8]) -> Result<(), Error> {
        let length = data.len();
        let range = self.range_mut(address, length).ok_or(InvalidRange { address, length })?;
        range.copy_from_slice(data);
        Ok(())
    }

    fn read_u8(&mut self, address: u32) -> Result<u8, Error> {
        let mut b = [0u8; 1];
        self.read_bytes(address, &mut b)?;
        Ok(b[0])
    }

    fn write_u8(&mut self, value: u8, address: u32) -> Result<(), Error> {
        self.write_bytes(address, &[value])
    }

    /// USB payloads are little endian.
    fn read_u16_le(&mut self, address: u32) -> Result<u16, Error> {
        let mut b = [0u8; 2];
        self.read_bytes(address, &mut b)?;
        Ok(u16::from_le_bytes(b))
    }

    fn write_u16_le(&mut self, value: u16, address: u32) -> Result<(), Error> {
        self.write_bytes(address, &value.to_le_bytes())
    }
}

/// A single contiguous block of guest RAM starting at `base`.
#[derive(Debug, Clone)]
pub struct GuestRam {
    base: u32,
    bytes: Vec<u8>,
}

impl GuestRam {
    pub fn new(base: u32, size: usize) -> GuestRam {
        GuestRam { base, bytes: vec![0u8; size] }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl GuestMemory for GuestRam {
    fn range_mut(&mut self, address: u32, length: usize) -> Option<&mut [u8]> {
        let start = address.checked_sub(self.base)? as usize;
        let end = start.checked_add(length)?;
        self.bytes.get_mut(start..end)
    }
}
