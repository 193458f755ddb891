use core::fmt;

use enumflags2::{BitFlags, bitflags};

use crate::Error;

#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Execute = 0b001,
    Write = 0b010,
    Read = 0b100,
}

/// Read/write/execute bitmask carried by every directory entry.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions(BitFlags<Permission>);

impl Permissions {
    pub const NONE: Self = Self(BitFlags::EMPTY);

    pub const ALL: Self = Self(BitFlags::ALL);

    /// Unknown high bits are dropped.
    pub fn from_bits_truncate(bits: u8) -> Self {
        Self(BitFlags::from_bits_truncate(bits))
    }

    /// Parses a single octal digit, `0` to `7`.
    pub fn from_mode(mode: &str) -> Result<Self, Error> {
        match u8::from_str_radix(mode.trim(), 8) {
            Ok(bits @ 0..=7) => Ok(Self::from_bits_truncate(bits)),
            _ => Err(Error::InvalidArgument),
        }
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0.bits()
    }

    #[inline]
    pub fn contains(self, perm: Permission) -> bool {
        self.0.contains(perm)
    }

    /// `Ok` if `perm` is granted, [`Error::AccessDenied`] otherwise.
    pub fn require(self, perm: Permission) -> Result<(), Error> {
        if self.contains(perm) {
            Ok(())
        } else {
            Err(Error::AccessDenied)
        }
    }
}

/// `rwx` notation, `-` for a missing bit.
impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (perm, c) in [
            (Permission::Read, 'r'),
            (Permission::Write, 'w'),
            (Permission::Execute, 'x'),
        ] {
            let c = if self.contains(perm) { c } else { '-' };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permissions({self})")
    }
}
