// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies
//
// Derived from https://docs.rs/crate/four-cc/latest, adapted for surface
// format codes which the platform stores as little-endian integers.
#![forbid(unsafe_code)]

use core::{fmt, result::Result, str::FromStr};

/// Sample width grouping used to match decoder output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepthClass {
    /// 8-bit samples (NV12)
    Eight,
    /// 10-bit or 16-bit samples stored in 16-bit words (P010, P016)
    High,
}

impl BitDepthClass {
    pub fn from_high_bit_depth(high_bit_depth: bool) -> Self {
        if high_bit_depth {
            BitDepthClass::High
        } else {
            BitDepthClass::Eight
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C, packed)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const NV12: FourCC = FourCC(*b"NV12");
    pub const P010: FourCC = FourCC(*b"P010");
    pub const P016: FourCC = FourCC(*b"P016");

    /// The platform value: first character in the least significant byte,
    /// regardless of host endianness.
    pub const fn to_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    pub const fn from_u32(val: u32) -> FourCC {
        FourCC(val.to_le_bytes())
    }

    /// Bit-depth class of a decoder output format, `None` for formats the
    /// decoder never renders to.
    pub fn bit_depth_class(self) -> Option<BitDepthClass> {
        match self {
            FourCC::NV12 => Some(BitDepthClass::Eight),
            FourCC::P010 | FourCC::P016 => Some(BitDepthClass::High),
            _ => None,
        }
    }

    /// Default output format for a bit depth when no decoder service is
    /// available to ask.
    pub fn default_for(class: BitDepthClass) -> FourCC {
        match class {
            BitDepthClass::Eight => FourCC::NV12,
            BitDepthClass::High => FourCC::P010,
        }
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(buf: &[u8; 4]) -> FourCC {
        FourCC(*buf)
    }
}

impl From<u32> for FourCC {
    fn from(val: u32) -> FourCC {
        FourCC::from_u32(val)
    }
}

impl From<FourCC> for u32 {
    fn from(val: FourCC) -> Self {
        val.to_u32()
    }
}

/// Error returned when a string is not exactly four bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFourCCError;

impl fmt::Display for ParseFourCCError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str("FOURCC must be exactly 4 characters")
    }
}

impl std::error::Error for ParseFourCCError {}

impl FromStr for FourCC {
    type Err = ParseFourCCError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let buf: [u8; 4] = s.as_bytes().try_into().map_err(|_| ParseFourCCError)?;
        Ok(FourCC(buf))
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let b = self.0;
        match core::str::from_utf8(&b) {
            Ok(s) => f.write_str(s),
            // format!() panics on fmt::Error, so escape instead of failing
            Err(_) => f.write_fmt(format_args!(
                "{}{}{}{}",
                core::ascii::escape_default(b[0]),
                core::ascii::escape_default(b[1]),
                core::ascii::escape_default(b[2]),
                core::ascii::escape_default(b[3])
            )),
        }
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("FourCC")
            .field(&format_args!("{}", self))
            .finish()
    }
}
