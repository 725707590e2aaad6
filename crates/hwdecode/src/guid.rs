// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies
#![forbid(unsafe_code)]

use core::{fmt, result::Result, str::FromStr};

/// A 128-bit decode profile identifier in the platform's GUID layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    pub const NULL: Guid = Guid::from_u128(0);

    /// Builds a GUID from its canonical big-endian value, so
    /// `0x1b81be68_a0c7_11d3_b984_00c04f2e73c5` reads like the registry form.
    pub const fn from_u128(val: u128) -> Guid {
        Guid {
            data1: (val >> 96) as u32,
            data2: (val >> 80 & 0xffff) as u16,
            data3: (val >> 64 & 0xffff) as u16,
            data4: (val as u64).to_be_bytes(),
        }
    }

    pub const fn to_u128(self) -> u128 {
        ((self.data1 as u128) << 96)
            | ((self.data2 as u128) << 80)
            | ((self.data3 as u128) << 64)
            | (u64::from_be_bytes(self.data4) as u128)
    }

    pub fn is_null(&self) -> bool {
        *self == Guid::NULL
    }
}

impl From<u128> for Guid {
    fn from(val: u128) -> Guid {
        Guid::from_u128(val)
    }
}

impl From<Guid> for u128 {
    fn from(val: Guid) -> Self {
        val.to_u128()
    }
}

/// Error returned when a string is not a GUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGuidError;

impl fmt::Display for ParseGuidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str("expected a GUID of the form {xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx}")
    }
}

impl std::error::Error for ParseGuidError {}

impl FromStr for Guid {
    type Err = ParseGuidError;

    /// Accepts the registry form with or without braces, in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_prefix('{')
            .and_then(|inner| inner.strip_suffix('}'))
            .unwrap_or(s);

        let groups: Vec<&str> = s.split('-').collect();
        let lengths = [8, 4, 4, 4, 12];
        if groups.len() != lengths.len()
            || groups
                .iter()
                .zip(lengths)
                .any(|(group, len)| {
                    group.len() != len || !group.bytes().all(|b| b.is_ascii_hexdigit())
                })
        {
            return Err(ParseGuidError);
        }

        let hex: String = groups.concat();
        u128::from_str_radix(&hex, 16)
            .map(Guid::from_u128)
            .map_err(|_| ParseGuidError)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let d = self.data4;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("Guid")
            .field(&format_args!("{}", self))
            .finish()
    }
}
