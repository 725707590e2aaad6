// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use hwdecode::codec::{profile, Codec, MAX_DIMENSION};

/// Parse resolution string in format "WxH" or "W*H"
pub fn parse_resolution(s: &str) -> Result<(u32, u32), CliError> {
    let (width_str, height_str) = s
        .split_once('x')
        .or_else(|| s.split_once('*'))
        .ok_or_else(|| {
            CliError::InvalidArgs(format!(
                "Invalid resolution format (expected WxH or W*H): {}",
                s
            ))
        })?;

    let width = width_str
        .trim()
        .parse::<u32>()
        .map_err(|_| CliError::InvalidArgs(format!("Invalid width in resolution: {}", s)))?;
    let height = height_str
        .trim()
        .parse::<u32>()
        .map_err(|_| CliError::InvalidArgs(format!("Invalid height in resolution: {}", s)))?;

    if width == 0 || height == 0 {
        return Err(CliError::InvalidArgs(format!(
            "Resolution dimensions must be positive: {}",
            s
        )));
    }

    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CliError::InvalidArgs(format!(
            "Resolution dimensions must not exceed {}: {}",
            MAX_DIMENSION, s
        )));
    }

    Ok((width, height))
}

/// Parse a stream profile given by name ("main", "high", "main10", ...) or
/// by its numeric codec value.
pub fn parse_profile(codec: Codec, s: &str) -> Result<i32, CliError> {
    if let Ok(value) = s.trim().parse::<i32>() {
        return Ok(value);
    }

    let name = s.trim().to_ascii_lowercase();
    let value = match (codec, name.as_str()) {
        (Codec::H264, "baseline") => Some(profile::H264_BASELINE),
        (Codec::H264, "constrained-baseline") => {
            Some(profile::H264_BASELINE | profile::H264_CONSTRAINED)
        }
        (Codec::H264, "main") => Some(profile::H264_MAIN),
        (Codec::H264, "high") => Some(profile::H264_HIGH),
        (Codec::H264, "high10") => Some(profile::H264_HIGH_10),
        (Codec::Hevc, "main") => Some(profile::HEVC_MAIN),
        (Codec::Hevc, "main10") => Some(profile::HEVC_MAIN_10),
        (Codec::Hevc, "rext") => Some(profile::HEVC_REXT),
        (Codec::Vc1 | Codec::Wmv3, "simple") => Some(profile::VC1_SIMPLE),
        (Codec::Vc1 | Codec::Wmv3, "main") => Some(profile::VC1_MAIN),
        (Codec::Vc1 | Codec::Wmv3, "complex") => Some(profile::VC1_COMPLEX),
        (Codec::Vc1 | Codec::Wmv3, "advanced") => Some(profile::VC1_ADVANCED),
        _ => None,
    };

    value.ok_or_else(|| {
        CliError::InvalidArgs(format!("Unknown {} profile: {}", codec.name(), s))
    })
}

/// Parse a vendor or device id given as decimal or 0x-prefixed hex.
pub fn parse_id(s: &str) -> Result<u32, CliError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|_| CliError::InvalidArgs(format!("Invalid id: {}", s)))
}
