// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Decode profile and output format negotiation.
//!
//! The negotiator walks [`MODES`] in preference order and returns the first
//! profile the hardware supports together with the first render target
//! format of the requested bit-depth class. It never talks to a device; the
//! supported profile list and the per-profile render target query are
//! supplied by the caller.

use crate::{
    codec::Codec,
    fourcc::{BitDepthClass, FourCC},
    guid::Guid,
    modes::{self, DecodeProfile, MODES},
    Error,
};

/// Result of a successful negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedFormat {
    pub profile: &'static DecodeProfile,
    /// Render target format the decoder writes
    pub format: FourCC,
    pub high_bit_depth: bool,
}

impl NegotiatedFormat {
    pub fn profile_guid(&self) -> Guid {
        self.profile.guid
    }
}

/// Logs every profile the hardware reports, named from the mode table.
pub fn log_supported_profiles(supported: &[Guid]) {
    log::debug!("Decoder GUIDs reported as supported:");
    for (guid, mode) in modes::describe_profiles(supported) {
        match mode {
            Some(mode) => log::debug!("  {} {}", mode.name, guid),
            None => log::debug!("  Unknown GUID: {}", guid),
        }
    }
}

/// Whether a table entry may serve `codec` at the requested bit depth.
fn is_candidate(mode: &DecodeProfile, codec: Codec, high_bit_depth: bool) -> bool {
    if mode.codec != Some(codec) {
        return false;
    }
    // Codecs with per-depth profiles must match the depth exactly
    !codec.has_depth_profiles() || mode.high_bit_depth == high_bit_depth
}

/// Picks the decode profile and output format for `codec`.
///
/// `render_targets` is called for each surviving candidate, in preference
/// order, and returns the output formats the hardware can render that
/// profile to. A failing query skips the candidate.
pub fn negotiate<F>(
    codec: Codec,
    high_bit_depth: bool,
    supported: &[Guid],
    mut render_targets: F,
) -> Result<NegotiatedFormat, Error>
where
    F: FnMut(&DecodeProfile) -> Result<Vec<FourCC>, Error>,
{
    let wanted = BitDepthClass::from_high_bit_depth(high_bit_depth);

    for mode in MODES.iter() {
        if !is_candidate(mode, codec, high_bit_depth) || !supported.contains(&mode.guid) {
            continue;
        }

        log::debug!("Trying to use {} as input", mode.name);
        let targets = match render_targets(mode) {
            Ok(targets) => targets,
            Err(err) => {
                log::error!("Unable to retrieve decoder render targets: {}", err);
                continue;
            }
        };

        for target in &targets {
            log::debug!("  render target {}", target);
        }

        if let Some(format) = targets
            .iter()
            .copied()
            .find(|target| target.bit_depth_class() == Some(wanted))
        {
            log::info!("Selected {} with output {}", mode.name, format);
            return Ok(NegotiatedFormat {
                profile: mode,
                format,
                high_bit_depth,
            });
        }
    }

    log::error!("No decoder device for {} is able to decode to a matching output", codec);
    Err(Error::NoCompatibleProfile)
}

/// Negotiation used when no decoder service is bound: the first selectable
/// profile for the codec and the default format for the bit depth.
pub fn assume(codec: Codec, high_bit_depth: bool) -> Result<NegotiatedFormat, Error> {
    MODES
        .iter()
        .find(|mode| is_candidate(mode, codec, high_bit_depth))
        .map(|profile| NegotiatedFormat {
            profile,
            format: FourCC::default_for(BitDepthClass::from_high_bit_depth(high_bit_depth)),
            high_bit_depth,
        })
        .ok_or(Error::NoCompatibleProfile)
}
