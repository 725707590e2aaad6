// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Decoder configuration scoring.

use crate::{codec::Codec, guid::Guid, Error};

/// Bitstream encryption GUID meaning "no encryption".
pub const DXVA2_NO_ENCRYPT: Guid = Guid::from_u128(0x1b81bed0_a0c7_11d3_b984_00c04f2e73c5);

/// One decoder configuration offered by the hardware for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderConfig {
    pub bitstream_encryption: Guid,
    /// 1 for raw bitstream buffers, 2 for short-format H.264 slices
    pub bitstream_raw: u32,
    /// Fewest render targets the decoder accepts
    pub min_render_targets: u32,
}

impl DecoderConfig {
    pub fn new(bitstream_raw: u32, bitstream_encryption: Guid) -> Self {
        DecoderConfig {
            bitstream_encryption,
            bitstream_raw,
            min_render_targets: 0,
        }
    }

    pub fn with_min_render_targets(self, min_render_targets: u32) -> Self {
        DecoderConfig {
            min_render_targets,
            ..self
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.bitstream_encryption != DXVA2_NO_ENCRYPT
    }

    /// Score for decoding `codec`; zero means unusable.
    pub fn score(&self, codec: Codec) -> u32 {
        let base = match self.bitstream_raw {
            1 => 1,
            2 if codec == Codec::H264 => 2,
            _ => return 0,
        };
        if self.is_encrypted() {
            base
        } else {
            base + 16
        }
    }
}

/// Picks the highest scoring configuration; ties keep the earlier one.
pub fn select_best(codec: Codec, configs: &[DecoderConfig]) -> Result<DecoderConfig, Error> {
    let mut best: Option<(u32, &DecoderConfig)> = None;
    for config in configs {
        let score = config.score(codec);
        log::trace!("config {:?} scores {}", config, score);
        if score > best.map_or(0, |(best_score, _)| best_score) {
            best = Some((score, config));
        }
    }

    match best {
        Some((_, config)) => Ok(*config),
        None => {
            log::error!("No matching decoder configuration available");
            Err(Error::NoUsableConfig)
        }
    }
}
