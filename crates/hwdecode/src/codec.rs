// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Stream parameters reported by the software codec.
//!
//! The codec library describes each stream through [`CodecParams`]: codec,
//! profile, reference frame count, coded size and pixel formats. These drive
//! the bit-depth decision, surface geometry and the stream support check
//! that runs before any hardware is touched.

use crate::Error;
use std::fmt;

/// Codecs with at least one selectable hardware decode profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Mpeg2Video,
    H264,
    Vc1,
    Wmv3,
    Hevc,
}

impl Codec {
    pub const ALL: [Codec; 5] = [
        Codec::Mpeg2Video,
        Codec::H264,
        Codec::Vc1,
        Codec::Wmv3,
        Codec::Hevc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Codec::Mpeg2Video => "mpeg2video",
            Codec::H264 => "h264",
            Codec::Vc1 => "vc1",
            Codec::Wmv3 => "wmv3",
            Codec::Hevc => "hevc",
        }
    }

    /// Whether the codec exposes separate decode profiles per bit depth, in
    /// which case the depth must match the profile exactly.
    pub fn has_depth_profiles(&self) -> bool {
        matches!(self, Codec::Hevc)
    }

    /// Surface dimension alignment required by the decoder for this codec.
    pub fn surface_alignment(&self) -> u32 {
        match self {
            // Intel needs the doubled alignment for MPEG-2; harmless elsewhere
            Codec::Mpeg2Video => SURFACE_BASE_ALIGN << 1,
            Codec::Hevc => 32,
            _ => SURFACE_BASE_ALIGN,
        }
    }

    /// Reference surfaces the codec may hold for prediction.
    pub fn reference_surfaces(&self) -> u32 {
        match self {
            Codec::H264 | Codec::Hevc => 16,
            _ => 2,
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mpeg2" | "mpeg2video" => Ok(Codec::Mpeg2Video),
            "h264" | "avc" => Ok(Codec::H264),
            "vc1" => Ok(Codec::Vc1),
            "wmv3" => Ok(Codec::Wmv3),
            "hevc" | "h265" => Ok(Codec::Hevc),
            _ => Err(Error::InvalidArgument("unknown codec")),
        }
    }
}

/// Base surface alignment in pixels (one macroblock).
pub const SURFACE_BASE_ALIGN: u32 = 16;

/// Largest coded width or height a hardware decoder accepts.
pub const MAX_DIMENSION: u32 = 16384;

/// Codec profile numbers as reported by the codec library.
pub mod profile {
    pub const UNKNOWN: i32 = -99;
    pub const H264_CONSTRAINED: i32 = 1 << 9;
    pub const H264_BASELINE: i32 = 66;
    pub const H264_MAIN: i32 = 77;
    pub const H264_HIGH: i32 = 100;
    pub const H264_HIGH_10: i32 = 110;
    pub const HEVC_MAIN: i32 = 1;
    pub const HEVC_MAIN_10: i32 = 2;
    pub const HEVC_REXT: i32 = 4;
    pub const VC1_SIMPLE: i32 = 0;
    pub const VC1_MAIN: i32 = 1;
    pub const VC1_COMPLEX: i32 = 2;
    pub const VC1_ADVANCED: i32 = 3;

    /// H.264 profiles up to High, ignoring the constraint flag.
    pub fn h264_supported(profile: i32) -> bool {
        (profile & !H264_CONSTRAINED) <= H264_HIGH
    }

    /// HEVC profiles up to Main10.
    pub fn hevc_supported(profile: i32) -> bool {
        profile <= HEVC_MAIN_10
    }
}

/// Pixel formats the codec library offers or reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// Not yet known
    #[default]
    None,
    Yuv420p,
    Yuvj420p,
    Yuv420p10,
    Nv12,
    /// Hardware surfaces decoded through this crate
    Dxva2Vld,
    /// Another hardware format this crate does not serve
    OtherHardware,
}

impl PixelFormat {
    pub fn is_hwaccel(&self) -> bool {
        matches!(self, PixelFormat::Dxva2Vld | PixelFormat::OtherHardware)
    }
}

/// Stream parameters as reported by the codec library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecParams {
    pub codec: Codec,
    pub profile: i32,
    /// Number of reference frames signalled by the stream
    pub refs: u32,
    pub coded_width: u32,
    pub coded_height: u32,
    /// Format currently negotiated with the codec (hardware or software)
    pub pix_fmt: PixelFormat,
    /// Underlying software format of the decoded samples
    pub sw_pix_fmt: PixelFormat,
}

impl CodecParams {
    pub fn new(codec: Codec, coded_width: u32, coded_height: u32) -> Self {
        CodecParams {
            codec,
            profile: profile::UNKNOWN,
            refs: 0,
            coded_width,
            coded_height,
            pix_fmt: PixelFormat::None,
            sw_pix_fmt: PixelFormat::Yuv420p,
        }
    }

    pub fn with_profile(self, profile: i32) -> Self {
        CodecParams { profile, ..self }
    }

    pub fn with_refs(self, refs: u32) -> Self {
        CodecParams { refs, ..self }
    }

    pub fn with_pix_fmt(self, pix_fmt: PixelFormat) -> Self {
        CodecParams { pix_fmt, ..self }
    }

    pub fn with_sw_pix_fmt(self, sw_pix_fmt: PixelFormat) -> Self {
        CodecParams { sw_pix_fmt, ..self }
    }

    /// HEVC streams carrying 10-bit samples need a high bit-depth profile.
    pub fn high_bit_depth(&self) -> bool {
        self.codec == Codec::Hevc
            && (self.sw_pix_fmt == PixelFormat::Yuv420p10 || self.profile == profile::HEVC_MAIN_10)
    }

    /// Coded size rounded up to the codec's surface alignment. Dimensions
    /// too large to round up saturate at the largest aligned value.
    pub fn surface_size(&self) -> (u32, u32) {
        let align = self.codec.surface_alignment();
        (
            align_up(self.coded_width, align),
            align_up(self.coded_height, align),
        )
    }

    /// Whether the stream profile allows hardware buffers at all; checked on
    /// every buffer request.
    pub fn profile_supported(&self) -> bool {
        match self.codec {
            Codec::H264 => profile::h264_supported(self.profile),
            Codec::Hevc => profile::hevc_supported(self.profile),
            _ => true,
        }
    }
}

fn align_up(dim: u32, align: u32) -> u32 {
    let mask = align - 1;
    dim.checked_add(mask).unwrap_or(u32::MAX) & !mask
}

/// Describes the frame the codec wants a buffer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub format: PixelFormat,
}

impl FrameDescriptor {
    pub fn hardware() -> Self {
        FrameDescriptor {
            format: PixelFormat::Dxva2Vld,
        }
    }
}

/// Rejects streams whose profile or pixel format the hardware path cannot
/// serve, before any device is queried.
pub fn check_stream(params: &CodecParams) -> Result<(), Error> {
    if params.coded_width > MAX_DIMENSION || params.coded_height > MAX_DIMENSION {
        log::debug!(
            "Coded size {}x{} exceeds {}",
            params.coded_width,
            params.coded_height,
            MAX_DIMENSION
        );
        return Err(Error::InvalidArgument("coded size above 16384"));
    }

    let pix_fmt = params.pix_fmt;
    let eight_bit_ok = matches!(
        pix_fmt,
        PixelFormat::Yuv420p | PixelFormat::Yuvj420p | PixelFormat::Dxva2Vld | PixelFormat::None
    );

    let rejection = match params.codec {
        Codec::H264 | Codec::Mpeg2Video if !eight_bit_ok => Some("pixel format not 4:2:0 8-bit"),
        Codec::H264
            if params.profile != profile::UNKNOWN && !profile::h264_supported(params.profile) =>
        {
            Some("H.264 profile above High")
        }
        Codec::Vc1 | Codec::Wmv3 if params.profile == profile::VC1_COMPLEX => {
            Some("VC-1 complex profile")
        }
        Codec::Hevc if !profile::hevc_supported(params.profile) => {
            Some("HEVC profile above Main10")
        }
        Codec::Hevc if !(eight_bit_ok || pix_fmt == PixelFormat::Yuv420p10) => {
            Some("pixel format not 4:2:0 8/10-bit")
        }
        _ => None,
    };

    match rejection {
        Some(reason) => {
            log::debug!(
                "Incompatible {} stream ({}), hardware decoding not possible",
                params.codec,
                reason
            );
            Err(Error::UnsupportedProfile(reason))
        }
        None => Ok(()),
    }
}
