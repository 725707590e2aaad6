// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Vendor compatibility gate.

use crate::{
    codec::{Codec, CodecParams},
    guid::Guid,
    modes,
    vendor::HardwareIdentity,
    Error,
};

/// Largest reference frame count a level 4.1 decoded picture buffer holds
/// at the given surface size.
pub fn max_ref_frames(surface_width: u32, surface_height: u32) -> u32 {
    let width_mbs = u64::from(surface_width / 16);
    let height_mbs = u64::from(surface_height / 16);
    let mbs = (width_mbs * height_mbs).max(1);
    (32768 / mbs).min(11) as u32
}

/// Rejects a negotiated profile that is known to misbehave on the bound
/// adapter. Surface dimensions are the aligned coded size.
pub fn check(
    identity: &HardwareIdentity,
    params: &CodecParams,
    profile: &Guid,
) -> Result<(), Error> {
    let (width, height) = params.surface_size();
    if width == 0 || height == 0 {
        return Err(Error::DimensionsUnknown);
    }

    let max_refs = max_ref_frames(width, height);

    let rejection = if identity.is_amd_uvd() {
        match params.codec {
            Codec::H264 if params.refs > max_refs => {
                Some("too many reference frames for AMD UVD H.264 decoder")
            }
            Codec::Vc1 | Codec::Mpeg2Video if width > 1920 || height > 1200 => {
                Some("resolutions above 1920x1200 are not supported by AMD UVD")
            }
            Codec::Wmv3 => Some("AMD UVD is not compatible with WMV3"),
            _ => None,
        }
    } else if identity.is_intel()
        && *profile == modes::DXVADDI_INTEL_MODE_H264_E
        && params.codec == Codec::H264
        && params.refs > max_refs
    {
        Some("too many reference frames for Intel ClearVideo H.264 decoder")
    } else {
        None
    };

    match rejection {
        Some(reason) => {
            log::warn!(
                "{} {}x{} refs={} rejected on {:04x}:{:04x}: {}",
                params.codec,
                width,
                height,
                params.refs,
                identity.vendor_id,
                identity.device_id,
                reason
            );
            Err(Error::HardwareIncompatible(reason))
        }
        None => Ok(()),
    }
}
