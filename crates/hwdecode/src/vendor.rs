// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Hardware vendor table and decode workarounds.

use crate::{guid::Guid, modes};

pub const VENDOR_ATI: u32 = 0x1002;
pub const VENDOR_NVIDIA: u32 = 0x10DE;
pub const VENDOR_INTEL: u32 = 0x8086;

/// AMD devices with a UVD decode engine that mishandles large reference
/// counts, VC-1/MPEG-2 above 1920x1200 and WMV3.
pub const AMD_UVD_DEVICES: &[u32] = &[
    0x94C7, // ATI Radeon HD 2350
    0x94C1, // ATI Radeon HD 2400 XT
    0x94CC, // ATI Radeon HD 2400 Series
    0x958A, // ATI Radeon HD 2600 X2 Series
    0x9588, // ATI Radeon HD 2600 XT
    0x9405, // ATI Radeon HD 2900 GT
    0x9400, // ATI Radeon HD 2900 XT
    0x9611, // ATI Radeon 3100 Graphics
    0x9610, // ATI Radeon HD 3200 Graphics
    0x9614, // ATI Radeon HD 3300 Graphics
    0x95C0, // ATI Radeon HD 3400 Series (and others)
    0x95C5, // ATI Radeon HD 3400 Series (and others)
    0x95C4, // ATI Radeon HD 3400 Series (and others)
    0x94C3, // ATI Radeon HD 3410
    0x9589, // ATI Radeon HD 3600 Series (and others)
    0x9598, // ATI Radeon HD 3600 Series (and others)
    0x9591, // ATI Radeon HD 3600 Series (and others)
    0x9501, // ATI Radeon HD 3800 Series (and others)
    0x9505, // ATI Radeon HD 3800 Series (and others)
    0x9507, // ATI Radeon HD 3830
    0x9513, // ATI Radeon HD 3850 X2
    0x950F, // ATI Radeon HD 3850 X2
];

/// PCI identity of the adapter a session is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HardwareIdentity {
    pub vendor_id: u32,
    pub device_id: u32,
}

impl HardwareIdentity {
    pub fn new(vendor_id: u32, device_id: u32) -> Self {
        HardwareIdentity {
            vendor_id,
            device_id,
        }
    }

    pub fn is_amd_uvd(&self) -> bool {
        self.vendor_id == VENDOR_ATI && AMD_UVD_DEVICES.contains(&self.device_id)
    }

    pub fn is_intel(&self) -> bool {
        self.vendor_id == VENDOR_INTEL
    }

    pub fn vendor_name(&self) -> &'static str {
        vendor_name(self.vendor_id)
    }
}

pub fn vendor_name(vendor_id: u32) -> &'static str {
    match vendor_id {
        VENDOR_ATI => "ATI",
        VENDOR_NVIDIA => "NVIDIA",
        VENDOR_INTEL => "Intel",
        _ => "Unknown",
    }
}

/// Driver workaround the codec must apply when filling decode buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Workaround {
    #[default]
    None,
    /// Intel ClearVideo H.264 mode expects the legacy slice layout
    IntelClearVideo,
    /// UVD expects scaling lists in zigzag order
    ScalingListZigzag,
}

impl Workaround {
    pub fn derive(identity: &HardwareIdentity, profile: &Guid) -> Self {
        if identity.is_intel() && *profile == modes::DXVADDI_INTEL_MODE_H264_E {
            Workaround::IntelClearVideo
        } else if identity.is_amd_uvd() {
            Workaround::ScalingListZigzag
        } else {
            Workaround::None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Workaround::None => "none",
            Workaround::IntelClearVideo => "intel-clearvideo",
            Workaround::ScalingListZigzag => "scaling-list-zigzag",
        }
    }
}
