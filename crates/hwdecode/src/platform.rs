// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Platform decode API seam.
//!
//! A binding to the platform decode API implements [`Platform`],
//! [`DeviceManager`] and [`DecoderService`]. Surface and decoder handles are
//! cloneable; cloning a handle takes a platform reference and dropping the
//! last clone releases the object.

use crate::{
    fourcc::FourCC, guid::Guid, selector::DecoderConfig, vendor::HardwareIdentity, Error,
};

/// Surface geometry and format used for surfaces and decoder creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoDesc {
    pub width: u32,
    pub height: u32,
    pub format: FourCC,
}

impl VideoDesc {
    pub fn new(width: u32, height: u32, format: FourCC) -> Self {
        VideoDesc {
            width,
            height,
            format,
        }
    }
}

/// Adapter as reported by the platform's adapter enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    pub description: String,
    pub identity: HardwareIdentity,
}

/// Entry point of a decode API binding.
pub trait Platform {
    type Manager: DeviceManager;

    fn adapter_info(&self, ordinal: u32) -> Result<AdapterInfo, Error>;

    /// Creates a device on the adapter and wraps it in a device manager.
    fn create_device_manager(&self, ordinal: u32) -> Result<Self::Manager, Error>;
}

/// Owner of the rendering device a decoder service is opened on.
pub trait DeviceManager {
    type Service: DecoderService;

    /// Vendor and device id of the adapter backing the device.
    fn identity(&self) -> Result<HardwareIdentity, Error>;

    fn open_service(&mut self) -> Result<Self::Service, Error>;

    /// Liveness probe; [`Error::DeviceLost`] once the device is gone.
    fn test_device(&self) -> Result<(), Error>;
}

/// Video decoder service opened on a device.
pub trait DecoderService {
    type Surface: Clone + Send + Sync + 'static;
    type Decoder: Clone + Send + Sync + 'static;

    /// Decode profile GUIDs the hardware supports, in driver order.
    fn decoder_profiles(&self) -> Result<Vec<Guid>, Error>;

    /// Output formats the hardware can render `profile` to.
    fn render_targets(&self, profile: &Guid) -> Result<Vec<FourCC>, Error>;

    fn configurations(&self, profile: &Guid, desc: &VideoDesc)
        -> Result<Vec<DecoderConfig>, Error>;

    fn create_surfaces(&self, desc: &VideoDesc, count: usize) -> Result<Vec<Self::Surface>, Error>;

    /// Fills a surface with black.
    fn clear_surface(&self, surface: &Self::Surface) -> Result<(), Error>;

    fn create_decoder(
        &self,
        profile: &Guid,
        desc: &VideoDesc,
        config: &DecoderConfig,
        surfaces: &[Self::Surface],
    ) -> Result<Self::Decoder, Error>;
}

/// Queries the requested adapter, falling back once to the default adapter
/// when a non-default request fails. Returns the ordinal actually used.
pub fn select_adapter<P: Platform>(
    platform: &P,
    requested: u32,
) -> Result<(u32, AdapterInfo), Error> {
    let (ordinal, info) = match platform.adapter_info(requested) {
        Ok(info) => (requested, info),
        Err(err) if requested != crate::ffi::D3DADAPTER_DEFAULT => {
            log::warn!(
                "Adapter {} unavailable ({}), using the default adapter",
                requested,
                err
            );
            let ordinal = crate::ffi::D3DADAPTER_DEFAULT;
            (ordinal, platform.adapter_info(ordinal)?)
        }
        Err(err) => return Err(err),
    };

    log::info!(
        "Using adapter {}: {} ({}, vendor 0x{:04x}, device 0x{:04x})",
        ordinal,
        info.description,
        info.identity.vendor_name(),
        info.identity.vendor_id,
        info.identity.device_id
    );
    Ok((ordinal, info))
}
