// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Capability replay.
//!
//! A capability file is a JSON description of what a GPU driver reported:
//! adapters, decode profile GUIDs, render target formats and decoder
//! configurations. [`ReplayPlatform`] serves those answers through the
//! hwdecode platform traits so a session can be negotiated on any host.
//!
//! ```json
//! {
//!   "adapters": [{
//!     "description": "NVIDIA GeForce GTX 1060",
//!     "vendor_id": "0x10de",
//!     "device_id": "0x1c03",
//!     "profiles": ["DXVA2_ModeH264_E", "{5B11D51B-2F4C-4452-BCC3-09F2A1160CC0}"],
//!     "render_targets": ["NV12"],
//!     "configs": [{ "raw": 1 }, { "raw": 2 }]
//!   }]
//! }
//! ```

use crate::{error::CliError, utils::parse_id};
use hwdecode::{
    ffi,
    fourcc::FourCC,
    guid::Guid,
    modes,
    platform::{AdapterInfo, DecoderService, DeviceManager, Platform, VideoDesc},
    selector::{DecoderConfig, DXVA2_NO_ENCRYPT},
    vendor::HardwareIdentity,
    Error,
};
use serde::Deserialize;
use std::{cell::Cell, path::Path, rc::Rc};

/// D3DCRYPTOTYPE_AES128_CTR, reported for encrypted configurations.
const AES128_CTR_ENCRYPT: Guid = Guid::from_u128(0x9b6bd711_4f74_41c9_9e7b_0be2d7d93b4f);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CapsFile {
    adapters: Vec<AdapterCaps>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AdapterCaps {
    description: String,
    vendor_id: Id,
    device_id: Id,
    profiles: Vec<String>,
    #[serde(default = "default_render_targets")]
    render_targets: Vec<String>,
    #[serde(default = "default_configs")]
    configs: Vec<ConfigCaps>,
    /// Surfaces the driver will create before running out of memory
    #[serde(default)]
    max_surfaces: Option<usize>,
    /// Report the device as lost on every liveness probe
    #[serde(default)]
    device_lost: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Id {
    Number(u32),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigCaps {
    raw: u32,
    #[serde(default)]
    encrypted: bool,
    #[serde(default)]
    min_render_targets: u32,
}

fn default_render_targets() -> Vec<String> {
    vec!["NV12".to_string()]
}

fn default_configs() -> Vec<ConfigCaps> {
    vec![ConfigCaps {
        raw: 1,
        encrypted: false,
        min_render_targets: 0,
    }]
}

impl Id {
    fn resolve(&self) -> Result<u32, CliError> {
        match self {
            Id::Number(value) => Ok(*value),
            Id::Text(text) => parse_id(text),
        }
    }
}

/// An adapter with every reported value resolved.
#[derive(Debug, Clone)]
pub struct ReplayAdapter {
    pub description: String,
    pub identity: HardwareIdentity,
    pub profiles: Vec<Guid>,
    pub render_targets: Vec<FourCC>,
    pub configs: Vec<DecoderConfig>,
    pub max_surfaces: Option<usize>,
    pub device_lost: bool,
}

/// Resolves a profile given as a GUID or as a known mode symbol.
fn resolve_profile(name: &str) -> Result<Guid, CliError> {
    if let Ok(guid) = name.parse::<Guid>() {
        return Ok(guid);
    }
    modes::MODES
        .iter()
        .find(|mode| mode.symbol.eq_ignore_ascii_case(name.trim()))
        .map(|mode| mode.guid)
        .ok_or_else(|| CliError::InvalidArgs(format!("Unknown decode profile: {}", name)))
}

impl TryFrom<AdapterCaps> for ReplayAdapter {
    type Error = CliError;

    fn try_from(caps: AdapterCaps) -> Result<Self, CliError> {
        let identity = HardwareIdentity::new(caps.vendor_id.resolve()?, caps.device_id.resolve()?);

        let profiles = caps
            .profiles
            .iter()
            .map(|name| resolve_profile(name))
            .collect::<Result<Vec<_>, _>>()?;

        let render_targets = caps
            .render_targets
            .iter()
            .map(|name| {
                name.parse::<FourCC>()
                    .map_err(|e| CliError::InvalidArgs(format!("{}: {}", e, name)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let configs = caps
            .configs
            .iter()
            .map(|config| {
                let encryption = if config.encrypted {
                    AES128_CTR_ENCRYPT
                } else {
                    DXVA2_NO_ENCRYPT
                };
                DecoderConfig::new(config.raw, encryption)
                    .with_min_render_targets(config.min_render_targets)
            })
            .collect();

        Ok(ReplayAdapter {
            description: caps.description,
            identity,
            profiles,
            render_targets,
            configs,
            max_surfaces: caps.max_surfaces,
            device_lost: caps.device_lost,
        })
    }
}

/// Platform answering from a capability file.
#[derive(Debug)]
pub struct ReplayPlatform {
    adapters: Vec<Rc<ReplayAdapter>>,
    bound: Cell<Option<u32>>,
}

impl ReplayPlatform {
    pub fn new(adapters: Vec<ReplayAdapter>) -> Self {
        ReplayPlatform {
            adapters: adapters.into_iter().map(Rc::new).collect(),
            bound: Cell::new(None),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CliError> {
        let file: CapsFile = serde_json::from_str(json)
            .map_err(|e| CliError::InvalidArgs(format!("Invalid capability file: {}", e)))?;
        let adapters = file
            .adapters
            .into_iter()
            .map(ReplayAdapter::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ReplayPlatform::new(adapters))
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CliError::InvalidArgs(format!("Cannot read {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded capability file {}", path.display());
        Self::from_json(&json)
    }

    /// Ordinal of the adapter the last device manager was created on.
    pub fn bound_adapter(&self) -> Option<(u32, &ReplayAdapter)> {
        let ordinal = self.bound.get()?;
        self.adapters
            .get(ordinal as usize)
            .map(|adapter| (ordinal, adapter.as_ref()))
    }

    fn adapter(&self, ordinal: u32) -> Result<&Rc<ReplayAdapter>, Error> {
        self.adapters
            .get(ordinal as usize)
            .ok_or(Error::Platform {
                call: "GetAdapterIdentifier",
                code: ffi::E_INVALIDARG,
            })
    }
}

impl Platform for ReplayPlatform {
    type Manager = ReplayManager;

    fn adapter_info(&self, ordinal: u32) -> Result<AdapterInfo, Error> {
        let adapter = self.adapter(ordinal)?;
        Ok(AdapterInfo {
            description: adapter.description.clone(),
            identity: adapter.identity,
        })
    }

    fn create_device_manager(&self, ordinal: u32) -> Result<ReplayManager, Error> {
        let adapter = self.adapter(ordinal)?.clone();
        self.bound.set(Some(ordinal));
        Ok(ReplayManager { adapter })
    }
}

pub struct ReplayManager {
    adapter: Rc<ReplayAdapter>,
}

impl DeviceManager for ReplayManager {
    type Service = ReplayService;

    fn identity(&self) -> Result<HardwareIdentity, Error> {
        Ok(self.adapter.identity)
    }

    fn open_service(&mut self) -> Result<ReplayService, Error> {
        Ok(ReplayService {
            adapter: self.adapter.clone(),
            next_handle: Cell::new(1),
        })
    }

    fn test_device(&self) -> Result<(), Error> {
        if self.adapter.device_lost {
            Err(Error::DeviceLost)
        } else {
            Ok(())
        }
    }
}

/// Decoder service handing out numbered handles for surfaces and decoders.
pub struct ReplayService {
    adapter: Rc<ReplayAdapter>,
    next_handle: Cell<u32>,
}

impl ReplayService {
    fn handle(&self) -> u32 {
        let handle = self.next_handle.get();
        self.next_handle.set(handle.wrapping_add(1));
        handle
    }
}

impl DecoderService for ReplayService {
    type Surface = u32;
    type Decoder = u32;

    fn decoder_profiles(&self) -> Result<Vec<Guid>, Error> {
        Ok(self.adapter.profiles.clone())
    }

    fn render_targets(&self, profile: &Guid) -> Result<Vec<FourCC>, Error> {
        if !self.adapter.profiles.contains(profile) {
            return Err(Error::Platform {
                call: "GetDecoderRenderTargets",
                code: ffi::E_INVALIDARG,
            });
        }
        Ok(self.adapter.render_targets.clone())
    }

    fn configurations(
        &self,
        profile: &Guid,
        _desc: &VideoDesc,
    ) -> Result<Vec<DecoderConfig>, Error> {
        if !self.adapter.profiles.contains(profile) {
            return Err(Error::Platform {
                call: "GetDecoderConfigurations",
                code: ffi::E_INVALIDARG,
            });
        }
        Ok(self.adapter.configs.clone())
    }

    fn create_surfaces(&self, desc: &VideoDesc, count: usize) -> Result<Vec<u32>, Error> {
        if self.adapter.max_surfaces.is_some_and(|max| count > max) {
            return Err(Error::Platform {
                call: "CreateSurface",
                code: ffi::E_OUTOFMEMORY,
            });
        }
        log::debug!(
            "Creating {} {}x{} {} surfaces",
            count,
            desc.width,
            desc.height,
            desc.format
        );
        Ok((0..count).map(|_| self.handle()).collect())
    }

    fn clear_surface(&self, _surface: &u32) -> Result<(), Error> {
        Ok(())
    }

    fn create_decoder(
        &self,
        _profile: &Guid,
        _desc: &VideoDesc,
        _config: &DecoderConfig,
        surfaces: &[u32],
    ) -> Result<u32, Error> {
        if surfaces.is_empty() {
            return Err(Error::Platform {
                call: "CreateVideoDecoder",
                code: ffi::E_INVALIDARG,
            });
        }
        Ok(self.handle())
    }
}
