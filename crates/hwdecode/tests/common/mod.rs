// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies
//
// Mock decode platform shared by the integration tests.
//
// Surfaces and decoders are reference counted handles whose last drop is
// recorded in the shared counters, the way the platform frees an object
// when its final reference is released.

#![allow(dead_code)]

use hwdecode::{
    fourcc::FourCC,
    guid::Guid,
    modes,
    platform::{AdapterInfo, DecoderService, DeviceManager, Platform, VideoDesc},
    selector::{DecoderConfig, DXVA2_NO_ENCRYPT},
    vendor::{HardwareIdentity, VENDOR_ATI, VENDOR_INTEL, VENDOR_NVIDIA},
    Error,
};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn platform_error(call: &'static str) -> Error {
    Error::Platform {
        call,
        code: hwdecode::ffi::E_FAIL,
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub surfaces_created: AtomicUsize,
    pub surfaces_freed: AtomicUsize,
    pub decoders_created: AtomicUsize,
    pub decoders_freed: AtomicUsize,
    pub device_probes: AtomicUsize,
    pub device_lost: AtomicBool,
    pub fail_surfaces: AtomicBool,
    pub fail_service: AtomicBool,
}

impl Counters {
    pub fn surfaces_live(&self) -> usize {
        self.surfaces_created.load(Ordering::SeqCst) - self.surfaces_freed.load(Ordering::SeqCst)
    }

    pub fn decoders_live(&self) -> usize {
        self.decoders_created.load(Ordering::SeqCst) - self.decoders_freed.load(Ordering::SeqCst)
    }

    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct MockSurface {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    pub format: FourCC,
    counters: Arc<Counters>,
}

impl Drop for MockSurface {
    fn drop(&mut self) {
        self.counters.surfaces_freed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct MockDecoder {
    pub id: usize,
    pub profile: Guid,
    pub surface_count: usize,
    counters: Arc<Counters>,
}

impl Drop for MockDecoder {
    fn drop(&mut self) {
        self.counters.decoders_freed.fetch_add(1, Ordering::SeqCst);
    }
}

/// One adapter with its decode capabilities.
#[derive(Debug, Clone)]
pub struct MockGpu {
    pub description: String,
    pub identity: HardwareIdentity,
    pub profiles: Vec<Guid>,
    pub render_targets: Vec<FourCC>,
    pub configs: Vec<DecoderConfig>,
    pub counters: Arc<Counters>,
}

impl MockGpu {
    pub fn new(description: &str, identity: HardwareIdentity, profiles: Vec<Guid>) -> Self {
        MockGpu {
            description: description.to_string(),
            identity,
            profiles,
            render_targets: vec![FourCC::NV12, FourCC::P010],
            configs: vec![
                DecoderConfig::new(1, DXVA2_NO_ENCRYPT),
                DecoderConfig::new(2, DXVA2_NO_ENCRYPT),
            ],
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn nvidia() -> Self {
        MockGpu::new(
            "NVIDIA GeForce GTX 1080",
            HardwareIdentity::new(VENDOR_NVIDIA, 0x1b80),
            vec![
                modes::DXVA2_MODE_MPEG2_VLD,
                modes::DXVA2_MODE_H264_E,
                modes::DXVA2_MODE_VC1_D2010,
                modes::DXVA2_MODE_VC1_D,
                modes::DXVA_MODE_HEVC_VLD_MAIN,
                modes::DXVA_MODE_HEVC_VLD_MAIN10,
            ],
        )
    }

    pub fn amd_uvd() -> Self {
        MockGpu::new(
            "ATI Radeon HD 2600 XT",
            HardwareIdentity::new(VENDOR_ATI, 0x9588),
            vec![
                modes::DXVA2_MODE_MPEG2_VLD,
                modes::DXVA2_MODE_H264_E,
                modes::DXVA2_MODE_VC1_D,
            ],
        )
    }

    pub fn intel_clearvideo() -> Self {
        let mut gpu = MockGpu::new(
            "Intel GMA X4500HD",
            HardwareIdentity::new(VENDOR_INTEL, 0x2a42),
            vec![modes::DXVADDI_INTEL_MODE_H264_E, modes::DXVA2_MODE_MPEG2_VLD],
        );
        gpu.render_targets = vec![FourCC::NV12];
        gpu
    }
}

pub struct MockPlatform {
    pub adapters: Vec<MockGpu>,
}

impl MockPlatform {
    pub fn single(gpu: MockGpu) -> Self {
        MockPlatform {
            adapters: vec![gpu],
        }
    }
}

impl Platform for MockPlatform {
    type Manager = MockManager;

    fn adapter_info(&self, ordinal: u32) -> Result<AdapterInfo, Error> {
        self.adapters
            .get(ordinal as usize)
            .map(|gpu| AdapterInfo {
                description: gpu.description.clone(),
                identity: gpu.identity,
            })
            .ok_or(Error::Platform {
                call: "GetAdapterIdentifier",
                code: hwdecode::ffi::E_INVALIDARG,
            })
    }

    fn create_device_manager(&self, ordinal: u32) -> Result<MockManager, Error> {
        self.adapters
            .get(ordinal as usize)
            .map(|gpu| MockManager { gpu: gpu.clone() })
            .ok_or_else(|| platform_error("CreateDeviceEx"))
    }
}

pub struct MockManager {
    pub gpu: MockGpu,
}

impl DeviceManager for MockManager {
    type Service = MockService;

    fn identity(&self) -> Result<HardwareIdentity, Error> {
        Ok(self.gpu.identity)
    }

    fn open_service(&mut self) -> Result<MockService, Error> {
        if self.gpu.counters.fail_service.load(Ordering::SeqCst) {
            return Err(platform_error("GetVideoService"));
        }
        Ok(MockService {
            gpu: self.gpu.clone(),
        })
    }

    fn test_device(&self) -> Result<(), Error> {
        self.gpu.counters.device_probes.fetch_add(1, Ordering::SeqCst);
        if self.gpu.counters.device_lost.load(Ordering::SeqCst) {
            Err(Error::DeviceLost)
        } else {
            Ok(())
        }
    }
}

pub struct MockService {
    pub gpu: MockGpu,
}

impl DecoderService for MockService {
    type Surface = Arc<MockSurface>;
    type Decoder = Arc<MockDecoder>;

    fn decoder_profiles(&self) -> Result<Vec<Guid>, Error> {
        Ok(self.gpu.profiles.clone())
    }

    fn render_targets(&self, _: &Guid) -> Result<Vec<FourCC>, Error> {
        Ok(self.gpu.render_targets.clone())
    }

    fn configurations(&self, _: &Guid, _: &VideoDesc) -> Result<Vec<DecoderConfig>, Error> {
        Ok(self.gpu.configs.clone())
    }

    fn create_surfaces(
        &self,
        desc: &VideoDesc,
        count: usize,
    ) -> Result<Vec<Arc<MockSurface>>, Error> {
        let counters = &self.gpu.counters;
        if counters.fail_surfaces.load(Ordering::SeqCst) {
            return Err(platform_error("CreateSurface"));
        }
        let first = counters.surfaces_created.fetch_add(count, Ordering::SeqCst);
        Ok((first..first + count)
            .map(|id| {
                Arc::new(MockSurface {
                    id,
                    width: desc.width,
                    height: desc.height,
                    format: desc.format,
                    counters: counters.clone(),
                })
            })
            .collect())
    }

    fn clear_surface(&self, _: &Arc<MockSurface>) -> Result<(), Error> {
        Ok(())
    }

    fn create_decoder(
        &self,
        profile: &Guid,
        _: &VideoDesc,
        _: &DecoderConfig,
        surfaces: &[Arc<MockSurface>],
    ) -> Result<Arc<MockDecoder>, Error> {
        let id = self.gpu.counters.decoders_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockDecoder {
            id,
            profile: *profile,
            surface_count: surfaces.len(),
            counters: self.gpu.counters.clone(),
        }))
    }
}
