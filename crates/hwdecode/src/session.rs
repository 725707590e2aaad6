// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Decoder session state machine.
//!
//! A [`DecoderSession`] binds to a device manager, negotiates a decode
//! profile when the codec offers the hardware pixel format, and owns the
//! active decoder together with its surface pool. The codec drives it
//! through two entry points:
//!
//! - [`DecoderSession::on_format_offer`] picks the pixel format from the
//!   codec's candidate list, creating the decoder if needed.
//! - [`DecoderSession::on_buffer_request`] hands out a [`FrameLease`] for
//!   each frame; dropping the lease returns the surface.
//!
//! ```text
//! Uninitialized -> DeviceBound -> Negotiated -> Active
//!                      |  ^                       |
//!                      v  |                       | geometry change
//!                  Initializing                   v
//!                                            (renegotiate)
//! any binding failure -> Degraded (until reset)
//! ```
//!
//! On a geometry or format change the new negotiation is completed first;
//! only then is the old decoder and pool torn down and the replacement
//! allocated. Outstanding leases keep the old surfaces and decoder alive
//! until they are dropped.

use crate::{
    codec::{self, Codec, CodecParams, FrameDescriptor, PixelFormat},
    compat,
    config::SessionConfig,
    copy::FrameCopy,
    fourcc::FourCC,
    modes::DecodeProfile,
    negotiate::{self, NegotiatedFormat},
    platform::{self, DecoderService, DeviceManager, Platform, VideoDesc},
    pool::{BufferLease, SurfacePool},
    selector::{self, DecoderConfig},
    vendor::{HardwareIdentity, Workaround},
    Error,
};
use std::{fmt, mem, sync::Arc};

pub type SurfaceOf<M> = <<M as DeviceManager>::Service as DecoderService>::Surface;
pub type DecoderOf<M> = <<M as DeviceManager>::Service as DecoderService>::Decoder;

/// Hardware context published to the codec for a session's manager type.
pub type SessionContext<M> = HwContext<DecoderOf<M>, SurfaceOf<M>>;

/// Buffer lease handed to the codec; keeps the decoder alive until dropped.
pub type FrameLease<M> = BufferLease<SurfaceOf<M>, Arc<SessionContext<M>>>;

/// Read-only decode context the codec submits work against.
#[derive(Debug)]
pub struct HwContext<D, S> {
    pub decoder: D,
    pub config: DecoderConfig,
    /// Every surface of the pool, in slot order
    pub surfaces: Vec<S>,
    pub workaround: Workaround,
    pub profile: &'static DecodeProfile,
    pub format: FourCC,
}

impl<D, S> HwContext<D, S> {
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }
}

/// Stream properties that force a new decoder when they change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub codec: Codec,
    /// Aligned surface size
    pub width: u32,
    pub height: u32,
    pub sw_pix_fmt: PixelFormat,
    pub high_bit_depth: bool,
}

impl Geometry {
    pub fn of(params: &CodecParams) -> Self {
        let (width, height) = params.surface_size();
        Geometry {
            codec: params.codec,
            width,
            height,
            sw_pix_fmt: params.sw_pix_fmt,
            high_bit_depth: params.high_bit_depth(),
        }
    }
}

/// Outcome of a successful negotiation, before anything is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiation {
    pub format: NegotiatedFormat,
    pub config: DecoderConfig,
    pub desc: VideoDesc,
    pub surface_count: usize,
    pub workaround: Workaround,
    pub geometry: Geometry,
}

/// Result of [`DecoderSession::reinit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reinit {
    /// First initialization in progress; nothing was created
    Deferred,
    /// The active decoder already matches the stream
    Unchanged,
    /// A new decoder and pool were created
    Recreated,
}

/// Externally visible session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initializing,
    DeviceBound,
    Negotiated,
    Active,
    Degraded,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Initializing => "initializing",
            Phase::DeviceBound => "device-bound",
            Phase::Negotiated => "negotiated",
            Phase::Active => "active",
            Phase::Degraded => "degraded",
        };
        f.write_str(name)
    }
}

struct Binding<M: DeviceManager> {
    // Declared before the manager so the service is released first
    service: M::Service,
    manager: M,
    identity: HardwareIdentity,
    copy: FrameCopy,
}

struct ActiveDecoder<Svc: DecoderService> {
    negotiation: Negotiation,
    context: Arc<HwContext<Svc::Decoder, Svc::Surface>>,
    pool: SurfacePool<Svc::Surface>,
}

enum State<M: DeviceManager> {
    Uninitialized,
    Initializing(Binding<M>),
    DeviceBound(Binding<M>),
    Negotiated {
        negotiation: Negotiation,
        binding: Binding<M>,
    },
    Active {
        decoder: ActiveDecoder<M::Service>,
        binding: Binding<M>,
    },
    Degraded,
}

/// Owns the device binding and the active hardware decoder.
pub struct DecoderSession<M: DeviceManager> {
    config: SessionConfig,
    state: State<M>,
}

impl<M: DeviceManager> DecoderSession<M> {
    pub fn new(config: SessionConfig) -> Self {
        DecoderSession {
            config,
            state: State::Uninitialized,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Uninitialized => Phase::Uninitialized,
            State::Initializing(_) => Phase::Initializing,
            State::DeviceBound(_) => Phase::DeviceBound,
            State::Negotiated { .. } => Phase::Negotiated,
            State::Active { .. } => Phase::Active,
            State::Degraded => Phase::Degraded,
        }
    }

    fn binding(&self) -> Option<&Binding<M>> {
        match &self.state {
            State::Initializing(binding)
            | State::DeviceBound(binding)
            | State::Negotiated { binding, .. }
            | State::Active { binding, .. } => Some(binding),
            State::Uninitialized | State::Degraded => None,
        }
    }

    /// Identity captured when the device was bound.
    pub fn identity(&self) -> Option<HardwareIdentity> {
        self.binding().map(|binding| binding.identity)
    }

    /// Surface download strategy chosen for the bound device.
    pub fn frame_copy(&self) -> Option<FrameCopy> {
        self.binding().map(|binding| binding.copy)
    }

    /// Negotiation of the pending or active decoder.
    pub fn negotiation(&self) -> Option<&Negotiation> {
        match &self.state {
            State::Negotiated { negotiation, .. } => Some(negotiation),
            State::Active { decoder, .. } => Some(&decoder.negotiation),
            _ => None,
        }
    }

    /// Context published for the active decoder.
    pub fn context(&self) -> Option<&Arc<SessionContext<M>>> {
        match &self.state {
            State::Active { decoder, .. } => Some(&decoder.context),
            _ => None,
        }
    }

    pub fn pool(&self) -> Option<&SurfacePool<SurfaceOf<M>>> {
        match &self.state {
            State::Active { decoder, .. } => Some(&decoder.pool),
            _ => None,
        }
    }

    /// Drops the decoder, pool and device binding.
    pub fn reset(&mut self) {
        log::debug!("Session {} -> {}", self.phase(), Phase::Uninitialized);
        self.state = State::Uninitialized;
    }

    fn degrade(&mut self, err: &Error) {
        log::error!("Session degraded: {}", err);
        self.state = State::Degraded;
    }

    /// Binds a device manager, replacing any previous binding.
    ///
    /// A failing identity query is logged and treated as an unknown vendor.
    /// Failing to open the decoder service degrades the session.
    pub fn bind(&mut self, mut manager: M) -> Result<(), Error> {
        match self.state {
            State::Degraded => return Err(Error::Degraded),
            State::Initializing(_) => {
                return Err(Error::InvalidState("cannot rebind during initialization"))
            }
            _ => self.state = State::Uninitialized,
        }

        let identity = manager.identity().unwrap_or_else(|err| {
            log::warn!("Failed to retrieve adapter identity: {}", err);
            HardwareIdentity::default()
        });

        let service = match manager.open_service() {
            Ok(service) => service,
            Err(err) => {
                log::error!("Creation of decoder service failed: {}", err);
                self.degrade(&err);
                return Err(err);
            }
        };

        let copy = FrameCopy::for_identity(&identity);
        log::info!(
            "Bound {} device 0x{:04x}:0x{:04x}, {:?} frame copy",
            identity.vendor_name(),
            identity.vendor_id,
            identity.device_id,
            copy
        );

        self.state = State::DeviceBound(Binding {
            service,
            manager,
            identity,
            copy,
        });
        Ok(())
    }

    /// Selects an adapter, creates its device manager and binds it.
    pub fn bind_platform<P>(&mut self, platform: &P) -> Result<(), Error>
    where
        P: Platform<Manager = M>,
    {
        if let State::Degraded = self.state {
            return Err(Error::Degraded);
        }

        let manager = platform::select_adapter(platform, self.config.adapter)
            .and_then(|(ordinal, _)| platform.create_device_manager(ordinal));
        match manager {
            Ok(manager) => self.bind(manager),
            Err(err) => {
                log::error!("Failed to create device manager: {}", err);
                self.degrade(&err);
                Err(err)
            }
        }
    }

    /// Runs the codec's own initialization. Decoder creation requested from
    /// inside `init` is deferred until it returns.
    pub fn initialize<R>(&mut self, init: impl FnOnce(&mut Self) -> R) -> Result<R, Error> {
        match mem::replace(&mut self.state, State::Uninitialized) {
            State::DeviceBound(binding) => self.state = State::Initializing(binding),
            State::Degraded => {
                self.state = State::Degraded;
                return Err(Error::Degraded);
            }
            other => {
                self.state = other;
                return Err(Error::InvalidState("initialize requires a newly bound device"));
            }
        }

        let result = init(self);

        self.state = match mem::replace(&mut self.state, State::Uninitialized) {
            State::Initializing(binding) => State::DeviceBound(binding),
            other => other,
        };
        Ok(result)
    }

    /// Checks whether the stream can be hardware decoded without allocating
    /// anything. Without a bound device the first profile for the codec is
    /// assumed along with its default output format.
    pub fn check_support(&self, params: &CodecParams) -> Result<NegotiatedFormat, Error> {
        if let State::Degraded = self.state {
            return Err(Error::Degraded);
        }

        codec::check_stream(params)?;

        let binding = self.binding();
        let format = match binding {
            Some(binding) => negotiate_format(binding, params)?,
            None => negotiate::assume(params.codec, params.high_bit_depth())?,
        };

        let identity = binding.map(|binding| binding.identity).unwrap_or_default();
        compat::check(&identity, params, &format.profile.guid)?;
        Ok(format)
    }

    /// Negotiates profile, format, configuration and surface count for the
    /// stream without allocating. Not valid while a decoder is active; use
    /// [`reinit`](Self::reinit) to replace it.
    pub fn negotiate(&mut self, params: &CodecParams) -> Result<&Negotiation, Error> {
        let binding = match mem::replace(&mut self.state, State::Uninitialized) {
            State::DeviceBound(binding) | State::Negotiated { binding, .. } => binding,
            State::Degraded => {
                self.state = State::Degraded;
                return Err(Error::Degraded);
            }
            other => {
                self.state = other;
                return Err(Error::InvalidState("negotiation requires an idle bound device"));
            }
        };

        match plan(&self.config, &binding, params) {
            Ok(negotiation) => {
                log::debug!("Session -> {}", Phase::Negotiated);
                self.state = State::Negotiated {
                    negotiation,
                    binding,
                };
            }
            Err(err) => {
                self.state = State::DeviceBound(binding);
                return Err(err);
            }
        }

        self.negotiation()
            .ok_or(Error::InvalidState("negotiation not recorded"))
    }

    /// Allocates the pool and decoder for the pending negotiation.
    pub fn activate(&mut self) -> Result<(), Error> {
        let (negotiation, binding) = match mem::replace(&mut self.state, State::Uninitialized) {
            State::Negotiated {
                negotiation,
                binding,
            } => (negotiation, binding),
            State::Degraded => {
                self.state = State::Degraded;
                return Err(Error::Degraded);
            }
            other => {
                self.state = other;
                return Err(Error::InvalidState("activation requires a negotiated session"));
            }
        };

        self.install(negotiation, binding)
    }

    fn install(&mut self, negotiation: Negotiation, binding: Binding<M>) -> Result<(), Error> {
        match build::<M::Service>(&binding.service, negotiation) {
            Ok(decoder) => {
                log::debug!(
                    "Session -> {} with {} surfaces",
                    Phase::Active,
                    decoder.pool.len()
                );
                self.state = State::Active { decoder, binding };
                Ok(())
            }
            Err(err) => {
                self.state = State::Negotiated {
                    negotiation,
                    binding,
                };
                Err(err)
            }
        }
    }

    /// Makes sure the active decoder matches `params`, renegotiating and
    /// recreating it when the coded size or sample format changed.
    ///
    /// A failed negotiation leaves the session device bound; a failed
    /// allocation leaves it negotiated.
    pub fn reinit(&mut self, params: &CodecParams) -> Result<Reinit, Error> {
        let geometry = Geometry::of(params);

        let state = mem::replace(&mut self.state, State::Uninitialized);
        let (binding, pending, previous) = match state {
            State::Initializing(binding) => {
                log::debug!("Decoder creation deferred until initialization completes");
                self.state = State::Initializing(binding);
                return Ok(Reinit::Deferred);
            }
            State::Uninitialized => return Err(Error::InvalidState("no device bound")),
            State::Degraded => {
                self.state = State::Degraded;
                return Err(Error::Degraded);
            }
            State::Active { decoder, binding } if decoder.negotiation.geometry == geometry => {
                self.state = State::Active { decoder, binding };
                return Ok(Reinit::Unchanged);
            }
            State::DeviceBound(binding) => (binding, None, None),
            State::Negotiated {
                negotiation,
                binding,
            } => {
                let pending = (negotiation.geometry == geometry).then_some(negotiation);
                (binding, pending, None)
            }
            State::Active { decoder, binding } => {
                log::debug!(
                    "Stream changed from {}x{} {:?} to {}x{} {:?}, re-allocating decoder",
                    decoder.negotiation.geometry.width,
                    decoder.negotiation.geometry.height,
                    decoder.negotiation.geometry.sw_pix_fmt,
                    geometry.width,
                    geometry.height,
                    geometry.sw_pix_fmt
                );
                (binding, None, Some(decoder))
            }
        };

        let negotiation = match pending {
            Some(negotiation) => negotiation,
            None => match plan(&self.config, &binding, params) {
                Ok(negotiation) => negotiation,
                Err(err) => {
                    drop(previous);
                    self.state = State::DeviceBound(binding);
                    return Err(err);
                }
            },
        };

        // The replacement is confirmed; release the old decoder and pool
        // before allocating new surfaces.
        drop(previous);
        self.install(negotiation, binding)?;
        Ok(Reinit::Recreated)
    }

    /// Picks the pixel format from the codec's candidate list.
    ///
    /// Hardware candidates are tried in order; the hardware format is chosen
    /// when the decoder can be (re)created for it. The first software format
    /// ends the search and is returned as the fallback.
    pub fn on_format_offer(
        &mut self,
        params: &CodecParams,
        candidates: &[PixelFormat],
    ) -> PixelFormat {
        for &candidate in candidates {
            if !candidate.is_hwaccel() {
                return candidate;
            }
            if candidate != PixelFormat::Dxva2Vld {
                continue;
            }
            match self.reinit(params) {
                Ok(_) => return candidate,
                Err(err) => log::warn!("Hardware format rejected: {}", err),
            }
        }
        PixelFormat::None
    }

    /// Hands out a surface for the next frame.
    pub fn on_buffer_request(
        &mut self,
        params: &CodecParams,
        frame: &FrameDescriptor,
    ) -> Result<FrameLease<M>, Error> {
        if frame.format != PixelFormat::Dxva2Vld || !params.profile_supported() {
            log::debug!("Buffer request for a non-hardware frame or unsupported profile");
            return Err(Error::UnsupportedProfile(
                "not a hardware frame or unsupported profile",
            ));
        }

        if self.reinit(params)? == Reinit::Deferred {
            return Err(Error::InvalidState("decoder initialization in progress"));
        }

        let State::Active { decoder, binding } = &mut self.state else {
            return Err(Error::InvalidState("no active decoder"));
        };

        if let Err(err) = binding.manager.test_device() {
            log::warn!("Device lost: {}", err);
        }

        Ok(decoder.pool.acquire(decoder.context.clone()))
    }
}

impl<M: DeviceManager> fmt::Debug for DecoderSession<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderSession")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("identity", &self.identity())
            .field("negotiation", &self.negotiation())
            .finish()
    }
}

fn negotiate_format<M: DeviceManager>(
    binding: &Binding<M>,
    params: &CodecParams,
) -> Result<NegotiatedFormat, Error> {
    let supported = binding.service.decoder_profiles().map_err(|err| {
        log::error!("Failed to retrieve decoder device GUIDs: {}", err);
        err
    })?;
    negotiate::log_supported_profiles(&supported);

    negotiate::negotiate(
        params.codec,
        params.high_bit_depth(),
        &supported,
        |mode| binding.service.render_targets(&mode.guid),
    )
}

fn plan<M: DeviceManager>(
    config: &SessionConfig,
    binding: &Binding<M>,
    params: &CodecParams,
) -> Result<Negotiation, Error> {
    codec::check_stream(params)?;

    let format = negotiate_format(binding, params)?;
    let guid = format.profile.guid;
    compat::check(&binding.identity, params, &guid)?;

    let geometry = Geometry::of(params);
    let desc = VideoDesc::new(geometry.width, geometry.height, format.format);
    let configs = binding.service.configurations(&guid, &desc)?;
    let decoder_config = selector::select_best(params.codec, &configs)?;

    let negotiation = Negotiation {
        format,
        config: decoder_config,
        desc,
        surface_count: config.surface_count(params.codec, decoder_config.min_render_targets),
        workaround: Workaround::derive(&binding.identity, &guid),
        geometry,
    };
    log::debug!(
        "Negotiated {} {}x{} {} with {} surfaces, workaround {}",
        format.profile.name,
        desc.width,
        desc.height,
        desc.format,
        negotiation.surface_count,
        negotiation.workaround.name()
    );
    Ok(negotiation)
}

fn build<Svc: DecoderService>(
    service: &Svc,
    negotiation: Negotiation,
) -> Result<ActiveDecoder<Svc>, Error> {
    let pool = SurfacePool::create(service, negotiation.desc, negotiation.surface_count)?;
    let surfaces = pool.surfaces();

    let decoder = service
        .create_decoder(
            &negotiation.format.profile.guid,
            &negotiation.desc,
            &negotiation.config,
            &surfaces,
        )
        .map_err(|err| {
            log::error!("CreateVideoDecoder failed: {}", err);
            Error::AllocationFailed("video decoder")
        })?;

    let context = Arc::new(HwContext {
        decoder,
        config: negotiation.config,
        surfaces,
        workaround: negotiation.workaround,
        profile: negotiation.format.profile,
        format: negotiation.format.format,
    });

    Ok(ActiveDecoder {
        negotiation,
        context,
        pool,
    })
}
