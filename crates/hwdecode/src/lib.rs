// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Hardware Video Decode Negotiation for Rust
//!
//! Negotiates a hardware decode profile with the installed GPU driver,
//! validates it against known vendor defects, and manages the pool of
//! GPU-resident surfaces a software codec decodes into.
//!
//! The platform decode API is reached through the traits in [`platform`];
//! the core itself never touches a device directly, which keeps every
//! decision (profile choice, quirk rejection, configuration scoring, surface
//! eviction) testable without a GPU.
//!
//! # Quick Start
//!
//! ```no_run
//! # fn run<P: hwdecode::platform::Platform>(platform: &P) -> Result<(), hwdecode::Error> {
//! use hwdecode::codec::{Codec, CodecParams, FrameDescriptor, PixelFormat};
//! use hwdecode::config::SessionConfig;
//! use hwdecode::session::DecoderSession;
//!
//! let mut session = DecoderSession::new(SessionConfig::from_env());
//! session.bind_platform(platform)?;
//!
//! let params = CodecParams::new(Codec::H264, 1920, 1080).with_refs(4);
//! let chosen = session.on_format_offer(&params, &[PixelFormat::Dxva2Vld, PixelFormat::Yuv420p]);
//! assert_eq!(chosen, PixelFormat::Dxva2Vld);
//!
//! let lease = session.on_buffer_request(&params, &FrameDescriptor::hardware())?;
//! // hand lease.surface() to the codec; dropping the lease returns the slot
//! drop(lease);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - Preference-ordered decode profile negotiation with bit-depth matching
//! - Vendor quirk gate (AMD UVD, Intel ClearVideo) reproducing driver limits
//! - Decoder configuration scoring (bitstream mode, encryption)
//! - Fixed-capacity surface pool with age-based eviction and lock-free release
//! - Transactional decoder re-creation on stream geometry changes

use std::{error, fmt};

pub use hwdecode_sys as ffi;

/// Error type for hardware decode operations
#[derive(Debug)]
pub enum Error {
    /// The platform decode library could not be loaded at runtime
    LibraryNotLoaded(ffi::libloading::Error),

    /// A required entry point is missing from the loaded library
    SymbolNotFound(&'static str),

    /// A platform call failed with the given status code
    Platform { call: &'static str, code: i32 },

    /// No preferred decode profile intersects the hardware capabilities
    NoCompatibleProfile,

    /// The negotiated profile hits a known vendor/driver limitation
    HardwareIncompatible(&'static str),

    /// No decoder configuration scored above zero
    NoUsableConfig,

    /// Surface or decoder object creation failed
    AllocationFailed(&'static str),

    /// The liveness probe reported the device as lost
    DeviceLost,

    /// Surface geometry is not known yet
    DimensionsUnknown,

    /// The stream profile or pixel format cannot be hardware decoded
    UnsupportedProfile(&'static str),

    /// The operation is not valid in the current session state
    InvalidState(&'static str),

    /// The session hit an unrecoverable error and must be reset
    Degraded,

    /// A caller supplied argument is out of range
    InvalidArgument(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::LibraryNotLoaded(err) => {
                write!(f, "platform decode library could not be loaded: {}", err)
            }
            Error::SymbolNotFound(sym) => write!(f, "symbol not found: {}", sym),
            Error::Platform { call, code } => {
                write!(f, "{} failed with hr: 0x{:08X}", call, *code as u32)
            }
            Error::NoCompatibleProfile => {
                write!(f, "no decoder device can decode to a matching output")
            }
            Error::HardwareIncompatible(reason) => {
                write!(f, "hardware incompatible: {}", reason)
            }
            Error::NoUsableConfig => write!(f, "no matching decoder configuration available"),
            Error::AllocationFailed(what) => write!(f, "allocation failed: {}", what),
            Error::DeviceLost => write!(f, "device lost"),
            Error::DimensionsUnknown => write!(f, "surface dimensions unknown"),
            Error::UnsupportedProfile(reason) => write!(f, "unsupported stream: {}", reason),
            Error::InvalidState(reason) => write!(f, "invalid session state: {}", reason),
            Error::Degraded => write!(f, "session degraded, reset required"),
            Error::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::LibraryNotLoaded(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ffi::libloading::Error> for Error {
    fn from(err: ffi::libloading::Error) -> Self {
        Error::LibraryNotLoaded(err)
    }
}

/// The guid module provides 128-bit decode profile identifiers.
pub mod guid;

/// The fourcc module provides portable handling of surface format codes.
pub mod fourcc;

/// The codec module describes the stream parameters reported by the codec.
pub mod codec;

/// The modes module holds the preference-ordered decode profile table.
pub mod modes;

/// The vendor module holds the hardware vendor quirk table.
pub mod vendor;

/// The negotiate module intersects decode profiles and output formats.
pub mod negotiate;

/// The compat module rejects profiles hitting known driver defects.
pub mod compat;

/// The selector module scores decoder configurations.
pub mod selector;

/// The pool module manages the GPU surface pool and buffer leases.
pub mod pool;

/// The platform module defines the traits a decode API binding implements.
pub mod platform;

/// The copy module provides the surface download strategy.
pub mod copy;

/// The config module provides session configuration.
pub mod config;

/// The session module orchestrates negotiation and decoder lifetime.
pub mod session;

/// Check whether the platform decode library is present and exports the
/// device manager factory.
pub fn is_available() -> Result<bool, Error> {
    let lib = ffi::init()?;
    Ok(lib.DXVA2CreateDirect3DDeviceManager9.is_ok())
}

/// Load the platform decode library and require every entry point a
/// binding needs.
pub fn library() -> Result<&'static ffi::Dxva2Library, Error> {
    let lib = ffi::init()?;
    if lib.DXVA2CreateDirect3DDeviceManager9.is_err() {
        return Err(Error::SymbolNotFound("DXVA2CreateDirect3DDeviceManager9"));
    }
    if lib.DXVA2CreateVideoService.is_err() {
        return Err(Error::SymbolNotFound("DXVA2CreateVideoService"));
    }
    Ok(lib)
}
