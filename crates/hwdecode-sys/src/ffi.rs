// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

// Entry points exported by dxva2.dll. Interfaces are passed as opaque COM
// pointers; the vtables are owned by the platform binding, not this crate.

pub type HRESULT = i32;
pub type UINT = ::std::os::raw::c_uint;
pub type REFIID = *const ::std::os::raw::c_void;

pub const S_OK: HRESULT = 0;
pub const E_FAIL: HRESULT = 0x80004005_u32 as HRESULT;
pub const E_INVALIDARG: HRESULT = 0x80070057_u32 as HRESULT;
pub const E_OUTOFMEMORY: HRESULT = 0x8007000E_u32 as HRESULT;
pub const D3DADAPTER_DEFAULT: UINT = 0;

pub type IDirect3DDevice9 = ::std::os::raw::c_void;
pub type IDirect3DDeviceManager9 = ::std::os::raw::c_void;

pub struct Dxva2Library {
    __library: ::libloading::Library,
    pub DXVA2CreateDirect3DDeviceManager9: Result<
        unsafe extern "system" fn(
            pResetToken: *mut UINT,
            ppDeviceManager: *mut *mut IDirect3DDeviceManager9,
        ) -> HRESULT,
        ::libloading::Error,
    >,
    pub DXVA2CreateVideoService: Result<
        unsafe extern "system" fn(
            pDD: *mut IDirect3DDevice9,
            riid: REFIID,
            ppService: *mut *mut ::std::os::raw::c_void,
        ) -> HRESULT,
        ::libloading::Error,
    >,
}

impl Dxva2Library {
    /// # Safety
    /// Loading runs the library's initialization routines.
    pub unsafe fn new<P>(path: P) -> Result<Self, ::libloading::Error>
    where
        P: AsRef<::std::ffi::OsStr>,
    {
        let library = ::libloading::Library::new(path)?;
        Self::from_library(library)
    }

    pub unsafe fn from_library<L>(library: L) -> Result<Self, ::libloading::Error>
    where
        L: Into<::libloading::Library>,
    {
        let __library = library.into();
        let DXVA2CreateDirect3DDeviceManager9 = __library
            .get(b"DXVA2CreateDirect3DDeviceManager9\0")
            .map(|sym| *sym);
        let DXVA2CreateVideoService = __library
            .get(b"DXVA2CreateVideoService\0")
            .map(|sym| *sym);
        Ok(Dxva2Library {
            __library,
            DXVA2CreateDirect3DDeviceManager9,
            DXVA2CreateVideoService,
        })
    }

    /// Returns `E_FAIL` when the entry point is missing.
    pub unsafe fn DXVA2CreateDirect3DDeviceManager9(
        &self,
        pResetToken: *mut UINT,
        ppDeviceManager: *mut *mut IDirect3DDeviceManager9,
    ) -> HRESULT {
        match &self.DXVA2CreateDirect3DDeviceManager9 {
            Ok(func) => func(pResetToken, ppDeviceManager),
            Err(_) => E_FAIL,
        }
    }

    pub unsafe fn DXVA2CreateVideoService(
        &self,
        pDD: *mut IDirect3DDevice9,
        riid: REFIID,
        ppService: *mut *mut ::std::os::raw::c_void,
    ) -> HRESULT {
        match &self.DXVA2CreateVideoService {
            Ok(func) => func(pDD, riid, ppService),
            Err(_) => E_FAIL,
        }
    }
}
