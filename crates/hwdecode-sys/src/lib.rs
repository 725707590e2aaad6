// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(clippy::type_complexity)]
#![allow(clippy::missing_safety_doc)]

include!("ffi.rs");

// Re-export libloading for error handling
pub use libloading;

use std::sync::{Mutex, OnceLock};

/// Library loaded when `HWDECODE_LIBRARY` is not set.
pub const DEFAULT_LIBRARY: &str = "dxva2.dll";

/// Environment variable overriding the library path.
pub const LIBRARY_ENV: &str = "HWDECODE_LIBRARY";

static LIBRARY: OnceLock<Dxva2Library> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Path that [`init`] will load, honoring `HWDECODE_LIBRARY`.
pub fn library_path() -> String {
    std::env::var(LIBRARY_ENV)
        .ok()
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| DEFAULT_LIBRARY.to_string())
}

/// Load the platform decode library on first use.
///
/// Symbols are resolved lazily, so a library lacking one of the entry points
/// still loads; callers check the corresponding field before calling it.
pub fn init() -> Result<&'static Dxva2Library, libloading::Error> {
    if let Some(lib) = LIBRARY.get() {
        return Ok(lib);
    }

    // A poisoned lock only means another loader panicked; the OnceLock
    // below still guards the actual state.
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());

    // Double-check after acquiring lock
    if let Some(lib) = LIBRARY.get() {
        return Ok(lib);
    }

    let lib = unsafe { Dxva2Library::new(library_path().as_str())? };

    Ok(LIBRARY.get_or_init(|| lib))
}

/// Try to get a reference to the loaded library without loading it.
pub fn try_library() -> Option<&'static Dxva2Library> {
    LIBRARY.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_library_path_default() {
        std::env::remove_var(LIBRARY_ENV);
        assert_eq!(library_path(), DEFAULT_LIBRARY);
    }

    #[test]
    #[serial]
    fn test_library_path_override() {
        std::env::set_var(LIBRARY_ENV, "/opt/drivers/dxva2.dll");
        assert_eq!(library_path(), "/opt/drivers/dxva2.dll");
        std::env::set_var(LIBRARY_ENV, "");
        assert_eq!(library_path(), DEFAULT_LIBRARY);
        std::env::remove_var(LIBRARY_ENV);
    }

    #[test]
    fn test_hresult_constants() {
        assert_eq!(S_OK, 0);
        assert!(E_FAIL < 0);
        assert!(E_INVALIDARG < 0);
        assert!(E_OUTOFMEMORY < 0);
    }

    #[ignore = "test requires the platform decode library"]
    #[test]
    #[serial]
    fn test_init_loads_library() {
        let lib = init().unwrap();
        assert!(lib.DXVA2CreateDirect3DDeviceManager9.is_ok());
        assert!(try_library().is_some());
    }
}
