// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Platform decode library probe.

use crate::error::CliError;
use clap::Args as ClapArgs;
use hwdecode::ffi;
use serde::Serialize;

#[derive(ClapArgs, Debug)]
pub struct Args {}

#[derive(Debug, Serialize)]
struct ProbeOutput {
    library: String,
    loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    symbols: Vec<SymbolStatus>,
}

#[derive(Debug, Serialize)]
struct SymbolStatus {
    name: &'static str,
    present: bool,
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    log::debug!("Executing probe command: {:?}", args);

    let library = ffi::library_path();
    let (output, result) = match hwdecode::library() {
        Ok(lib) => (report(library, Some(lib), None), Ok(())),
        Err(err) => {
            let lib = ffi::try_library();
            let output = report(library, lib, Some(err.to_string()));
            (output, Err(CliError::from(err)))
        }
    };

    if json {
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::General(format!("JSON serialization failed: {}", e)))?;
        println!("{}", text);
    } else {
        println!("Library: {}", output.library);
        println!("Loaded:  {}", if output.loaded { "yes" } else { "no" });
        for symbol in &output.symbols {
            println!(
                "  {:<36} {}",
                symbol.name,
                if symbol.present { "found" } else { "missing" }
            );
        }
    }

    result
}

fn report(library: String, lib: Option<&ffi::Dxva2Library>, error: Option<String>) -> ProbeOutput {
    let symbols = match lib {
        Some(lib) => vec![
            SymbolStatus {
                name: "DXVA2CreateDirect3DDeviceManager9",
                present: lib.DXVA2CreateDirect3DDeviceManager9.is_ok(),
            },
            SymbolStatus {
                name: "DXVA2CreateVideoService",
                present: lib.DXVA2CreateVideoService.is_ok(),
            },
        ],
        None => Vec::new(),
    };

    ProbeOutput {
        library,
        loaded: lib.is_some(),
        error,
        symbols,
    }
}
