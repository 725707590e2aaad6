// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Negotiation replay against a captured capability file.

use crate::{
    caps::ReplayPlatform,
    error::CliError,
    utils::{parse_profile, parse_resolution},
};
use clap::Args as ClapArgs;
use hwdecode::{
    codec::{Codec, CodecParams, FrameDescriptor, PixelFormat},
    config::SessionConfig,
    session::{DecoderSession, Reinit},
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Capability file describing the adapters (JSON)
    #[arg(long)]
    caps: PathBuf,

    /// Stream codec (mpeg2, h264, vc1, wmv3, hevc)
    #[arg(short, long)]
    codec: String,

    /// Coded size (WxH)
    #[arg(short, long, default_value = "1920x1080")]
    size: String,

    /// Reference frames signalled by the stream
    #[arg(long, default_value = "4")]
    refs: u32,

    /// Stream profile by name (main, high, main10, ...) or number
    #[arg(long)]
    profile: Option<String>,

    /// Stream carries 10-bit samples
    #[arg(long)]
    high_bit_depth: bool,

    /// Adapter ordinal (overrides HWDECODE_ADAPTER)
    #[arg(long)]
    adapter: Option<u32>,

    /// Surfaces held by the display queue (overrides HWDECODE_QUEUE_SURFACES)
    #[arg(long)]
    queue_surfaces: Option<u32>,

    /// Hard cap on the surface pool
    #[arg(long)]
    max_surfaces: Option<u32>,
}

#[derive(Debug, Serialize)]
struct NegotiateOutput {
    adapter: AdapterOutput,
    profile: String,
    profile_guid: String,
    output_format: String,
    width: u32,
    height: u32,
    bitstream_raw: u32,
    min_render_targets: u32,
    surfaces: usize,
    workaround: &'static str,
    frame_copy: String,
    first_surface: usize,
}

#[derive(Debug, Serialize)]
struct AdapterOutput {
    ordinal: u32,
    description: String,
    vendor: &'static str,
    vendor_id: String,
    device_id: String,
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    log::debug!("Executing negotiate command: {:?}", args);

    let codec: Codec = args
        .codec
        .parse()
        .map_err(|_| CliError::InvalidArgs(format!("Unknown codec: {}", args.codec)))?;
    let (width, height) = parse_resolution(&args.size)?;

    let mut params = CodecParams::new(codec, width, height).with_refs(args.refs);
    if let Some(profile) = &args.profile {
        params = params.with_profile(parse_profile(codec, profile)?);
    }
    if args.high_bit_depth {
        params = params.with_sw_pix_fmt(PixelFormat::Yuv420p10);
    }

    let mut config = SessionConfig::from_env();
    if let Some(adapter) = args.adapter {
        config = config.with_adapter(adapter);
    }
    if let Some(queue) = args.queue_surfaces {
        config = config.with_queue_surfaces(queue);
    }
    if let Some(max) = args.max_surfaces {
        config = config.with_max_surfaces(max);
    }

    let platform = ReplayPlatform::load(&args.caps)?;
    let mut session = DecoderSession::new(config);
    session.bind_platform(&platform)?;

    let format = session.check_support(&params)?;
    log::info!("Stream supported by {} to {}", format.profile, format.format);

    match session.reinit(&params)? {
        Reinit::Recreated => {}
        other => {
            return Err(CliError::General(format!(
                "Unexpected decoder state after creation: {:?}",
                other
            )))
        }
    }

    let params = params.with_pix_fmt(PixelFormat::Dxva2Vld);
    let lease = session.on_buffer_request(&params, &FrameDescriptor::hardware())?;
    let first_surface = lease.index();
    drop(lease);

    let negotiation = session
        .negotiation()
        .copied()
        .ok_or_else(|| CliError::General("No negotiation recorded".to_string()))?;
    let (ordinal, adapter) = platform
        .bound_adapter()
        .ok_or_else(|| CliError::General("No adapter bound".to_string()))?;

    let output = NegotiateOutput {
        adapter: AdapterOutput {
            ordinal,
            description: adapter.description.clone(),
            vendor: adapter.identity.vendor_name(),
            vendor_id: format!("0x{:04x}", adapter.identity.vendor_id),
            device_id: format!("0x{:04x}", adapter.identity.device_id),
        },
        profile: negotiation.format.profile.symbol.to_string(),
        profile_guid: negotiation.format.profile_guid().to_string(),
        output_format: negotiation.format.format.to_string(),
        width: negotiation.desc.width,
        height: negotiation.desc.height,
        bitstream_raw: negotiation.config.bitstream_raw,
        min_render_targets: negotiation.config.min_render_targets,
        surfaces: negotiation.surface_count,
        workaround: negotiation.workaround.name(),
        frame_copy: format!("{:?}", session.frame_copy().unwrap_or_default()).to_lowercase(),
        first_surface,
    };

    if json {
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::General(format!("JSON serialization failed: {}", e)))?;
        println!("{}", text);
    } else {
        print_output(&output);
    }

    Ok(())
}

fn print_output(output: &NegotiateOutput) {
    let adapter = &output.adapter;
    println!(
        "Adapter {}: {} ({} {}:{})",
        adapter.ordinal, adapter.description, adapter.vendor, adapter.vendor_id, adapter.device_id
    );
    println!("  Profile:      {} {}", output.profile, output.profile_guid);
    println!("  Output:       {}", output.output_format);
    println!("  Surface size: {}x{}", output.width, output.height);
    println!(
        "  Config:       ConfigBitstreamRaw={} min render targets {}",
        output.bitstream_raw, output.min_render_targets
    );
    println!("  Surfaces:     {}", output.surfaces);
    println!("  Workaround:   {}", output.workaround);
    println!("  Frame copy:   {}", output.frame_copy);
}
