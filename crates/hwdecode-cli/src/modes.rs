// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Decode profile table listing.

use crate::error::CliError;
use clap::Args as ClapArgs;
use hwdecode::{codec::Codec, modes};
use serde::Serialize;

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Show only profiles selectable for this codec (mpeg2, h264, vc1, wmv3, hevc)
    #[arg(long)]
    codec: Option<String>,

    /// Include profiles that are never selected (IDCT, motion compensation)
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Serialize)]
struct ModeInfo {
    rank: usize,
    symbol: &'static str,
    name: &'static str,
    guid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    codec: Option<&'static str>,
    high_bit_depth: bool,
}

pub fn execute(args: Args, json: bool) -> Result<(), CliError> {
    log::debug!("Executing modes command: {:?}", args);

    let codec = args
        .codec
        .as_deref()
        .map(|name| {
            name.parse::<Codec>()
                .map_err(|_| CliError::InvalidArgs(format!("Unknown codec: {}", name)))
        })
        .transpose()?;

    let rows: Vec<ModeInfo> = modes::MODES
        .iter()
        .enumerate()
        .filter(|(_, mode)| match codec {
            Some(codec) => mode.codec == Some(codec),
            None => args.all || mode.codec.is_some(),
        })
        .map(|(rank, mode)| ModeInfo {
            rank,
            symbol: mode.symbol,
            name: mode.name,
            guid: mode.guid.to_string(),
            codec: mode.codec.map(|codec| codec.name()),
            high_bit_depth: mode.high_bit_depth,
        })
        .collect();

    if json {
        let output = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::General(format!("JSON serialization failed: {}", e)))?;
        println!("{}", output);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No decode profiles found");
        return Ok(());
    }

    println!(
        "{:>4}  {:<11} {:<40} {:<38}",
        "RANK", "CODEC", "SYMBOL", "GUID"
    );
    for row in &rows {
        let codec = match (row.codec, row.high_bit_depth) {
            (Some(codec), true) => format!("{} (10b)", codec),
            (Some(codec), false) => codec.to_string(),
            (None, _) => "-".to_string(),
        };
        println!(
            "{:>4}  {:<11} {:<40} {:<38}",
            row.rank, codec, row.symbol, row.guid
        );
    }
    println!();
    println!("{} profiles", rows.len());

    Ok(())
}
