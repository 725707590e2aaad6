// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies
//
// hwdecode CLI - Integration Tests
//
// TESTING LAYERS:
//
// Layer 1 (Unit Tests - No hardware required):
//   - Help text and command structure
//   - Invalid argument handling
//   - Decode profile table listing
//   - Negotiation replay from the capability files in tests/data
//   - Probe reporting a missing library
//
// Layer 3 (Hardware Integration - Requires the platform decode library):
//   - Probe of the installed library
//
// RUN LAYER 1:
//   cargo test --test cli
//
// RUN LAYER 3 (on hardware):
//   cargo test --test cli -- --ignored --nocapture

use assert_cmd::Command;
use predicates::prelude::*;
use std::env;

/// Helper to create a Command for the hwdecode binary
fn hwdecode_cmd() -> Command {
    let mut cmd = match env::var("HWDECODE_BIN") {
        Ok(bin_path) => Command::new(bin_path),
        Err(_) => Command::new(env!("CARGO_BIN_EXE_hwdecode")),
    };

    // Session overrides from the caller's environment would skew results
    cmd.env_remove("HWDECODE_ADAPTER");
    cmd.env_remove("HWDECODE_QUEUE_SURFACES");
    cmd
}

fn caps(name: &str) -> String {
    format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn negotiate_json(args: &[&str]) -> serde_json::Value {
    let output = hwdecode_cmd()
        .args(["--json", "negotiate"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "negotiate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// =============================================================================
// Layer 1: Basic Command Tests (No Hardware Required)
// =============================================================================

#[test]
fn test_help() {
    hwdecode_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("modes"))
        .stdout(predicate::str::contains("negotiate"))
        .stdout(predicate::str::contains("probe"));
}

#[test]
fn test_version() {
    hwdecode_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hwdecode"));
}

#[test]
fn test_negotiate_help() {
    hwdecode_cmd()
        .args(["negotiate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--caps"))
        .stdout(predicate::str::contains("--codec"))
        .stdout(predicate::str::contains("--refs"))
        .stdout(predicate::str::contains("--high-bit-depth"));
}

#[test]
fn test_invalid_subcommand() {
    hwdecode_cmd()
        .arg("invalid-command")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_negotiate_requires_caps() {
    hwdecode_cmd()
        .args(["negotiate", "--codec", "h264"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_negotiate_unknown_codec() {
    hwdecode_cmd()
        .args(["negotiate", "--caps", &caps("nvidia.json"), "--codec", "vp9"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Unknown codec: vp9"));
}

#[test]
fn test_negotiate_bad_resolution() {
    hwdecode_cmd()
        .args([
            "negotiate",
            "--caps",
            &caps("nvidia.json"),
            "--codec",
            "h264",
            "--size",
            "1920by1080",
        ])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_negotiate_oversized_resolution() {
    hwdecode_cmd()
        .args([
            "negotiate",
            "--caps",
            &caps("nvidia.json"),
            "--codec",
            "h264",
            "--size",
            "4294967295x1080",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("must not exceed 16384"));
}

#[test]
fn test_negotiate_missing_caps_file() {
    hwdecode_cmd()
        .args(["negotiate", "--caps", &caps("missing.json"), "--codec", "h264"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Cannot read"));
}

// =============================================================================
// Layer 1: Decode Profile Table
// =============================================================================

#[test]
fn test_modes_lists_selectable_profiles() {
    hwdecode_cmd()
        .arg("modes")
        .assert()
        .success()
        .stdout(predicate::str::contains("DXVA2_ModeH264_E"))
        .stdout(predicate::str::contains("DXVA_ModeHEVC_VLD_Main10"))
        .stdout(predicate::str::contains("DXVA2_ModeMPEG2_IDCT").not());
}

#[test]
fn test_modes_all() {
    hwdecode_cmd()
        .args(["modes", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DXVA2_ModeMPEG2_IDCT"));
}

#[test]
fn test_modes_json_codec_filter() {
    let output = hwdecode_cmd()
        .args(["--json", "modes", "--codec", "hevc"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["symbol"], "DXVA_ModeHEVC_VLD_Main");
    assert_eq!(rows[0]["high_bit_depth"], false);
    assert_eq!(rows[1]["symbol"], "DXVA_ModeHEVC_VLD_Main10");
    assert_eq!(rows[1]["high_bit_depth"], true);
    assert_eq!(rows[1]["guid"], "{107AF0E0-EF1A-4D19-ABA8-67A163073D13}");
    assert!(rows[0]["rank"].as_u64() < rows[1]["rank"].as_u64());
}

#[test]
fn test_modes_wmv3_shares_vc1_profiles() {
    let output = hwdecode_cmd()
        .args(["--json", "modes", "--codec", "wmv3"])
        .output()
        .unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let symbols: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(symbols, ["DXVA2_ModeVC1_D2010", "DXVA2_ModeVC1_D"]);
}

// =============================================================================
// Layer 1: Negotiation Replay
// =============================================================================

#[test]
fn test_negotiate_nvidia_h264() {
    let out = negotiate_json(&["--caps", &caps("nvidia.json"), "--codec", "h264"]);
    assert_eq!(out["profile"], "DXVA2_ModeH264_E");
    assert_eq!(out["output_format"], "NV12");
    assert_eq!(out["width"], 1920);
    assert_eq!(out["height"], 1088);
    assert_eq!(out["bitstream_raw"], 2);
    assert_eq!(out["surfaces"], 24);
    assert_eq!(out["workaround"], "none");
    assert_eq!(out["frame_copy"], "sequential");
    assert_eq!(out["adapter"]["vendor"], "NVIDIA");
    assert_eq!(out["adapter"]["vendor_id"], "0x10de");
}

#[test]
fn test_negotiate_nvidia_text() {
    hwdecode_cmd()
        .args(["negotiate", "--caps", &caps("nvidia.json"), "--codec", "mpeg2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DXVA2_ModeMPEG2_VLD"))
        .stdout(predicate::str::contains("Surfaces:     10"));
}

#[test]
fn test_negotiate_hevc_bit_depth() {
    let main = negotiate_json(&["--caps", &caps("nvidia.json"), "--codec", "hevc"]);
    assert_eq!(main["profile"], "DXVA_ModeHEVC_VLD_Main");
    assert_eq!(main["output_format"], "NV12");

    let main10 = negotiate_json(&[
        "--caps",
        &caps("nvidia.json"),
        "--codec",
        "hevc",
        "--high-bit-depth",
    ]);
    assert_eq!(main10["profile"], "DXVA_ModeHEVC_VLD_Main10");
    assert_eq!(main10["output_format"], "P010");
}

#[test]
fn test_negotiate_queue_and_cap() {
    let out = negotiate_json(&[
        "--caps",
        &caps("nvidia.json"),
        "--codec",
        "h264",
        "--queue-surfaces",
        "8",
    ]);
    assert_eq!(out["surfaces"], 28);

    let out = negotiate_json(&[
        "--caps",
        &caps("nvidia.json"),
        "--codec",
        "h264",
        "--max-surfaces",
        "18",
    ]);
    assert_eq!(out["surfaces"], 18);
}

#[test]
fn test_negotiate_adapter_fallback() {
    let out = negotiate_json(&[
        "--caps",
        &caps("nvidia.json"),
        "--codec",
        "vc1",
        "--adapter",
        "3",
    ]);
    assert_eq!(out["adapter"]["ordinal"], 0);
    assert_eq!(out["profile"], "DXVA2_ModeVC1_D2010");
}

#[test]
fn test_negotiate_unsupported_h264_profile() {
    hwdecode_cmd()
        .args([
            "negotiate",
            "--caps",
            &caps("nvidia.json"),
            "--codec",
            "h264",
            "--profile",
            "high10",
        ])
        .assert()
        .failure()
        .code(4);
}

#[test]
fn test_negotiate_amd_uvd_workaround() {
    let out = negotiate_json(&[
        "--caps",
        &caps("amd_uvd.json"),
        "--codec",
        "h264",
        "--queue-surfaces",
        "0",
    ]);
    assert_eq!(out["workaround"], "scaling-list-zigzag");
    assert_eq!(out["surfaces"], 20);
    // The encrypted raw=2 configuration loses to clear raw=1
    assert_eq!(out["bitstream_raw"], 1);
}

#[test]
fn test_negotiate_amd_uvd_ref_limit() {
    hwdecode_cmd()
        .args([
            "negotiate",
            "--caps",
            &caps("amd_uvd.json"),
            "--codec",
            "h264",
            "--size",
            "720x576",
            "--refs",
            "12",
        ])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("too many reference frames"));
}

#[test]
fn test_negotiate_amd_uvd_wmv3() {
    hwdecode_cmd()
        .args(["negotiate", "--caps", &caps("amd_uvd.json"), "--codec", "wmv3"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("WMV3"));
}

#[test]
fn test_negotiate_surface_allocation_failure() {
    hwdecode_cmd()
        .args(["negotiate", "--caps", &caps("amd_uvd.json"), "--codec", "h264"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("allocation failed"));
}

#[test]
fn test_negotiate_intel_clearvideo() {
    let out = negotiate_json(&["--caps", &caps("intel.json"), "--codec", "h264"]);
    assert_eq!(out["profile"], "DXVADDI_Intel_ModeH264_E");
    assert_eq!(out["workaround"], "intel-clearvideo");
    assert_eq!(out["frame_copy"], "parallel");
    assert_eq!(out["bitstream_raw"], 1);
}

#[test]
fn test_negotiate_intel_clearvideo_ref_limit() {
    hwdecode_cmd()
        .args([
            "negotiate",
            "--caps",
            &caps("intel.json"),
            "--codec",
            "h264",
            "--refs",
            "5",
        ])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Intel ClearVideo"));
}

#[test]
fn test_negotiate_no_compatible_profile() {
    hwdecode_cmd()
        .args(["negotiate", "--caps", &caps("intel.json"), "--codec", "hevc"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("no decoder device"));
}

// =============================================================================
// Layer 1: Library Probe
// =============================================================================

#[test]
fn test_probe_missing_library() {
    hwdecode_cmd()
        .env("HWDECODE_LIBRARY", "/nonexistent/hwdecode/dxva2.dll")
        .arg("probe")
        .assert()
        .failure()
        .code(3)
        .stdout(predicate::str::contains("/nonexistent/hwdecode/dxva2.dll"))
        .stdout(predicate::str::contains("Loaded:  no"));
}

#[test]
fn test_probe_missing_library_json() {
    let output = hwdecode_cmd()
        .env("HWDECODE_LIBRARY", "/nonexistent/hwdecode/dxva2.dll")
        .args(["--json", "probe"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["loaded"], false);
    assert!(report["error"].is_string());
    assert_eq!(report["symbols"].as_array().unwrap().len(), 0);
}

// =============================================================================
// Layer 3: Hardware Tests (Requires the platform decode library)
// =============================================================================

#[test]
#[ignore = "requires the platform decode library (run with --ignored on hardware)"]
fn test_probe_installed_library() {
    hwdecode_cmd()
        .env_remove("HWDECODE_LIBRARY")
        .arg("probe")
        .assert()
        .success()
        .stdout(predicate::str::contains("DXVA2CreateVideoService"));
}
