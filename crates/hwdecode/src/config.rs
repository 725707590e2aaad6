// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Session configuration.
//!
//! Adapter choice and surface budget, taken from defaults, builder calls
//! or the process environment.

use crate::{codec::Codec, pool::MAX_SURFACES};
use std::str::FromStr;

/// Environment variable selecting the adapter ordinal.
pub const ADAPTER_ENV: &str = "HWDECODE_ADAPTER";

/// Environment variable setting the consumer queue depth in surfaces.
pub const QUEUE_SURFACES_ENV: &str = "HWDECODE_QUEUE_SURFACES";

/// Surfaces always reserved beyond the codec's reference frames.
const DECODE_SURFACES: u32 = 4;

/// Decoder session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Requested adapter ordinal; the default adapter is used if it fails
    pub adapter: u32,
    /// Surfaces the consumer holds in its display queue
    pub queue_surfaces: u32,
    /// Hard cap on pool size, at most [`MAX_SURFACES`]
    pub max_surfaces: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            adapter: 0,
            queue_surfaces: 4,
            max_surfaces: MAX_SURFACES as u32,
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `HWDECODE_ADAPTER` and
    /// `HWDECODE_QUEUE_SURFACES`. Unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut config = SessionConfig::default();
        if let Some(adapter) = env_value(ADAPTER_ENV) {
            config.adapter = adapter;
        }
        if let Some(queue) = env_value(QUEUE_SURFACES_ENV) {
            config.queue_surfaces = queue;
        }
        config
    }

    pub fn with_adapter(self, adapter: u32) -> Self {
        SessionConfig { adapter, ..self }
    }

    pub fn with_queue_surfaces(self, queue_surfaces: u32) -> Self {
        SessionConfig {
            queue_surfaces,
            ..self
        }
    }

    /// Values above [`MAX_SURFACES`] are clamped.
    pub fn with_max_surfaces(self, max_surfaces: u32) -> Self {
        SessionConfig {
            max_surfaces: max_surfaces.min(MAX_SURFACES as u32),
            ..self
        }
    }

    /// Pool size for `codec` given the decoder configuration's minimum
    /// render target count.
    pub fn surface_count(&self, codec: Codec, min_render_targets: u32) -> usize {
        let wanted = (codec.reference_surfaces() + DECODE_SURFACES)
            .saturating_add(self.queue_surfaces);
        let cap = self.max_surfaces.clamp(1, MAX_SURFACES as u32);
        wanted.max(min_render_targets).max(1).min(cap) as usize
    }
}

fn env_value<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid number", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var(ADAPTER_ENV);
        std::env::remove_var(QUEUE_SURFACES_ENV);
    }

    #[test]
    fn test_surface_count() {
        let config = SessionConfig::default();
        assert_eq!(config.surface_count(Codec::H264, 0), 24);
        assert_eq!(config.surface_count(Codec::Hevc, 0), 24);
        assert_eq!(config.surface_count(Codec::Mpeg2Video, 0), 10);
        assert_eq!(config.surface_count(Codec::Vc1, 12), 12);

        let no_queue = config.with_queue_surfaces(0);
        assert_eq!(no_queue.surface_count(Codec::Wmv3, 0), 6);
    }

    #[test]
    fn test_surface_count_capped() {
        let config = SessionConfig::default().with_max_surfaces(16);
        assert_eq!(config.surface_count(Codec::H264, 0), 16);
        assert_eq!(config.surface_count(Codec::H264, 40), 16);

        let config = SessionConfig::default().with_queue_surfaces(100);
        assert_eq!(config.surface_count(Codec::H264, 0), MAX_SURFACES);

        assert_eq!(SessionConfig::default().with_max_surfaces(500).max_surfaces, 64);
        let zero = SessionConfig::default().with_max_surfaces(0);
        assert_eq!(zero.surface_count(Codec::Vc1, 0), 1);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        assert_eq!(SessionConfig::from_env(), SessionConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var(ADAPTER_ENV, "1");
        std::env::set_var(QUEUE_SURFACES_ENV, " 8 ");
        let config = SessionConfig::from_env();
        assert_eq!(config.adapter, 1);
        assert_eq!(config.queue_surfaces, 8);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_garbage() {
        clear_env();
        std::env::set_var(ADAPTER_ENV, "primary");
        std::env::set_var(QUEUE_SURFACES_ENV, "-3");
        assert_eq!(SessionConfig::from_env(), SessionConfig::default());
        clear_env();
    }
}
