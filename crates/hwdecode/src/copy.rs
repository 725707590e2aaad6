// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Surface download strategy.
//!
//! Decoded surfaces are copied out of locked GPU memory plane by plane. The
//! strategy is chosen once per device binding: Intel integrated adapters
//! read mapped surfaces faster with several threads in flight.

use crate::{vendor::HardwareIdentity, Error};

/// How locked NV12 surfaces are copied into system memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameCopy {
    #[default]
    Sequential,
    /// Luma halves and chroma plane on three scoped threads
    Parallel,
}

impl FrameCopy {
    pub fn for_identity(identity: &HardwareIdentity) -> Self {
        if identity.is_intel() {
            FrameCopy::Parallel
        } else {
            FrameCopy::Sequential
        }
    }

    /// Copies an NV12 image out of a locked surface.
    ///
    /// `src` holds the luma plane of `surface_height` rows followed by the
    /// interleaved chroma plane, both with stride `pitch`. Only the first
    /// `image_height` luma rows and `image_height / 2` chroma rows are
    /// copied; destinations use the same stride.
    pub fn copy_nv12(
        &self,
        src: &[u8],
        pitch: usize,
        surface_height: usize,
        image_height: usize,
        dst_y: &mut [u8],
        dst_uv: &mut [u8],
    ) -> Result<(), Error> {
        if image_height > surface_height {
            return Err(Error::InvalidArgument("image taller than surface"));
        }

        let luma_len = image_height
            .checked_mul(pitch)
            .ok_or(Error::InvalidArgument("surface size overflows"))?;
        let chroma_len = luma_len / 2;
        let chroma_start = surface_height
            .checked_mul(pitch)
            .ok_or(Error::InvalidArgument("surface size overflows"))?;
        let src_end = chroma_start
            .checked_add(chroma_len)
            .ok_or(Error::InvalidArgument("surface size overflows"))?;

        if src.len() < src_end {
            return Err(Error::InvalidArgument("source shorter than surface"));
        }
        if dst_y.len() < luma_len || dst_uv.len() < chroma_len {
            return Err(Error::InvalidArgument("destination too small"));
        }

        let src_y = &src[..luma_len];
        let src_uv = &src[chroma_start..src_end];
        let dst_y = &mut dst_y[..luma_len];
        let dst_uv = &mut dst_uv[..chroma_len];

        match self {
            FrameCopy::Sequential => {
                dst_y.copy_from_slice(src_y);
                dst_uv.copy_from_slice(src_uv);
            }
            FrameCopy::Parallel => {
                // Split on a row boundary
                let split = (image_height / 2) * pitch;
                let (src_top, src_bottom) = src_y.split_at(split);
                let (dst_top, dst_bottom) = dst_y.split_at_mut(split);
                std::thread::scope(|scope| {
                    scope.spawn(|| dst_top.copy_from_slice(src_top));
                    scope.spawn(|| dst_bottom.copy_from_slice(src_bottom));
                    dst_uv.copy_from_slice(src_uv);
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::{VENDOR_ATI, VENDOR_INTEL};

    const PITCH: usize = 8;
    const SURFACE_HEIGHT: usize = 8;

    /// Luma rows hold their row number, chroma rows 100 + row.
    fn surface() -> Vec<u8> {
        let mut src = vec![0u8; PITCH * SURFACE_HEIGHT * 3 / 2];
        for (row, line) in src.chunks_mut(PITCH).enumerate() {
            let value = if row < SURFACE_HEIGHT {
                row as u8
            } else {
                100 + (row - SURFACE_HEIGHT) as u8
            };
            line.fill(value);
        }
        src
    }

    fn check(copy: FrameCopy, image_height: usize) {
        let src = surface();
        let mut y = vec![0xffu8; PITCH * image_height];
        let mut uv = vec![0xffu8; PITCH * image_height / 2];
        copy.copy_nv12(&src, PITCH, SURFACE_HEIGHT, image_height, &mut y, &mut uv)
            .unwrap();

        for (row, line) in y.chunks(PITCH).enumerate() {
            assert!(line.iter().all(|&b| b == row as u8), "luma row {}", row);
        }
        for (row, line) in uv.chunks(PITCH).enumerate() {
            assert!(line.iter().all(|&b| b == 100 + row as u8), "chroma row {}", row);
        }
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(
            FrameCopy::for_identity(&HardwareIdentity::new(VENDOR_INTEL, 0x1912)),
            FrameCopy::Parallel
        );
        assert_eq!(
            FrameCopy::for_identity(&HardwareIdentity::new(VENDOR_ATI, 0x9400)),
            FrameCopy::Sequential
        );
        assert_eq!(FrameCopy::default(), FrameCopy::Sequential);
    }

    #[test]
    fn test_sequential_copy() {
        check(FrameCopy::Sequential, SURFACE_HEIGHT);
        check(FrameCopy::Sequential, 6);
    }

    #[test]
    fn test_parallel_copy() {
        check(FrameCopy::Parallel, SURFACE_HEIGHT);
        check(FrameCopy::Parallel, 6);
    }

    #[test]
    fn test_copy_validates_lengths() {
        let src = surface();
        let mut y = vec![0u8; PITCH * SURFACE_HEIGHT];
        let mut uv = vec![0u8; PITCH * SURFACE_HEIGHT / 2];

        let short = &src[..src.len() - 1];
        assert!(matches!(
            FrameCopy::Sequential.copy_nv12(
                short,
                PITCH,
                SURFACE_HEIGHT,
                SURFACE_HEIGHT,
                &mut y,
                &mut uv,
            ),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            FrameCopy::Parallel.copy_nv12(
                &src,
                PITCH,
                SURFACE_HEIGHT,
                SURFACE_HEIGHT,
                &mut y[..8],
                &mut uv,
            ),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            FrameCopy::Sequential.copy_nv12(
                &src,
                PITCH,
                SURFACE_HEIGHT,
                SURFACE_HEIGHT + 2,
                &mut y,
                &mut uv,
            ),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_copy_rejects_overflowing_pitch() {
        let src = surface();
        let mut y = vec![0u8; PITCH * SURFACE_HEIGHT];
        let mut uv = vec![0u8; PITCH * SURFACE_HEIGHT / 2];

        for copy in [FrameCopy::Sequential, FrameCopy::Parallel] {
            let pitch = usize::MAX / 2;
            assert!(matches!(
                copy.copy_nv12(&src, pitch, SURFACE_HEIGHT, SURFACE_HEIGHT, &mut y, &mut uv),
                Err(Error::InvalidArgument("surface size overflows"))
            ));
            // Representable but far larger than the source
            assert!(matches!(
                copy.copy_nv12(&src, usize::MAX / 8, 4, 3, &mut y, &mut uv),
                Err(Error::InvalidArgument("source shorter than surface"))
            ));
        }
    }
}
