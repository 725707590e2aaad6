// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Decode profile table.
//!
//! Every hardware decode mode the platform may report, in preference order:
//! when two profiles for the same codec are both supported, the one listed
//! first wins. Profiles without an associated codec (motion compensation,
//! IDCT and post-processing only) are listed so enumeration logs can name
//! them, but they are never selected.

use crate::{codec::Codec, guid::Guid};
use std::fmt;

/// A hardware decode mode known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeProfile {
    /// Platform symbol for the mode, e.g. `DXVA2_ModeH264_E`
    pub symbol: &'static str,
    pub name: &'static str,
    pub guid: Guid,
    /// Codec decoded by this mode, `None` when the mode is not selectable
    pub codec: Option<Codec>,
    /// Set on the profile dedicated to high bit-depth samples
    pub high_bit_depth: bool,
}

impl DecodeProfile {
    const fn new(
        symbol: &'static str,
        name: &'static str,
        guid: Guid,
        codec: Option<Codec>,
    ) -> Self {
        DecodeProfile {
            symbol,
            name,
            guid,
            codec,
            high_bit_depth: false,
        }
    }

    const fn high_depth(self) -> Self {
        DecodeProfile {
            high_bit_depth: true,
            ..self
        }
    }

    /// Position in [`MODES`]; lower ranks are preferred.
    pub fn rank(&self) -> usize {
        MODES
            .iter()
            .position(|mode| mode == self)
            .unwrap_or(MODES.len())
    }
}

impl fmt::Display for DecodeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

pub const DXVA2_MODE_MPEG2_MOCOMP: Guid = Guid::from_u128(0xe6a9f44b_61b0_4563_9ea4_63d2a3c6fe66);
pub const DXVA2_MODE_MPEG2_IDCT: Guid = Guid::from_u128(0xbf22ad00_03ea_4690_8077_473346209b7e);
pub const DXVA2_MODE_MPEG2_VLD: Guid = Guid::from_u128(0xee27417f_5e28_4e65_beea_1d26b508adc9);
pub const DXVA2_MODE_MPEG1_VLD: Guid = Guid::from_u128(0x6f3ec719_3735_42cc_8063_65cc3cb36616);
pub const DXVA2_MODE_MPEG2AND1_VLD: Guid = Guid::from_u128(0x86695f12_340e_4f04_9fd3_9253dd327460);

pub const DXVA2_MODE_H264_A: Guid = Guid::from_u128(0x1b81be64_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_H264_B: Guid = Guid::from_u128(0x1b81be65_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_H264_C: Guid = Guid::from_u128(0x1b81be66_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_H264_D: Guid = Guid::from_u128(0x1b81be67_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_H264_E: Guid = Guid::from_u128(0x1b81be68_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_H264_F: Guid = Guid::from_u128(0x1b81be69_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA_MODE_H264_VLD_WITH_FMOASO_NOFGT: Guid =
    Guid::from_u128(0xd5f04ff9_3418_45d8_9561_32a76aae2ddd);
pub const DXVA_MODE_H264_VLD_NOFGT_FLASH: Guid =
    Guid::from_u128(0x4245f676_2bbc_4166_a0bb_54e7b849c380);

pub const DXVA2_MODE_WMV8_A: Guid = Guid::from_u128(0x1b81be80_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_WMV8_B: Guid = Guid::from_u128(0x1b81be81_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_WMV9_A: Guid = Guid::from_u128(0x1b81be90_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_WMV9_B: Guid = Guid::from_u128(0x1b81be91_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_WMV9_C: Guid = Guid::from_u128(0x1b81be94_a0c7_11d3_b984_00c04f2e73c5);

pub const DXVA2_MODE_VC1_A: Guid = Guid::from_u128(0x1b81bea0_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_VC1_B: Guid = Guid::from_u128(0x1b81bea1_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_VC1_C: Guid = Guid::from_u128(0x1b81bea2_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_VC1_D: Guid = Guid::from_u128(0x1b81bea3_a0c7_11d3_b984_00c04f2e73c5);
pub const DXVA2_MODE_VC1_D2010: Guid = Guid::from_u128(0x1b81bea4_a0c7_11d3_b984_00c04f2e73c5);

pub const DXVA_NVIDIA_MPEG4_ASP: Guid = Guid::from_u128(0x9947ec6f_689b_11dc_a320_0019dbbc4184);
pub const DXVA_MODE_MPEG4PT2_VLD_SIMPLE: Guid =
    Guid::from_u128(0xefd64d74_c9e8_41d7_a5e9_e9b0e39fa319);
pub const DXVA_MODE_MPEG4PT2_VLD_ADVSIMPLE_NOGMC: Guid =
    Guid::from_u128(0xed418a9f_010d_4eda_9ae3_9a65358d8d2e);
pub const DXVA_MODE_MPEG4PT2_VLD_ADVSIMPLE_GMC: Guid =
    Guid::from_u128(0xab998b5b_4258_44a9_9feb_94e597a6baae);
pub const DXVA_MODE_MPEG4PT2_VLD_ADVSIMPLE_AVIVO: Guid =
    Guid::from_u128(0x7c74adc6_e2ba_4ade_86de_30beabb40c5a);

pub const DXVA_MODE_H264_VLD_STEREO_PROGRESSIVE_NOFGT: Guid =
    Guid::from_u128(0xd79be8da_0cf1_4c81_b82a_69a4e236f43d);
pub const DXVA_MODE_H264_VLD_STEREO_NOFGT: Guid =
    Guid::from_u128(0xf9aaccbb_c2b6_4cfc_8779_5707b1760552);
pub const DXVA_MODE_H264_VLD_MULTIVIEW_NOFGT: Guid =
    Guid::from_u128(0x705b9d82_76cf_49d6_b7e6_ac8872db013c);

pub const DXVA_MODE_H264_VLD_SVC_SCALABLE_BASELINE: Guid =
    Guid::from_u128(0xc30700c4_e384_43e0_b982_2d89ee7f77c4);
pub const DXVA_MODE_H264_VLD_SVC_RESTRICTED_SCALABLE_BASELINE: Guid =
    Guid::from_u128(0x9b8175d4_d670_4cf2_a9f0_fa56df71a1ae);
pub const DXVA_MODE_H264_VLD_SVC_SCALABLE_HIGH: Guid =
    Guid::from_u128(0x728012c9_66a8_422f_97e9_b5e39b51c053);
pub const DXVA_MODE_H264_VLD_SVC_RESTRICTED_SCALABLE_HIGH_PROGRESSIVE: Guid =
    Guid::from_u128(0x8efa5926_bd9e_4b04_8b72_8f977dc44c36);

pub const DXVA_MODE_HEVC_VLD_MAIN: Guid = Guid::from_u128(0x5b11d51b_2f4c_4452_bcc3_09f2a1160cc0);
pub const DXVA_MODE_HEVC_VLD_MAIN10: Guid = Guid::from_u128(0x107af0e0_ef1a_4d19_aba8_67a163073d13);

pub const DXVADDI_INTEL_MODE_H264_A: Guid = Guid::from_u128(0x604f8e64_4951_4c54_88fe_abd25c15b3d6);
pub const DXVADDI_INTEL_MODE_H264_C: Guid = Guid::from_u128(0x604f8e66_4951_4c54_88fe_abd25c15b3d6);
pub const DXVADDI_INTEL_MODE_H264_E: Guid = Guid::from_u128(0x604f8e68_4951_4c54_88fe_abd25c15b3d6);
pub const DXVA_INTEL_VC1_CLEARVIDEO: Guid = Guid::from_u128(0xbcc5db6d_a2b6_4af0_ace4_adb1f787bc89);
pub const DXVA_INTEL_VC1_CLEARVIDEO_2: Guid =
    Guid::from_u128(0xe07ec519_e651_4cd6_ac84_1370cceec851);

use Codec::{Hevc, Mpeg2Video, Vc1, Wmv3, H264};

/// Known decode modes, preferred modes first.
#[rustfmt::skip]
pub static MODES: &[DecodeProfile] = &[
    // MPEG-1/2
    DecodeProfile::new("DXVA2_ModeMPEG2_VLD", "MPEG-2 variable-length decoder", DXVA2_MODE_MPEG2_VLD, Some(Mpeg2Video)),
    DecodeProfile::new("DXVA2_ModeMPEG2and1_VLD", "MPEG-2 & MPEG-1 variable-length decoder", DXVA2_MODE_MPEG2AND1_VLD, Some(Mpeg2Video)),
    DecodeProfile::new("DXVA2_ModeMPEG2_MoComp", "MPEG-2 motion compensation", DXVA2_MODE_MPEG2_MOCOMP, None),
    DecodeProfile::new("DXVA2_ModeMPEG2_IDCT", "MPEG-2 inverse discrete cosine transform", DXVA2_MODE_MPEG2_IDCT, None),
    DecodeProfile::new("DXVA2_ModeMPEG1_VLD", "MPEG-1 variable-length decoder", DXVA2_MODE_MPEG1_VLD, None),
    // H.264
    DecodeProfile::new("DXVA2_ModeH264_F", "H.264 variable-length decoder, film grain technology", DXVA2_MODE_H264_F, Some(H264)),
    DecodeProfile::new("DXVA2_ModeH264_E", "H.264 variable-length decoder, no film grain technology", DXVA2_MODE_H264_E, Some(H264)),
    DecodeProfile::new("DXVA_ModeH264_VLD_WithFMOASO_NoFGT", "H.264 variable-length decoder, no film grain technology, FMO/ASO", DXVA_MODE_H264_VLD_WITH_FMOASO_NOFGT, Some(H264)),
    DecodeProfile::new("DXVA_ModeH264_VLD_NoFGT_Flash", "H.264 variable-length decoder, no film grain technology, Flash", DXVA_MODE_H264_VLD_NOFGT_FLASH, Some(H264)),
    DecodeProfile::new("DXVA2_ModeH264_D", "H.264 inverse discrete cosine transform, film grain technology", DXVA2_MODE_H264_D, None),
    DecodeProfile::new("DXVA2_ModeH264_C", "H.264 inverse discrete cosine transform, no film grain technology", DXVA2_MODE_H264_C, None),
    DecodeProfile::new("DXVA2_ModeH264_B", "H.264 motion compensation, film grain technology", DXVA2_MODE_H264_B, None),
    DecodeProfile::new("DXVA2_ModeH264_A", "H.264 motion compensation, no film grain technology", DXVA2_MODE_H264_A, None),
    // WMV
    DecodeProfile::new("DXVA2_ModeWMV8_B", "Windows Media Video 8 motion compensation", DXVA2_MODE_WMV8_B, None),
    DecodeProfile::new("DXVA2_ModeWMV8_A", "Windows Media Video 8 post processing", DXVA2_MODE_WMV8_A, None),
    DecodeProfile::new("DXVA2_ModeWMV9_C", "Windows Media Video 9 IDCT", DXVA2_MODE_WMV9_C, None),
    DecodeProfile::new("DXVA2_ModeWMV9_B", "Windows Media Video 9 motion compensation", DXVA2_MODE_WMV9_B, None),
    DecodeProfile::new("DXVA2_ModeWMV9_A", "Windows Media Video 9 post processing", DXVA2_MODE_WMV9_A, None),
    // VC-1, the same mode serves VC-1 and WMV3 streams
    DecodeProfile::new("DXVA2_ModeVC1_D2010", "VC-1 variable-length decoder (2010)", DXVA2_MODE_VC1_D2010, Some(Vc1)),
    DecodeProfile::new("DXVA2_ModeVC1_D2010", "VC-1 variable-length decoder (2010)", DXVA2_MODE_VC1_D2010, Some(Wmv3)),
    DecodeProfile::new("DXVA2_ModeVC1_D", "VC-1 variable-length decoder", DXVA2_MODE_VC1_D, Some(Vc1)),
    DecodeProfile::new("DXVA2_ModeVC1_D", "VC-1 variable-length decoder", DXVA2_MODE_VC1_D, Some(Wmv3)),
    DecodeProfile::new("DXVA2_ModeVC1_C", "VC-1 inverse discrete cosine transform", DXVA2_MODE_VC1_C, None),
    DecodeProfile::new("DXVA2_ModeVC1_B", "VC-1 motion compensation", DXVA2_MODE_VC1_B, None),
    DecodeProfile::new("DXVA2_ModeVC1_A", "VC-1 post processing", DXVA2_MODE_VC1_A, None),
    // MPEG-4 Part 2
    DecodeProfile::new("DXVA_nVidia_MPEG4_ASP", "MPEG-4 Part 2 nVidia bitstream decoder", DXVA_NVIDIA_MPEG4_ASP, None),
    DecodeProfile::new("DXVA_ModeMPEG4pt2_VLD_Simple", "MPEG-4 Part 2 variable-length decoder, Simple Profile", DXVA_MODE_MPEG4PT2_VLD_SIMPLE, None),
    DecodeProfile::new("DXVA_ModeMPEG4pt2_VLD_AdvSimple_NoGMC", "MPEG-4 Part 2 variable-length decoder, Simple&Advanced Profile, no GMC", DXVA_MODE_MPEG4PT2_VLD_ADVSIMPLE_NOGMC, None),
    DecodeProfile::new("DXVA_ModeMPEG4pt2_VLD_AdvSimple_GMC", "MPEG-4 Part 2 variable-length decoder, Simple&Advanced Profile, GMC", DXVA_MODE_MPEG4PT2_VLD_ADVSIMPLE_GMC, None),
    DecodeProfile::new("DXVA_ModeMPEG4pt2_VLD_AdvSimple_Avivo", "MPEG-4 Part 2 variable-length decoder, Simple&Advanced Profile, Avivo", DXVA_MODE_MPEG4PT2_VLD_ADVSIMPLE_AVIVO, None),
    // H.264 MVC
    DecodeProfile::new("DXVA_ModeH264_VLD_Stereo_Progressive_NoFGT", "H.264 MVC variable-length decoder, stereo, progressive", DXVA_MODE_H264_VLD_STEREO_PROGRESSIVE_NOFGT, None),
    DecodeProfile::new("DXVA_ModeH264_VLD_Stereo_NoFGT", "H.264 MVC variable-length decoder, stereo", DXVA_MODE_H264_VLD_STEREO_NOFGT, None),
    DecodeProfile::new("DXVA_ModeH264_VLD_Multiview_NoFGT", "H.264 MVC variable-length decoder, multiview", DXVA_MODE_H264_VLD_MULTIVIEW_NOFGT, None),
    // H.264 SVC
    DecodeProfile::new("DXVA_ModeH264_VLD_SVC_Scalable_Baseline", "H.264 SVC variable-length decoder, baseline", DXVA_MODE_H264_VLD_SVC_SCALABLE_BASELINE, None),
    DecodeProfile::new("DXVA_ModeH264_VLD_SVC_Restricted_Scalable_Baseline", "H.264 SVC variable-length decoder, constrained baseline", DXVA_MODE_H264_VLD_SVC_RESTRICTED_SCALABLE_BASELINE, None),
    DecodeProfile::new("DXVA_ModeH264_VLD_SVC_Scalable_High", "H.264 SVC variable-length decoder, high", DXVA_MODE_H264_VLD_SVC_SCALABLE_HIGH, None),
    DecodeProfile::new("DXVA_ModeH264_VLD_SVC_Restricted_Scalable_High_Progressive", "H.264 SVC variable-length decoder, constrained high progressive", DXVA_MODE_H264_VLD_SVC_RESTRICTED_SCALABLE_HIGH_PROGRESSIVE, None),
    // HEVC
    DecodeProfile::new("DXVA_ModeHEVC_VLD_Main", "HEVC / H.265 variable-length decoder, main", DXVA_MODE_HEVC_VLD_MAIN, Some(Hevc)),
    DecodeProfile::new("DXVA_ModeHEVC_VLD_Main10", "HEVC / H.265 variable-length decoder, main10", DXVA_MODE_HEVC_VLD_MAIN10, Some(Hevc)).high_depth(),
    // Intel specific modes, only useful on older GPUs
    DecodeProfile::new("DXVADDI_Intel_ModeH264_E", "H.264 variable-length decoder, no film grain technology (Intel ClearVideo)", DXVADDI_INTEL_MODE_H264_E, Some(H264)),
    DecodeProfile::new("DXVADDI_Intel_ModeH264_C", "H.264 inverse discrete cosine transform, no film grain technology (Intel)", DXVADDI_INTEL_MODE_H264_C, None),
    DecodeProfile::new("DXVADDI_Intel_ModeH264_A", "H.264 motion compensation, no film grain technology (Intel)", DXVADDI_INTEL_MODE_H264_A, None),
    DecodeProfile::new("DXVA_Intel_VC1_ClearVideo_2", "VC-1 variable-length decoder 2 (Intel)", DXVA_INTEL_VC1_CLEARVIDEO_2, None),
    DecodeProfile::new("DXVA_Intel_VC1_ClearVideo", "VC-1 variable-length decoder (Intel)", DXVA_INTEL_VC1_CLEARVIDEO, None),
];

/// Looks up the first table entry for a profile GUID.
pub fn find(guid: &Guid) -> Option<&'static DecodeProfile> {
    MODES.iter().find(|mode| mode.guid == *guid)
}

/// Selectable modes for a codec, in preference order.
pub fn for_codec(codec: Codec) -> impl Iterator<Item = &'static DecodeProfile> {
    MODES.iter().filter(move |mode| mode.codec == Some(codec))
}

/// Names each hardware-reported profile GUID, `None` for unknown GUIDs.
pub fn describe_profiles(guids: &[Guid]) -> Vec<(Guid, Option<&'static DecodeProfile>)> {
    guids.iter().map(|guid| (*guid, find(guid))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_find_returns_first_entry() {
        let mode = find(&DXVA2_MODE_VC1_D2010).unwrap();
        assert_eq!(mode.codec, Some(Codec::Vc1));
        assert_eq!(mode.symbol, "DXVA2_ModeVC1_D2010");
        assert!(find(&Guid::NULL).is_none());
    }

    #[test]
    fn test_preference_order() {
        let h264: Vec<&str> = for_codec(Codec::H264).map(|mode| mode.symbol).collect();
        assert_eq!(
            h264,
            [
                "DXVA2_ModeH264_F",
                "DXVA2_ModeH264_E",
                "DXVA_ModeH264_VLD_WithFMOASO_NoFGT",
                "DXVA_ModeH264_VLD_NoFGT_Flash",
                "DXVADDI_Intel_ModeH264_E",
            ]
        );

        let wmv3: Vec<Guid> = for_codec(Codec::Wmv3).map(|mode| mode.guid).collect();
        assert_eq!(wmv3, [DXVA2_MODE_VC1_D2010, DXVA2_MODE_VC1_D]);
    }

    #[test]
    fn test_every_codec_has_a_profile() {
        for codec in Codec::ALL {
            assert!(for_codec(codec).next().is_some(), "{} has no profile", codec);
        }
    }

    #[test]
    fn test_only_hevc_main10_is_high_depth() {
        let high: Vec<&DecodeProfile> = MODES.iter().filter(|mode| mode.high_bit_depth).collect();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].guid, DXVA_MODE_HEVC_VLD_MAIN10);
    }

    #[test]
    fn test_guids_unique_per_codec() {
        let mut seen = HashSet::new();
        for mode in MODES {
            assert!(
                seen.insert((mode.guid, mode.codec)),
                "duplicate entry {}",
                mode.symbol
            );
        }
    }

    #[test]
    fn test_rank() {
        assert_eq!(MODES[0].rank(), 0);
        let main10 = find(&DXVA_MODE_HEVC_VLD_MAIN10).unwrap();
        let main = find(&DXVA_MODE_HEVC_VLD_MAIN).unwrap();
        assert!(main.rank() < main10.rank());
    }

    #[test]
    fn test_describe_profiles() {
        let unknown = Guid::from_u128(0x12345678_0000_0000_0000_000000000000);
        let described = describe_profiles(&[DXVA2_MODE_H264_E, unknown]);
        assert_eq!(described.len(), 2);
        assert_eq!(described[0].1.map(|m| m.symbol), Some("DXVA2_ModeH264_E"));
        assert!(described[1].1.is_none());
    }
}
