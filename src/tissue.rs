//! Per-compartment inert gas loading.

use serde::{Deserialize, Serialize};

use crate::zh16c::ZhL16cGf;

pub const COMPARTMENTS: usize = 16;

/// Inert gas partial pressures of one compartment, bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tissue {
    pub load_n2: f32,
    pub load_he: f32,
}

impl Default for Tissue {
    fn default() -> Self {
        Tissue {
            load_n2: surface_n2_load(1.0),
            load_he: 0.0,
        }
    }
}

// at 37 deg celsius, 47 mmHg
pub fn water_vapor_pressure() -> f32 {
    0.0627
}

/// Inspired nitrogen partial pressure after full air saturation at the given
/// ambient pressure, bar.
pub fn surface_n2_load(ambient_bar: f32) -> f32 {
    (ambient_bar - water_vapor_pressure()) * 0.79
}

/// Haldane exponential: the compartment approaches the inspired partial
/// pressures with its ZH-L16C half-times.
///
/// pt(t) = pi + (pt0 - pi) * 2^(-t / half_life)
pub fn load_tissue(mut tissue: Tissue, tissue_index: usize, pn2_inspired: f32, phe_inspired: f32, minutes: f32) -> Tissue {
    debug_assert!(minutes >= 0.0, "minutes must be >= 0.0");

    let k_n2 = core::f32::consts::LN_2 / ZhL16cGf::N2_HALF_LIFE[tissue_index];
    let k_he = core::f32::consts::LN_2 / ZhL16cGf::HE_HALF_LIFE[tissue_index];

    tissue.load_n2 = pn2_inspired + (tissue.load_n2 - pn2_inspired) * (-k_n2 * minutes).exp();
    tissue.load_he = phe_inspired + (tissue.load_he - phe_inspired) * (-k_he * minutes).exp();

    tissue
}
