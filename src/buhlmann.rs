//! ZH-L16C gradient-factor implementation of the decompression contract.

use tracing::warn;

use crate::deco::DecoModel;
use crate::gas::GasMix;
use crate::tissue::{load_tissue, surface_n2_load, water_vapor_pressure, Tissue, COMPARTMENTS};
use crate::zh16c::ZhL16cGf;

/// Tissue state and gradient-factor configuration. The gradient factor is
/// interpolated between `gf_high` at the surface and `gf_low` at the deepest
/// ambient pressure seen since `init`.
#[derive(Debug, Clone)]
pub struct Buhlmann {
    tissues: [Tissue; COMPARTMENTS],
    gf_low: f32,
    gf_high: f32,
    gf_low_at_maxdepth: bool,
    surface_bar: f32,
    max_ambient_bar: f32,
}

/// Snapshot of everything `advance` mutates. Plain value type so the
/// scheduler's trial rollback is O(1) and allocation free.
#[derive(Debug, Clone, Copy)]
pub struct BuhlmannState {
    tissues: [Tissue; COMPARTMENTS],
    max_ambient_bar: f32,
}

impl Buhlmann {
    pub fn new() -> Self {
        Buhlmann {
            tissues: [Tissue::default(); COMPARTMENTS],
            gf_low: 1.0,
            gf_high: 1.0,
            gf_low_at_maxdepth: true,
            surface_bar: 1.013,
            max_ambient_bar: 1.013,
        }
    }

    /// Inspired inert gas partial pressures for a segment, bar. A positive
    /// setpoint selects closed-circuit math: the loop holds pO₂ constant and
    /// the diluent supplies the inert fraction.
    fn inspired(&self, ambient_bar: f32, gas: &GasMix, setpoint_mbar: i32) -> (f32, f32) {
        let breathable = (ambient_bar - water_vapor_pressure()).max(0.0);
        let n2 = gas.n2() as f32;
        let he = gas.he as f32;
        if setpoint_mbar > 0 {
            let po2 = (setpoint_mbar as f32 / 1000.0).min(breathable);
            let inert = breathable - po2;
            let diluent_inert = n2 + he;
            if diluent_inert > 0.0 {
                (inert * n2 / diluent_inert, inert * he / diluent_inert)
            } else {
                (0.0, 0.0)
            }
        } else {
            (breathable * n2 / 1000.0, breathable * he / 1000.0)
        }
    }

    /// Gradient factor applicable at an ambient pressure, linear between the
    /// surface and the GF-low anchor.
    fn gf_at(&self, ambient_bar: f32) -> f32 {
        let span = self.max_ambient_bar - self.surface_bar;
        if span <= 0.0 {
            return self.gf_high;
        }
        let t = ((ambient_bar - self.surface_bar) / span).clamp(0.0, 1.0);
        self.gf_high + (self.gf_low - self.gf_high) * t
    }

    /// Deepest ambient pressure this compartment tolerates, bar. The a/b
    /// coefficients are blended by inert gas loading; the gradient factor
    /// depends on the answer, so iterate the fixed point a few rounds.
    fn tolerated_ambient(&self, tissue_index: usize) -> f32 {
        let pn2 = self.tissues[tissue_index].load_n2;
        let phe = self.tissues[tissue_index].load_he;
        let p = pn2 + phe;
        if p <= 0.0 {
            return 0.0;
        }

        let a = (ZhL16cGf::N2_A[tissue_index] * pn2 + ZhL16cGf::HE_A[tissue_index] * phe) / p;
        let b = (ZhL16cGf::N2_B[tissue_index] * pn2 + ZhL16cGf::HE_B[tissue_index] * phe) / p;

        let mut gf = self.gf_high;
        let mut tolerated = 0.0;
        for _ in 0..4 {
            tolerated = (p - a * gf) * b / (gf - gf * b + b);
            gf = self.gf_at(tolerated);
        }
        tolerated
    }

    fn tolerance(&self) -> f32 {
        (0..COMPARTMENTS)
            .map(|i| self.tolerated_ambient(i))
            .fold(0.0, f32::max)
    }
}

impl Default for Buhlmann {
    fn default() -> Self {
        Buhlmann::new()
    }
}

impl DecoModel for Buhlmann {
    type State = BuhlmannState;

    fn init(&mut self, surface_pressure_mbar: i32) -> f32 {
        self.surface_bar = surface_pressure_mbar as f32 / 1000.0;
        self.max_ambient_bar = self.surface_bar;
        let load_n2 = surface_n2_load(self.surface_bar);
        for tissue in &mut self.tissues {
            tissue.load_n2 = load_n2;
            tissue.load_he = 0.0;
        }
        self.tolerance()
    }

    fn set_gf(&mut self, gf_low: f32, gf_high: f32, low_at_maxdepth: bool) {
        let mut low = gf_low.clamp(0.05, 1.0);
        let mut high = gf_high.clamp(0.05, 1.0);
        if low > high {
            warn!(gf_low, gf_high, "GF low above GF high, swapping");
            core::mem::swap(&mut low, &mut high);
        }
        self.gf_low = low;
        self.gf_high = high;
        self.gf_low_at_maxdepth = low_at_maxdepth;
    }

    fn advance(&mut self, depth_bar: f32, gas: &GasMix, duration_s: i32, setpoint_mbar: i32) -> f32 {
        if depth_bar > self.max_ambient_bar
            && (self.gf_low_at_maxdepth || self.tolerance() > self.surface_bar)
        {
            self.max_ambient_bar = depth_bar;
        }
        let (pn2, phe) = self.inspired(depth_bar, gas, setpoint_mbar);
        let minutes = duration_s as f32 / 60.0;
        for i in 0..COMPARTMENTS {
            self.tissues[i] = load_tissue(self.tissues[i], i, pn2, phe, minutes);
        }
        self.tolerance()
    }

    fn allowed_depth(&self, tissue_tolerance_bar: f32, surface_pressure_bar: f32, conservative: bool) -> i32 {
        let rel_bar = tissue_tolerance_bar - surface_pressure_bar;
        let depth_mm = (rel_bar * 10000.0).ceil() as i32;
        if conservative {
            // signed: negative means the tissues tolerate the surface with
            // margin, which the trial loop needs to clear the final ascent
            depth_mm
        } else {
            // nearest 3 m stop multiple, for presentation
            ((depth_mm.max(0) as f32 / 3000.0).round() as i32) * 3000
        }
    }

    fn snapshot(&self) -> BuhlmannState {
        BuhlmannState {
            tissues: self.tissues,
            max_ambient_bar: self.max_ambient_bar,
        }
    }

    fn restore(&mut self, state: &BuhlmannState) -> f32 {
        self.tissues = state.tissues;
        self.max_ambient_bar = state.max_ambient_bar;
        self.tolerance()
    }
}
