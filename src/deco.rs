//! Contract between the planner and the decompression model.

use crate::gas::GasMix;

/// A tissue-saturation model the ascent scheduler can drive.
///
/// `advance` is the only mutator of tissue state. The scheduler snapshots and
/// restores the state once per ladder level and per stop retry, so `State`
/// must be a cheap value type; implementations should keep it `Copy` and
/// allocation-free.
pub trait DecoModel {
    type State: Copy;

    /// Reset to surface saturation. Returns the tissue tolerance, bar.
    fn init(&mut self, surface_pressure_mbar: i32) -> f32;

    /// Gradient factors as fractions, and whether GF-low anchors at the
    /// deepest ambient pressure of the dive.
    fn set_gf(&mut self, gf_low: f32, gf_high: f32, low_at_maxdepth: bool);

    /// Load the tissues with one constant-depth segment. `setpoint_mbar > 0`
    /// selects closed-circuit math at that pO₂. Returns the tissue
    /// tolerance: the deepest ambient pressure (bar) the loaded tissues
    /// tolerate.
    fn advance(&mut self, depth_bar: f32, gas: &GasMix, duration_s: i32, setpoint_mbar: i32) -> f32;

    /// Translate a tissue tolerance into the shallowest permitted depth, mm.
    /// `conservative` returns the exact signed ceiling (negative when the
    /// tissues already tolerate the surface, so ascent trials can clear the
    /// last meters); otherwise the value is clamped and rounded to the
    /// nearest 3 m stop multiple for presentation.
    fn allowed_depth(&self, tissue_tolerance_bar: f32, surface_pressure_bar: f32, conservative: bool) -> i32;

    fn snapshot(&self) -> Self::State;

    /// Restore a snapshot taken earlier. Returns the tissue tolerance of the
    /// restored state.
    fn restore(&mut self, state: &Self::State) -> f32;
}
