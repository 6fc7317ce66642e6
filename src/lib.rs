//! Dive planner core.
//!
//! Takes a user-authored descent/bottom profile, a cylinder inventory and a
//! decompression model, and synthesizes the full dive: ascent schedule with
//! the required decompression stops, gas switches, per-cylinder gas
//! consumption and a textual plan summary.
//!
//! The decompression model is consumed through the [`deco::DecoModel`] trait;
//! [`buhlmann::Buhlmann`] is the built-in ZH-L16C gradient-factor
//! implementation.

use thiserror::Error;

pub mod buhlmann;
pub mod cylinder;
pub mod deco;
pub mod gas;
pub mod ladder;
pub mod notes;
pub mod plan;
pub mod planner;
pub mod profile;
pub mod tissue;
pub mod zh16c;

/// Simulation step of the ascent loop, seconds.
pub const TIMESTEP: i32 = 1;
/// Unit of deco stop times, seconds.
pub const DECOTIMESTEP: i32 = 60;
/// Default surface pressure, mbar.
pub const SURFACE_PRESSURE: i32 = 1013;
/// Oxygen fraction of air, permille.
pub const O2_IN_AIR: i32 = 209;
/// Upper bound on the cylinder inventory of a single plan.
pub const MAX_CYLINDERS: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// A planned mix has no matching cylinder in the inventory.
    #[error("too many gas mixes: {0} is not on the cylinder list")]
    GasNotFound(String),
    #[error("more than {MAX_CYLINDERS} cylinders in the inventory")]
    TooManyCylinders,
    /// The stop search did not converge; the profile cannot be decompressed
    /// with the given gases and gradient factors.
    #[error("decompression schedule did not converge")]
    InvalidSolution,
}

/// Ambient pressure at depth, mbar. Depths are millimeters of seawater at
/// 10 m per bar.
pub fn depth_to_mbar(depth_mm: i32, surface_pressure_mbar: i32) -> i32 {
    surface_pressure_mbar + depth_mm / 10
}

/// Ambient pressure at depth, bar.
pub fn depth_to_bar(depth_mm: i32, surface_pressure_mbar: i32) -> f32 {
    depth_to_mbar(depth_mm, surface_pressure_mbar) as f32 / 1000.0
}

/// Ambient pressure at depth in standard atmospheres, used for gas
/// consumption accounting.
pub fn depth_to_atm(depth_mm: i32, surface_pressure_mbar: i32) -> f32 {
    depth_to_mbar(depth_mm, surface_pressure_mbar) as f32 / SURFACE_PRESSURE as f32
}

/// Planner configuration. All rates are integer mm/s; the defaults reproduce
/// the tiered ascent of the baseline planner (9 m/min in the deep quarter,
/// 6 m/min above it, 1 m/min for the final 6 m).
#[derive(Debug, Clone, Copy)]
pub struct PlanConfig {
    /// Place the last deco stop at 6 m instead of 3 m.
    pub last_stop_6m: bool,
    /// Render the plan summary as prose instead of a table.
    pub verbatim: bool,
    pub display_runtime: bool,
    pub display_duration: bool,
    pub display_transitions: bool,
    /// Anchor GF-low at the deepest ambient pressure of the dive.
    pub gf_low_at_maxdepth: bool,
    /// Depth at or above which the shallow ascent rate applies, mm.
    pub shallow_zone_mm: i32,
    /// Ascent rate within the shallow zone, mm/s.
    pub shallow_ascent_rate: i32,
    /// Ascent rate while deeper than 3/4 of the average depth, mm/s.
    pub deep_ascent_rate: i32,
    /// Ascent rate everywhere else, mm/s.
    pub base_ascent_rate: i32,
    /// Rate of the straight-to-surface segment when deco is skipped, mm/s.
    pub direct_ascent_rate: i32,
}

impl PlanConfig {
    pub fn new() -> Self {
        PlanConfig {
            last_stop_6m: false,
            verbatim: false,
            display_runtime: true,
            display_duration: false,
            display_transitions: false,
            gf_low_at_maxdepth: true,
            shallow_zone_mm: 6000,
            shallow_ascent_rate: 1000 / 60,
            deep_ascent_rate: 9000 / 60,
            base_ascent_rate: 6000 / 60,
            direct_ascent_rate: 75,
        }
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        PlanConfig::new()
    }
}

#[test]
fn test_depth_pressure_conversions() {
    assert_eq!(depth_to_mbar(0, SURFACE_PRESSURE), 1013);
    assert_eq!(depth_to_mbar(30000, SURFACE_PRESSURE), 4013);
    let atm = depth_to_atm(30000, SURFACE_PRESSURE);
    assert!((atm - 3.9615).abs() < 0.001);
}

#[test]
fn test_default_ascent_rates_are_integer_mm_per_s() {
    let config = PlanConfig::new();
    assert_eq!(config.shallow_ascent_rate, 16);
    assert_eq!(config.deep_ascent_rate, 150);
    assert_eq!(config.base_ascent_rate, 100);
}
