//! Model-level tests of the built-in ZH-L16C gradient-factor implementation,
//! driven through the planner-facing trait.

use diveplan::buhlmann::Buhlmann;
use diveplan::deco::DecoModel;
use diveplan::gas::GasMix;
use diveplan::SURFACE_PRESSURE;

const SURFACE_BAR: f32 = 1.013;

fn loaded_model(depth_bar: f32, minutes: i32, gf_low: f32, gf_high: f32) -> (Buhlmann, f32) {
    let mut model = Buhlmann::new();
    model.init(SURFACE_PRESSURE);
    model.set_gf(gf_low, gf_high, true);
    let tolerance = model.advance(depth_bar, &GasMix::AIR, minutes * 60, 0);
    (model, tolerance)
}

#[test]
fn test_ceiling_grows_with_exposure() {
    struct Exposure {
        depth_bar: f32,
        minutes: i32,
    }
    let table = [
        Exposure { depth_bar: 3.013, minutes: 10 },
        Exposure { depth_bar: 4.013, minutes: 20 },
        Exposure { depth_bar: 5.013, minutes: 30 },
        Exposure { depth_bar: 6.013, minutes: 40 },
    ];
    let mut previous = i32::MIN;
    for exposure in &table {
        let (model, tolerance) = loaded_model(exposure.depth_bar, exposure.minutes, 0.3, 0.7);
        let ceiling = model.allowed_depth(tolerance, SURFACE_BAR, true);
        assert!(
            ceiling > previous,
            "ceiling did not grow: {} after {} min at {} bar",
            ceiling,
            exposure.minutes,
            exposure.depth_bar
        );
        previous = ceiling;
    }
}

#[test]
fn test_lower_gf_is_more_conservative() {
    let (conservative_model, conservative) = loaded_model(5.013, 25, 0.3, 0.7);
    let (liberal_model, liberal) = loaded_model(5.013, 25, 1.0, 1.0);
    let conservative_ceiling = conservative_model.allowed_depth(conservative, SURFACE_BAR, true);
    let liberal_ceiling = liberal_model.allowed_depth(liberal, SURFACE_BAR, true);
    assert!(conservative_ceiling > liberal_ceiling);
}

#[test]
fn test_short_shallow_dive_stays_clear() {
    // 18 m for 30 min on air is a no-stop dive on GF 90
    let (model, tolerance) = loaded_model(2.813, 30, 0.9, 0.9);
    assert!(model.allowed_depth(tolerance, SURFACE_BAR, true) <= 0);
}

#[test]
fn test_presentation_rounding_snaps_to_stops() {
    let (model, tolerance) = loaded_model(5.013, 30, 0.3, 0.7);
    let rounded = model.allowed_depth(tolerance, SURFACE_BAR, false);
    assert_eq!(rounded % 3000, 0);
    let exact = model.allowed_depth(tolerance, SURFACE_BAR, true);
    assert!((rounded - exact).abs() <= 1500);
}

#[test]
fn test_restore_discards_trial_loading() {
    let (mut model, _) = loaded_model(5.013, 25, 0.3, 0.7);
    let state = model.snapshot();
    let before = model.advance(5.013, &GasMix::AIR, 0, 0);

    // a throwaway excursion deeper
    model.advance(6.013, &GasMix::AIR, 10 * 60, 0);
    let after = model.restore(&state);
    assert_eq!(before, after);
}
