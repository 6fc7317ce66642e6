//! The ascent scheduler: simulates the way back to the surface against the
//! decompression model, discovering stop depths and durations by trial and
//! rollback.

use tracing::{debug, trace};

use crate::cylinder::{find_cylinder_by_gas, Cylinder};
use crate::deco::DecoModel;
use crate::ladder::{analyze_gaslist, decostop_levels, sort_stops};
use crate::notes::add_plan_to_notes;
use crate::plan::Plan;
use crate::profile::{active_gas, create_dive_from_plan, Dive};
use crate::{depth_to_bar, PlanConfig, PlanError, DECOTIMESTEP, MAX_CYLINDERS, SURFACE_PRESSURE, TIMESTEP};

/// Retries of one stop before the search is declared stuck. At one
/// `DECOTIMESTEP` each this is more deco than any open-circuit dive carries.
const MAX_STOP_RETRIES: i32 = 10000;

/// Ascent rate at a depth, mm/s: slow over the final stretch, fast while in
/// the deep quarter of the dive, moderate in between.
pub fn ascend_velocity(depth_mm: i32, avg_depth_mm: i32, _bottom_time_s: i32, config: &PlanConfig) -> i32 {
    if depth_mm <= config.shallow_zone_mm {
        return config.shallow_ascent_rate;
    }
    if depth_mm * 4 > avg_depth_mm * 3 {
        config.deep_ascent_rate
    } else {
        config.base_ascent_rate
    }
}

fn interpolate(a: i32, b: i32, t: i32, max: i32) -> i32 {
    (a * (max - t) + b * t) / max
}

/// Replay the materialized samples through the model and return the tissue
/// tolerance at the end of the recorded profile. Depth is interpolated
/// linearly inside each segment and advanced one second at a time.
pub fn tissue_at_end<M: DecoModel>(model: &mut M, dive: &Dive, cylinders: &[Cylinder]) -> f32 {
    let mut tolerance = model.init(dive.surface_pressure_mbar);
    let mut t0 = 0;
    for (i, sample) in dive.samples.iter().enumerate() {
        let t1 = sample.time_s;
        let gas = active_gas(dive, cylinders, t0);
        let d0 = if i > 0 { dive.samples[i - 1].depth_mm } else { 0 };
        for j in t0..t1 {
            let depth_mm = interpolate(d0, sample.depth_mm, j - t0, t1 - t0);
            tolerance = model.advance(
                depth_to_bar(depth_mm, dive.surface_pressure_mbar),
                &gas,
                1,
                sample.po2_mbar,
            );
        }
        t0 = t1;
    }
    tolerance
}

/// Plan the dive: materialize the user profile, then extend the waypoint
/// list with the ascent the model permits and materialize again, attaching
/// the plan summary.
///
/// With `add_deco == false` the profile just gets a straight ascent segment
/// back to the surface. Scheduler-appended waypoints carry `entered ==
/// false`; calling `plan` twice on the same `Plan` therefore re-plans on top
/// of the previous ascent, which is the caller's job to clear.
///
/// Returns `Ok(None)` for empty or degenerate plans.
pub fn plan<M: DecoModel>(
    diveplan: &mut Plan,
    cylinders: &mut [Cylinder],
    model: &mut M,
    config: &PlanConfig,
    add_deco: bool,
    show_disclaimer: bool,
) -> Result<Option<Dive>, PlanError> {
    if cylinders.len() > MAX_CYLINDERS {
        return Err(PlanError::TooManyCylinders);
    }
    if diveplan.is_empty() {
        return Ok(None);
    }

    model.set_gf(
        diveplan.gf_low as f32 / 100.0,
        diveplan.gf_high as f32 / 100.0,
        config.gf_low_at_maxdepth,
    );
    if diveplan.surface_pressure_mbar == 0 {
        diveplan.surface_pressure_mbar = SURFACE_PRESSURE;
    }
    let surface_mbar = diveplan.surface_pressure_mbar;
    let surface_bar = surface_mbar as f32 / 1000.0;

    let Some(dive) = create_dive_from_plan(diveplan, cylinders)? else {
        return Ok(None);
    };

    // resume from the last manually entered waypoint
    let last = match dive.samples.last() {
        Some(sample) => *sample,
        None => return Ok(None),
    };
    let mut gas = active_gas(&dive, cylinders, last.time_s);
    let po2 = last.po2_mbar;
    let mut current_cylinder = match find_cylinder_by_gas(cylinders, &gas) {
        Some(idx) => idx,
        None => {
            debug!(%gas, "cannot find the active gas, falling back to the first cylinder");
            0
        }
    };
    let mut depth = last.depth_mm;
    if depth <= 0 {
        // a profile that never leaves the surface plans nothing
        return Ok(None);
    }
    let avg_depth = diveplan.average_depth();
    let bottom_time = last.time_s;
    let mut last_ascend_rate = ascend_velocity(depth, avg_depth, bottom_time, config);

    if !add_deco {
        // just get us back to the surface
        let transitiontime = depth / config.direct_ascent_rate;
        diveplan.add_segment(transitiontime, 0, gas, po2, false);
        return create_dive_from_plan(diveplan, cylinders);
    }

    tissue_at_end(model, &dive, cylinders);

    let mut best_first_ascend_cylinder = current_cylinder;
    let gaschanges = analyze_gaslist(diveplan, cylinders, depth, &mut best_first_ascend_cylinder)?;

    // first potential stop depth above the bottom
    let levels = decostop_levels(config.last_stop_6m);
    let mut stopidx = levels.iter().position(|&l| l >= depth).unwrap_or(levels.len());
    if stopidx > 0 {
        stopidx -= 1;
    }
    let stoplevels = sort_stops(&levels[..=stopidx], &gaschanges);
    stopidx += gaschanges.len();

    let mut clock = bottom_time;
    let mut previous_point_time = bottom_time;
    let mut gi = gaschanges.len() as i32 - 1;
    let mut stopping = false;

    if best_first_ascend_cylinder != current_cylinder {
        stopping = true;
        current_cylinder = best_first_ascend_cylinder;
        gas = cylinders[current_cylinder].gas;
        debug!(cylinder = current_cylinder, %gas, "starting the ascent on a better mix");
    }

    loop {
        // ascend to the next stop depth, one TIMESTEP at a time
        loop {
            let velocity = ascend_velocity(depth, avg_depth, bottom_time, config);
            let mut deltad = velocity * TIMESTEP;
            if velocity != last_ascend_rate {
                diveplan.add_segment(clock - previous_point_time, depth, gas, po2, false);
                previous_point_time = clock;
                stopping = false;
                last_ascend_rate = velocity;
            }
            if depth - deltad < stoplevels[stopidx] {
                deltad = depth - stoplevels[stopidx];
            }
            model.advance(depth_to_bar(depth, surface_mbar), &gas, TIMESTEP, po2);
            clock += TIMESTEP;
            depth -= deltad;
            if depth <= stoplevels[stopidx] {
                break;
            }
        }

        if depth <= 0 {
            break; // surface
        }

        if gi >= 0 && stoplevels[stopidx] == gaschanges[gi as usize].depth_mm {
            // switch gas at this level
            diveplan.add_segment(clock - previous_point_time, depth, gas, po2, false);
            previous_point_time = clock;
            stopping = true;

            current_cylinder = gaschanges[gi as usize].cylinder;
            gas = cylinders[current_cylinder].gas;
            debug!(
                cylinder = current_cylinder,
                %gas,
                depth_m = depth as f32 / 1000.0,
                "gas switch"
            );
            gi -= 1;
        }

        stopidx -= 1;

        // try to ascend to the next level on a throwaway tissue state; wait
        // out the ceiling a DECOTIMESTEP at a time when the trial hits it
        let mut trial_depth = depth;
        let mut trial_cache = model.snapshot();
        let mut retries = 0;
        loop {
            let mut clear_to_ascend = true;
            while trial_depth > stoplevels[stopidx] {
                let deltad = ascend_velocity(trial_depth, avg_depth, bottom_time, config) * TIMESTEP;
                let tolerance = model.advance(depth_to_bar(trial_depth, surface_mbar), &gas, TIMESTEP, po2);
                if model.allowed_depth(tolerance, surface_bar, true) > trial_depth - deltad {
                    clear_to_ascend = false;
                    break;
                }
                trial_depth -= deltad;
            }
            model.restore(&trial_cache);

            if clear_to_ascend {
                break;
            }

            if !stopping {
                // the last segment was an ascent, mark the start of the stop
                diveplan.add_segment(clock - previous_point_time, depth, gas, po2, false);
                previous_point_time = clock;
                stopping = true;
            }
            retries += 1;
            if retries > MAX_STOP_RETRIES {
                return Err(PlanError::InvalidSolution);
            }
            model.advance(depth_to_bar(depth, surface_mbar), &gas, DECOTIMESTEP, po2);
            trial_cache = model.snapshot();
            clock += DECOTIMESTEP;
            trial_depth = depth;
        }
        trace!(
            depth_m = depth as f32 / 1000.0,
            stop_s = clock - previous_point_time,
            "level clear"
        );
        if stopping {
            // spent deco time here, record the end of the stop
            diveplan.add_segment(clock - previous_point_time, depth, gas, po2, false);
            previous_point_time = clock;
            stopping = false;
        }
    }

    // made it to the surface
    diveplan.add_segment(clock - previous_point_time, 0, gas, po2, false);
    let Some(mut dive) = create_dive_from_plan(diveplan, cylinders)? else {
        return Ok(None);
    };
    add_plan_to_notes(diveplan, &mut dive, config, show_disclaimer);
    Ok(Some(dive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascend_velocity_tiers() {
        let config = PlanConfig::new();
        // deeper than 3/4 of the average depth
        assert_eq!(ascend_velocity(40000, 30000, 1500, &config), 150);
        assert_eq!(ascend_velocity(20000, 30000, 1500, &config), 100);
        assert_eq!(ascend_velocity(6000, 30000, 1500, &config), 16);
        assert_eq!(ascend_velocity(22501, 30000, 1500, &config), 150);
        assert_eq!(ascend_velocity(22500, 30000, 1500, &config), 100);
    }

    #[test]
    fn test_interpolate() {
        assert_eq!(interpolate(0, 18000, 30, 60), 9000);
        assert_eq!(interpolate(18000, 18000, 10, 600), 18000);
        assert_eq!(interpolate(30000, 0, 0, 120), 30000);
    }
}
