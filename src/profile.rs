//! Materializing a waypoint list into a time-sampled dive record.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cylinder::{find_cylinder_by_gas, reset_cylinders, Cylinder};
use crate::gas::GasMix;
use crate::plan::Plan;
use crate::{PlanError, SURFACE_PRESSURE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub time_s: i32,
    pub depth_mm: i32,
    pub po2_mbar: i32,
    pub cylinder_pressure_mbar: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiveEvent {
    GasSwitch { time_s: i32, cylinder: usize },
    SetpointChange { time_s: i32, po2_mbar: i32 },
}

impl DiveEvent {
    pub fn time_s(&self) -> i32 {
        match self {
            DiveEvent::GasSwitch { time_s, .. } => *time_s,
            DiveEvent::SetpointChange { time_s, .. } => *time_s,
        }
    }
}

/// The produced dive record: samples, gas-switch and setpoint events, the
/// inventory as consumed by this profile, and the plan summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dive {
    pub when: i64,
    pub surface_pressure_mbar: i32,
    pub samples: Vec<Sample>,
    pub events: Vec<DiveEvent>,
    pub cylinders: Vec<Cylinder>,
    pub notes: String,
}

/// The gas breathed at `time_s`: the first cylinder's gas, updated by every
/// gas switch no later than that time.
pub fn active_gas(dive: &Dive, cylinders: &[Cylinder], time_s: i32) -> GasMix {
    let mut gas = cylinders.first().map(|c| c.gas).unwrap_or_default();
    for event in &dive.events {
        if let DiveEvent::GasSwitch { time_s: t, cylinder } = event {
            if *t <= time_s {
                if let Some(c) = cylinders.get(*cylinder) {
                    gas = c.gas;
                }
            }
        }
    }
    gas
}

/// Turn the waypoint list into samples and events, charging each segment
/// against the active cylinder.
///
/// Cylinders are reset first; the run owns them. Zero-time declarations are
/// validated against the inventory and skipped. A plan that yields fewer than
/// two samples produces no dive.
pub fn create_dive_from_plan(diveplan: &Plan, cylinders: &mut [Cylinder]) -> Result<Option<Dive>, PlanError> {
    if diveplan.waypoints.is_empty() {
        return Ok(None);
    }
    let surface_pressure_mbar = if diveplan.surface_pressure_mbar != 0 {
        diveplan.surface_pressure_mbar
    } else {
        SURFACE_PRESSURE
    };

    reset_cylinders(cylinders);
    let mut active = 0usize;
    let mut oldgasmix = cylinders.first().map(|c| c.gas).unwrap_or_default();
    let mut oldpo2 = 0;
    let mut lasttime = 0;
    let mut lastdepth = 0;

    let mut samples: Vec<Sample> = Vec::with_capacity(diveplan.waypoints.len() + 1);
    let mut events: Vec<DiveEvent> = Vec::new();
    samples.push(Sample {
        time_s: 0,
        depth_mm: 0,
        po2_mbar: diveplan.waypoints[0].po2_mbar,
        cylinder_pressure_mbar: 0,
    });

    for wp in &diveplan.waypoints {
        let mut gasmix = wp.gas;
        let po2 = wp.po2_mbar;

        if wp.time_s == 0 {
            // availability declaration: the mix must be on the cylinder list
            if find_cylinder_by_gas(cylinders, &gasmix).is_none() {
                debug!(%gasmix, "declared gas not in the inventory");
                return Err(PlanError::GasNotFound(gasmix.to_string()));
            }
            continue;
        }
        if gasmix.is_null() {
            gasmix = oldgasmix;
        }

        if oldpo2 != po2 {
            if lasttime != 0 {
                events.push(DiveEvent::SetpointChange {
                    time_s: lasttime,
                    po2_mbar: po2,
                });
            }
            oldpo2 = po2;
        }

        if oldgasmix.distance(&gasmix) > 0 {
            let cylinder = find_cylinder_by_gas(cylinders, &gasmix)
                .ok_or_else(|| PlanError::GasNotFound(gasmix.to_string()))?;
            events.push(DiveEvent::GasSwitch {
                time_s: lasttime + 1,
                cylinder,
            });
            // bridge sample so the new gas has a starting point
            if let Some(prev) = samples.last_mut() {
                prev.po2_mbar = po2;
            }
            samples.push(Sample {
                time_s: lasttime + 1,
                depth_mm: lastdepth,
                po2_mbar: po2,
                cylinder_pressure_mbar: 0,
            });
            active = cylinder;
            oldgasmix = gasmix;
        }

        let previous = samples.last().copied().unwrap_or_default();
        // pO₂ becomes valid at the start of the segment
        if let Some(prev) = samples.last_mut() {
            prev.po2_mbar = po2;
        }
        let sac = if wp.entered {
            diveplan.bottom_sac_ml_per_min
        } else {
            diveplan.deco_sac_ml_per_min
        };
        if let Some(cylinder) = cylinders.get_mut(active) {
            cylinder.update_pressure(
                previous.depth_mm,
                wp.depth_mm,
                wp.time_s - previous.time_s,
                sac,
                surface_pressure_mbar,
            );
        }
        samples.push(Sample {
            time_s: wp.time_s,
            depth_mm: wp.depth_mm,
            po2_mbar: po2,
            cylinder_pressure_mbar: cylinders.get(active).map_or(0, |c| c.end_mbar),
        });
        lasttime = wp.time_s;
        lastdepth = wp.depth_mm;
    }

    if samples.len() <= 1 {
        // not enough for a dive, most likely every waypoint was a declaration
        return Ok(None);
    }
    Ok(Some(Dive {
        when: diveplan.when,
        surface_pressure_mbar,
        samples,
        events,
        cylinders: cylinders.to_vec(),
        notes: String::new(),
    }))
}
