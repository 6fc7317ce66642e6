//! The dive plan: an owned, ordered waypoint list plus the run parameters.

use serde::{Deserialize, Serialize};

use crate::gas::GasMix;

/// One entry of the plan. A waypoint with `time_s == 0` is a gas
/// declaration: it announces that a cylinder with `gas` is usable at or above
/// `depth_mm` and is not itself a profile segment. `entered` marks waypoints
/// authored by the user; the scheduler appends its own with `entered ==
/// false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub time_s: i32,
    pub depth_mm: i32,
    pub gas: GasMix,
    pub po2_mbar: i32,
    pub entered: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Dive start, seconds since the epoch.
    pub when: i64,
    pub surface_pressure_mbar: i32,
    /// Gradient factors, percent.
    pub gf_low: i32,
    pub gf_high: i32,
    pub bottom_sac_ml_per_min: i32,
    pub deco_sac_ml_per_min: i32,
    pub waypoints: Vec<Waypoint>,
}

impl Plan {
    pub fn new(gf_low: i32, gf_high: i32) -> Self {
        Plan {
            when: 0,
            surface_pressure_mbar: 0,
            gf_low,
            gf_high,
            bottom_sac_ml_per_min: 20000,
            deco_sac_ml_per_min: 17000,
            waypoints: Vec::new(),
        }
    }

    /// Append a segment. `duration_s` is relative and is shifted by the
    /// largest absolute time already in the plan; a zero duration appends a
    /// gas declaration and is not shifted.
    pub fn add_segment(&mut self, duration_s: i32, depth_mm: i32, gas: GasMix, po2_mbar: i32, entered: bool) {
        let last_time = self.waypoints.iter().map(|wp| wp.time_s).max().unwrap_or(0);
        let time_s = if duration_s != 0 { duration_s + last_time } else { 0 };
        self.waypoints.push(Waypoint {
            time_s,
            depth_mm,
            gas,
            po2_mbar,
            entered,
        });
    }

    /// The idx-th waypoint, creating zeroed placeholders as needed so the UI
    /// can edit rows out of order.
    pub fn get_nth(&mut self, idx: usize) -> &mut Waypoint {
        while self.waypoints.len() <= idx {
            self.waypoints.push(Waypoint {
                time_s: 0,
                depth_mm: 0,
                gas: GasMix::default(),
                po2_mbar: 0,
                entered: false,
            });
        }
        &mut self.waypoints[idx]
    }

    /// A plan is empty while no waypoint carries a non-zero time.
    pub fn is_empty(&self) -> bool {
        !self.waypoints.iter().any(|wp| wp.time_s != 0)
    }

    /// Time-weighted mean depth over the profile segments, mm.
    pub fn average_depth(&self) -> i32 {
        let mut sum = 0i64;
        let mut last_time = 0i64;
        let mut last_depth = 0i64;
        for wp in &self.waypoints {
            if wp.time_s == 0 {
                continue;
            }
            let time = wp.time_s as i64;
            let depth = wp.depth_mm as i64;
            sum += (time - last_time) * (depth + last_depth) / 2;
            last_time = time;
            last_depth = depth;
        }
        if last_time == 0 {
            0
        } else {
            (sum / last_time) as i32
        }
    }
}
