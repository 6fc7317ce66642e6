//! Cylinders: the gas inventory of a plan and its consumption accounting.

use serde::{Deserialize, Serialize};

use crate::depth_to_atm;
use crate::gas::GasMix;

/// A cylinder in the plan's inventory. Pressure accounting runs in mbar and
/// ml; `volume_ml == 0` means the physical size is unknown and only the used
/// volume is tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    pub description: String,
    pub volume_ml: i32,
    pub working_pressure_mbar: i32,
    pub start_mbar: i32,
    pub end_mbar: i32,
    pub gas_used_ml: i32,
    pub gas: GasMix,
    /// Preferred switch depth for deco, mm. 0 when unset.
    pub switch_depth_mm: i32,
}

impl Cylinder {
    pub fn new(description: &str, volume_ml: i32, working_pressure_mbar: i32, start_mbar: i32, gas: GasMix) -> Self {
        Cylinder {
            description: description.to_string(),
            volume_ml,
            working_pressure_mbar,
            start_mbar,
            end_mbar: start_mbar,
            gas_used_ml: 0,
            gas,
            switch_depth_mm: 0,
        }
    }

    /// A cylinder counts as configured when any of description, size,
    /// working pressure or gas are set.
    pub fn has_data(&self) -> bool {
        !self.description.is_empty()
            || self.volume_ml != 0
            || self.working_pressure_mbar != 0
            || !self.gas.is_null()
    }

    pub fn reset(&mut self) {
        self.end_mbar = self.start_mbar;
        self.gas_used_ml = 0;
    }

    /// Account one profile segment against this cylinder: consumption at the
    /// segment's mean depth, SAC scaled to ambient pressure, and the matching
    /// pressure drop when the size is known.
    pub fn update_pressure(
        &mut self,
        old_depth_mm: i32,
        new_depth_mm: i32,
        duration_s: i32,
        sac_ml_per_min: i32,
        surface_pressure_mbar: i32,
    ) {
        let mean_depth_mm = (old_depth_mm + new_depth_mm) / 2;
        let gas_used_ml = (depth_to_atm(mean_depth_mm, surface_pressure_mbar)
            * sac_ml_per_min as f32
            / 60.0
            * duration_s as f32) as i32;
        self.gas_used_ml += gas_used_ml;
        if self.volume_ml != 0 {
            let delta_mbar = (gas_used_ml as f32 * 1000.0 / self.volume_ml as f32) as i32;
            self.end_mbar -= delta_mbar;
        }
    }
}

/// Start-of-run reset: full cylinders, nothing consumed.
pub fn reset_cylinders(cylinders: &mut [Cylinder]) {
    for cylinder in cylinders {
        cylinder.reset();
    }
}

/// First configured cylinder whose gas is within the same-gas slack of the
/// requested mix.
pub fn find_cylinder_by_gas(cylinders: &[Cylinder], gas: &GasMix) -> Option<usize> {
    cylinders
        .iter()
        .position(|c| c.has_data() && c.gas.distance(gas) < 200)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SURFACE_PRESSURE;

    fn inventory() -> Vec<Cylinder> {
        vec![
            Cylinder::new("D12 232 bar", 24000, 232000, 232000, GasMix::AIR),
            Cylinder::new("AL80", 11100, 207000, 207000, GasMix::new(500, 0)),
        ]
    }

    #[test]
    fn test_find_cylinder_by_gas_slack() {
        let cylinders = inventory();
        // EAN21 matches air within the 200 permille slack
        assert_eq!(find_cylinder_by_gas(&cylinders, &GasMix::new(210, 0)), Some(0));
        assert_eq!(find_cylinder_by_gas(&cylinders, &GasMix::new(500, 0)), Some(1));
        assert_eq!(find_cylinder_by_gas(&cylinders, &GasMix::new(180, 450)), None);
    }

    #[test]
    fn test_find_skips_unconfigured() {
        let mut cylinders = inventory();
        cylinders.insert(0, Cylinder::default());
        assert_eq!(find_cylinder_by_gas(&cylinders, &GasMix::AIR), Some(1));
    }

    #[test]
    fn test_update_pressure() {
        let mut cylinder = Cylinder::new("S80", 11100, 207000, 200000, GasMix::AIR);
        // 10 minutes at a constant 20 m on a 20 l/min SAC
        cylinder.update_pressure(20000, 20000, 600, 20000, SURFACE_PRESSURE);
        let atm = depth_to_atm(20000, SURFACE_PRESSURE);
        let expected_ml = (atm * 20000.0 / 60.0 * 600.0) as i32;
        assert_eq!(cylinder.gas_used_ml, expected_ml);
        let expected_drop = (expected_ml as f32 * 1000.0 / 11100.0) as i32;
        assert_eq!(cylinder.end_mbar, 200000 - expected_drop);
    }

    #[test]
    fn test_update_pressure_unknown_volume() {
        let mut cylinder = Cylinder::new("backup", 0, 0, 0, GasMix::AIR);
        cylinder.update_pressure(0, 10000, 300, 20000, SURFACE_PRESSURE);
        assert!(cylinder.gas_used_ml > 0);
        assert_eq!(cylinder.end_mbar, 0);
    }

    #[test]
    fn test_reset() {
        let mut cylinders = inventory();
        cylinders[0].update_pressure(30000, 30000, 1200, 20000, SURFACE_PRESSURE);
        assert_ne!(cylinders[0].end_mbar, cylinders[0].start_mbar);
        reset_cylinders(&mut cylinders);
        assert_eq!(cylinders[0].end_mbar, 232000);
        assert_eq!(cylinders[0].gas_used_ml, 0);
    }
}
