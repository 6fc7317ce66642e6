//! Building the ascent ladder: fixed deco stop depths merged with the
//! user-declared gas change depths.

use tracing::debug;

use crate::cylinder::{find_cylinder_by_gas, Cylinder};
use crate::plan::Plan;
use crate::PlanError;

/// A planned switch to another cylinder during the ascent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasChange {
    pub depth_mm: i32,
    pub cylinder: usize,
}

/// The fixed deco stop depths, ascending, mm: 3 m steps to 90 m, 10 m steps
/// to 200 m, 20 m steps to 380 m. The second entry is the last-stop depth.
pub fn decostop_levels(last_stop_6m: bool) -> Vec<i32> {
    let mut levels = Vec::with_capacity(51);
    levels.push(0);
    levels.push(if last_stop_6m { 6000 } else { 3000 });
    let mut depth = 6000;
    while depth <= 90000 {
        levels.push(depth);
        depth += 3000;
    }
    let mut depth = 100000;
    while depth <= 200000 {
        levels.push(depth);
        depth += 10000;
    }
    let mut depth = 220000;
    while depth <= 380000 {
        levels.push(depth);
        depth += 20000;
    }
    levels
}

/// Scan the plan's gas declarations. Declarations at or above `depth_mm`
/// become gas changes for the ascent, sorted ascending; a declaration below
/// the current depth can still improve the first ascent cylinder when its
/// switch depth is shallower than the current best.
pub fn analyze_gaslist(
    plan: &Plan,
    cylinders: &[Cylinder],
    depth_mm: i32,
    best_first_ascend_cylinder: &mut usize,
) -> Result<Vec<GasChange>, PlanError> {
    let mut changes: Vec<GasChange> = Vec::new();
    let mut best_depth = cylinders
        .get(*best_first_ascend_cylinder)
        .map_or(0, |c| c.switch_depth_mm);

    for wp in &plan.waypoints {
        if wp.time_s != 0 {
            continue;
        }
        if wp.depth_mm <= depth_mm {
            let cylinder = find_cylinder_by_gas(cylinders, &wp.gas)
                .ok_or_else(|| PlanError::GasNotFound(wp.gas.to_string()))?;
            let pos = changes
                .iter()
                .position(|change| wp.depth_mm < change.depth_mm)
                .unwrap_or(changes.len());
            changes.insert(
                pos,
                GasChange {
                    depth_mm: wp.depth_mm,
                    cylinder,
                },
            );
        } else if wp.depth_mm < best_depth {
            // a better mix to start the deco on
            if let Some(cylinder) = find_cylinder_by_gas(cylinders, &wp.gas) {
                best_depth = wp.depth_mm;
                *best_first_ascend_cylinder = cylinder;
            }
        }
    }

    for (nr, change) in changes.iter().enumerate() {
        debug!(
            nr,
            depth_m = change.depth_mm as f32 / 1000.0,
            cylinder = change.cylinder,
            "gas change"
        );
    }
    Ok(changes)
}

/// Merge the truncated fixed stop depths with the gas change depths into one
/// ascending ladder. The result always has `dstops.len() + gstops.len()`
/// entries: when a fixed depth ties a gas change depth both are consumed and
/// the front is padded with surface entries, keeping the caller's index
/// arithmetic valid.
pub fn sort_stops(dstops: &[i32], gstops: &[GasChange]) -> Vec<i32> {
    let total = dstops.len() + gstops.len();
    let mut levels = vec![0; total];

    // no gas changes
    if gstops.is_empty() {
        levels[..dstops.len()].copy_from_slice(dstops);
        return levels;
    }

    let mut i = total as i32 - 1;
    let mut gi = gstops.len() as i32 - 1;
    let mut di = dstops.len() as i32 - 1;
    while i >= 0 {
        let fixed = dstops[di as usize];
        let change = gstops[gi as usize].depth_mm;
        if fixed > change {
            levels[i as usize] = fixed;
            di -= 1;
        } else if fixed == change {
            levels[i as usize] = fixed;
            di -= 1;
            gi -= 1;
        } else {
            levels[i as usize] = change;
            gi -= 1;
        }
        i -= 1;
        if di < 0 {
            while gi >= 0 {
                levels[i as usize] = gstops[gi as usize].depth_mm;
                gi -= 1;
                i -= 1;
            }
            break;
        }
        if gi < 0 {
            while di >= 0 {
                levels[i as usize] = dstops[di as usize];
                di -= 1;
                i -= 1;
            }
            break;
        }
    }
    // any slots left in front stay at the surface
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decostop_levels_table() {
        let levels = decostop_levels(false);
        assert_eq!(levels.len(), 51);
        assert_eq!(levels[0], 0);
        assert_eq!(levels[1], 3000);
        assert_eq!(levels[2], 6000);
        assert_eq!(*levels.last().unwrap(), 380000);
        assert!(levels.contains(&90000));
        assert!(levels.contains(&100000));
        assert!(!levels.contains(&95000));
        assert!(levels.contains(&220000));
        assert!(!levels.contains(&210000));
    }

    #[test]
    fn test_last_stop_override() {
        let levels = decostop_levels(true);
        assert_eq!(levels[1], 6000);
        assert!(!levels.contains(&3000));
    }

    #[test]
    fn test_sort_stops_without_gas_changes() {
        let merged = sort_stops(&[0, 3000, 6000, 9000], &[]);
        assert_eq!(merged, vec![0, 3000, 6000, 9000]);
    }

    #[test]
    fn test_sort_stops_interleaves() {
        let change = GasChange {
            depth_mm: 21000,
            cylinder: 1,
        };
        let merged = sort_stops(&[0, 3000, 6000, 9000, 12000, 15000, 18000, 24000], &[change]);
        assert_eq!(
            merged,
            vec![0, 3000, 6000, 9000, 12000, 15000, 18000, 21000, 24000]
        );
    }

    #[test]
    fn test_sort_stops_tie_pads_front() {
        let change = GasChange {
            depth_mm: 6000,
            cylinder: 1,
        };
        let merged = sort_stops(&[0, 3000, 6000], &[change]);
        assert_eq!(merged, vec![0, 0, 3000, 6000]);
    }
}
