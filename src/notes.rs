//! The human-readable plan summary: built as structured rows and warnings,
//! rendered to text at the edge.

use core::fmt::Write;

use crate::gas::GasMix;
use crate::plan::Plan;
use crate::profile::Dive;
use crate::{depth_to_atm, PlanConfig};

const DISCLAIMER: &str = "DISCLAIMER / WARNING: THIS IS A NEW IMPLEMENTATION OF THE BUHLMANN \
ALGORITHM AND A DIVE PLANNER IMPLEMENTION BASED ON THAT WHICH HAS RECEIVED ONLY A LIMITED AMOUNT \
OF TESTING. WE STRONGLY RECOMMEND NOT TO PLAN DIVES SIMPLY BASED ON THE RESULTS GIVEN HERE.";

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryRow {
    /// A moving leg, only rendered when transitions are displayed.
    Transition {
        depth_mm: i32,
        duration_s: i32,
        runtime_s: i32,
        gas: GasMix,
    },
    /// A level line of the tabular form. `gas` is set on the first line after
    /// a switch (and on the very first line).
    Level {
        depth_mm: i32,
        runtime_s: i32,
        duration_s: i32,
        gas: Option<GasMix>,
    },
    /// Verbatim counterpart of `Level`.
    Stay {
        depth_mm: i32,
        duration_s: i32,
        runtime_s: i32,
        gas: GasMix,
    },
    /// Verbatim gas switch sentence.
    GasSwitch { gas: GasMix },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GasUsage {
    pub gas: GasMix,
    pub volume_ml: i32,
    /// The plan needs more gas than the cylinder holds (end pressure under
    /// 10 bar; breathing a cylinder to zero is not a plan).
    pub overdrawn: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanWarning {
    HighPo2 {
        time_s: i32,
        po2_mbar: i32,
        gas: GasMix,
        depth_mm: i32,
    },
}

/// The structured summary of a planned dive.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    pub gf_low: i32,
    pub gf_high: i32,
    pub disclaimer: bool,
    pub rows: Vec<SummaryRow>,
    pub gas_usage: Vec<GasUsage>,
    pub warnings: Vec<PlanWarning>,
}

/// Walk the waypoint list and collect the summary. Intermediate waypoints
/// that change neither depth nor gas and were not entered by the user are
/// folded away.
pub fn build_summary(diveplan: &Plan, dive: &Dive, config: &PlanConfig, show_disclaimer: bool) -> PlanSummary {
    let mut rows = Vec::new();
    let mut gaschange_pending = true;
    let mut lastdepth = 0;
    let mut lasttime = 0;

    for (i, dp) in diveplan.waypoints.iter().enumerate() {
        if dp.time_s == 0 {
            continue;
        }
        let gasmix = dp.gas;
        let nextdp = diveplan.waypoints[i + 1..].iter().find(|wp| wp.time_s != 0);
        let newgasmix = match nextdp {
            Some(next) if !next.gas.is_null() => next.gas,
            _ => gasmix,
        };

        // skip legs devoid of anything useful
        if let Some(next) = nextdp {
            if !dp.entered
                && gasmix.distance(&newgasmix) == 0
                && dp.depth_mm != lastdepth
                && next.depth_mm != dp.depth_mm
            {
                continue;
            }
        }

        if dp.depth_mm != lastdepth {
            if config.display_transitions {
                rows.push(SummaryRow::Transition {
                    depth_mm: dp.depth_mm,
                    duration_s: dp.time_s - lasttime,
                    runtime_s: dp.time_s,
                    gas: gasmix,
                });
            } else if dp.entered {
                let gas = gaschange_pending.then_some(newgasmix);
                gaschange_pending = false;
                rows.push(SummaryRow::Level {
                    depth_mm: dp.depth_mm,
                    runtime_s: dp.time_s,
                    duration_s: dp.time_s - lasttime,
                    gas,
                });
            }
        } else if config.verbatim {
            rows.push(SummaryRow::Stay {
                depth_mm: dp.depth_mm,
                duration_s: dp.time_s - lasttime,
                runtime_s: dp.time_s,
                gas: gasmix,
            });
        } else {
            let gas = gaschange_pending.then_some(newgasmix);
            gaschange_pending = false;
            rows.push(SummaryRow::Level {
                depth_mm: dp.depth_mm,
                runtime_s: dp.time_s,
                duration_s: dp.time_s - lasttime,
                gas,
            });
        }

        if nextdp.is_some() && gasmix.distance(&newgasmix) > 0 {
            // gas switch at this waypoint
            if config.verbatim {
                rows.push(SummaryRow::GasSwitch { gas: newgasmix });
            } else {
                gaschange_pending = true;
            }
        }
        lasttime = dp.time_s;
        lastdepth = dp.depth_mm;
    }

    let gas_usage = dive
        .cylinders
        .iter()
        .filter(|cyl| cyl.has_data())
        .map(|cyl| GasUsage {
            gas: cyl.gas,
            volume_ml: cyl.gas_used_ml,
            overdrawn: cyl.volume_ml != 0 && cyl.end_mbar < 10000,
        })
        .collect();

    let mut warnings = Vec::new();
    for dp in &diveplan.waypoints {
        if dp.time_s == 0 {
            continue;
        }
        let po2_mbar = (depth_to_atm(dp.depth_mm, dive.surface_pressure_mbar) * dp.gas.o2 as f32) as i32;
        if po2_mbar > 1600 {
            warnings.push(PlanWarning::HighPo2 {
                time_s: dp.time_s,
                po2_mbar,
                gas: dp.gas,
                depth_mm: dp.depth_mm,
            });
        }
    }

    PlanSummary {
        gf_low: diveplan.gf_low,
        gf_high: diveplan.gf_high,
        disclaimer: show_disclaimer,
        rows,
        gas_usage,
        warnings,
    }
}

fn minutes(time_s: i32) -> (i32, i32) {
    (time_s / 60, time_s % 60)
}

impl PlanSummary {
    pub fn render(&self, config: &PlanConfig) -> String {
        let mut out = String::new();
        if self.disclaimer {
            out.push_str(DISCLAIMER);
            out.push('\n');
        }
        let _ = write!(
            out,
            "Dive plan\nbased on GFlow = {} and GFhigh = {}\n\ndepth",
            self.gf_low, self.gf_high
        );
        if config.display_runtime {
            out.push_str(" runtime");
        }
        if config.display_duration {
            out.push_str(" stop time");
        }
        out.push_str(" gas\n");

        for row in &self.rows {
            match row {
                SummaryRow::Transition {
                    depth_mm,
                    duration_s,
                    runtime_s,
                    gas,
                } => {
                    let (dm, ds) = minutes(*duration_s);
                    let (rm, rs) = minutes(*runtime_s);
                    let _ = writeln!(
                        out,
                        "Transition to {:.1} m in {}:{:02} min - runtime {}:{:02} on {}",
                        *depth_mm as f32 / 1000.0,
                        dm,
                        ds,
                        rm,
                        rs,
                        gas
                    );
                }
                SummaryRow::Level {
                    depth_mm,
                    runtime_s,
                    duration_s,
                    gas,
                } => {
                    let _ = write!(out, "{:3.0}m", *depth_mm as f32 / 1000.0);
                    if config.display_runtime {
                        let _ = write!(out, "  {:3}min ", (runtime_s + 30) / 60);
                    }
                    if config.display_duration {
                        let _ = write!(out, "   {:3}min ", (duration_s + 30) / 60);
                    }
                    if let Some(gas) = gas {
                        let _ = write!(out, " {}", gas);
                    }
                    out.push('\n');
                }
                SummaryRow::Stay {
                    depth_mm,
                    duration_s,
                    runtime_s,
                    gas,
                } => {
                    let (dm, ds) = minutes(*duration_s);
                    let (rm, rs) = minutes(*runtime_s);
                    let _ = writeln!(
                        out,
                        "Stay at {:.1} m for {}:{:02} min - runtime {}:{:02} on {}",
                        *depth_mm as f32 / 1000.0,
                        dm,
                        ds,
                        rm,
                        rs,
                        gas
                    );
                }
                SummaryRow::GasSwitch { gas } => {
                    let _ = writeln!(out, "Switch gas to {}", gas);
                }
            }
        }

        out.push_str("\nGas consumption:\n");
        for usage in &self.gas_usage {
            let warning = if usage.overdrawn {
                " WARNING: this is more gas than available in the specified cylinder!"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "{:.0}l of {}{}",
                usage.volume_ml as f32 / 1000.0,
                usage.gas,
                warning
            );
        }

        for warning in &self.warnings {
            let PlanWarning::HighPo2 {
                time_s,
                po2_mbar,
                gas,
                depth_mm,
            } = warning;
            let (m, s) = minutes(*time_s);
            let _ = writeln!(
                out,
                "Warning: high pO2 value {:.2} at {}:{:02} with gas {} at depth {:.1} m",
                *po2_mbar as f32 / 1000.0,
                m,
                s,
                gas,
                *depth_mm as f32 / 1000.0
            );
        }
        out
    }
}

/// Build and render the summary into the dive's notes.
pub fn add_plan_to_notes(diveplan: &Plan, dive: &mut Dive, config: &PlanConfig, show_disclaimer: bool) {
    if diveplan.waypoints.is_empty() {
        return;
    }
    dive.notes = build_summary(diveplan, dive, config, show_disclaimer).render(config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cylinder::Cylinder;
    use crate::profile::create_dive_from_plan;

    fn simple_plan() -> (Plan, Vec<Cylinder>) {
        let mut plan = Plan::new(30, 70);
        plan.surface_pressure_mbar = crate::SURFACE_PRESSURE;
        plan.add_segment(120, 30000, GasMix::AIR, 0, true);
        plan.add_segment(1380, 30000, GasMix::AIR, 0, true);
        let cylinders = vec![Cylinder::new("D12", 24000, 232000, 232000, GasMix::AIR)];
        (plan, cylinders)
    }

    #[test]
    fn test_header_and_first_gas() {
        let (plan, mut cylinders) = simple_plan();
        let dive = create_dive_from_plan(&plan, &mut cylinders).unwrap().unwrap();
        let summary = build_summary(&plan, &dive, &PlanConfig::new(), false);
        let text = summary.render(&PlanConfig::new());
        assert!(text.contains("based on GFlow = 30 and GFhigh = 70"));
        assert!(text.contains("depth runtime gas"));
        // the first rendered line names the gas in use
        assert!(text.contains(" 30m"));
        assert!(text.contains("air"));
    }

    #[test]
    fn test_disclaimer_toggle() {
        let (plan, mut cylinders) = simple_plan();
        let dive = create_dive_from_plan(&plan, &mut cylinders).unwrap().unwrap();
        let with = build_summary(&plan, &dive, &PlanConfig::new(), true).render(&PlanConfig::new());
        let without = build_summary(&plan, &dive, &PlanConfig::new(), false).render(&PlanConfig::new());
        assert!(with.starts_with("DISCLAIMER"));
        assert!(without.starts_with("Dive plan"));
    }

    #[test]
    fn test_verbatim_stays() {
        let (plan, mut cylinders) = simple_plan();
        let dive = create_dive_from_plan(&plan, &mut cylinders).unwrap().unwrap();
        let mut config = PlanConfig::new();
        config.verbatim = true;
        let text = build_summary(&plan, &dive, &config, false).render(&config);
        assert!(text.contains("Stay at 30.0 m"));
    }

    #[test]
    fn test_gas_consumption_section() {
        let (plan, mut cylinders) = simple_plan();
        let dive = create_dive_from_plan(&plan, &mut cylinders).unwrap().unwrap();
        let summary = build_summary(&plan, &dive, &PlanConfig::new(), false);
        assert_eq!(summary.gas_usage.len(), 1);
        assert!(summary.gas_usage[0].volume_ml > 0);
        assert!(!summary.gas_usage[0].overdrawn);
        let text = summary.render(&PlanConfig::new());
        assert!(text.contains("Gas consumption:"));
        assert!(text.contains("l of air"));
    }

    #[test]
    fn test_overdrawn_cylinder_warns() {
        let mut plan = Plan::new(30, 70);
        plan.surface_pressure_mbar = crate::SURFACE_PRESSURE;
        plan.add_segment(120, 30000, GasMix::AIR, 0, true);
        plan.add_segment(3480, 30000, GasMix::AIR, 0, true);
        // a 3 l pony holds nowhere near an hour at 30 m
        let mut cylinders = vec![Cylinder::new("pony", 3000, 200000, 200000, GasMix::AIR)];
        let dive = create_dive_from_plan(&plan, &mut cylinders).unwrap().unwrap();
        let summary = build_summary(&plan, &dive, &PlanConfig::new(), false);
        assert!(summary.gas_usage[0].overdrawn);
        let text = summary.render(&PlanConfig::new());
        assert!(text.contains("more gas than available"));
    }

    #[test]
    fn test_high_po2_warning() {
        // EAN80 at 30 m: pO₂ = 4.0 bar · 0.8 = 3.2 bar
        let mut plan = Plan::new(30, 70);
        plan.surface_pressure_mbar = crate::SURFACE_PRESSURE;
        plan.add_segment(600, 30000, GasMix::new(800, 0), 0, true);
        let mut cylinders = vec![Cylinder::new("deco", 11100, 207000, 207000, GasMix::new(800, 0))];
        let dive = create_dive_from_plan(&plan, &mut cylinders).unwrap().unwrap();
        let summary = build_summary(&plan, &dive, &PlanConfig::new(), false);
        assert_eq!(summary.warnings.len(), 1);
        let PlanWarning::HighPo2 { po2_mbar, depth_mm, .. } = summary.warnings[0].clone();
        assert_eq!(depth_mm, 30000);
        assert!((3100..3300).contains(&po2_mbar));
        let text = summary.render(&PlanConfig::new());
        assert_eq!(text.matches("high pO2").count(), 1);
    }

    #[test]
    fn test_transition_rows() {
        let (plan, mut cylinders) = simple_plan();
        let dive = create_dive_from_plan(&plan, &mut cylinders).unwrap().unwrap();
        let mut config = PlanConfig::new();
        config.display_transitions = true;
        let text = build_summary(&plan, &dive, &config, false).render(&config);
        assert!(text.contains("Transition to 30.0 m in 2:00 min"));
    }

    #[test]
    fn test_runtime_column_toggle() {
        let (plan, mut cylinders) = simple_plan();
        let dive = create_dive_from_plan(&plan, &mut cylinders).unwrap().unwrap();
        let mut config = PlanConfig::new();
        config.display_runtime = false;
        config.display_duration = true;
        let text = build_summary(&plan, &dive, &config, false).render(&config);
        assert!(text.contains("depth stop time gas"));
        assert!(!text.contains("depth runtime"));
    }
}
