//! Interactive dive planner.
//!
//! Prompts for a profile, a gas list and gradient factors, plans the dive
//! and prints the resulting schedule. Empty input keeps the default.
//!
//! Run with: `cargo run --bin planner`

use std::io::{self, Write};

use diveplan::buhlmann::Buhlmann;
use diveplan::cylinder::Cylinder;
use diveplan::gas::{validate_gas, GasMix};
use diveplan::plan::Plan;
use diveplan::planner::plan;
use diveplan::profile::Dive;
use diveplan::PlanConfig;
use tracing_subscriber::EnvFilter;

fn get_input(prompt: &str, default: &str) -> String {
    print!("{} (default: {}): ", prompt, default);
    let _ = io::stdout().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return default.to_string();
    }
    let input = input.trim();
    if input.is_empty() {
        default.to_string()
    } else {
        input.to_string()
    }
}

fn get_float_input(prompt: &str, default: f32) -> f32 {
    loop {
        let input = get_input(prompt, &default.to_string());
        match input.parse::<f32>() {
            Ok(value) => return value,
            Err(_) => println!("Invalid input. Please enter a valid number."),
        }
    }
}

fn get_gas_input(prompt: &str, default: &str) -> Option<GasMix> {
    loop {
        let input = get_input(prompt, default);
        if input == "-" {
            return None;
        }
        match validate_gas(&input) {
            Some(gas) => return Some(gas),
            None => println!("Invalid gas. Use \"air\", \"EAN32\" or \"18/45\"."),
        }
    }
}

fn dump_samples_csv(dive: &Dive, path: &str) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["time_s", "depth_mm", "po2_mbar", "cylinder_pressure_mbar"])?;
    for sample in &dive.samples {
        writer.write_record([
            sample.time_s.to_string(),
            sample.depth_mm.to_string(),
            sample.po2_mbar.to_string(),
            sample.cylinder_pressure_mbar.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "diveplan=info".into()))
        .init();

    println!("=== Dive Planner ===\n");

    let depth_m = get_float_input("Bottom depth (m)", 30.0);
    let bottom_time_min = get_float_input("Bottom time (min)", 25.0);
    let bottom_gas = get_gas_input("Bottom gas", "air").unwrap_or(GasMix::AIR);
    let gf_low = get_float_input("GF low (%)", 30.0) as i32;
    let gf_high = get_float_input("GF high (%)", 70.0) as i32;
    let deco_gas = get_gas_input("Deco gas, '-' for none", "EAN50");
    let switch_depth_m = match deco_gas {
        Some(_) => get_float_input("Switch depth (m)", 21.0),
        None => 0.0,
    };

    let depth_mm = (depth_m * 1000.0) as i32;
    let mut cylinders = vec![Cylinder::new("bottom", 24000, 232000, 232000, bottom_gas)];
    if let Some(gas) = deco_gas {
        let mut cylinder = Cylinder::new("deco", 11100, 207000, 207000, gas);
        cylinder.switch_depth_mm = (switch_depth_m * 1000.0) as i32;
        cylinders.push(cylinder);
    }

    let mut diveplan = Plan::new(gf_low, gf_high);
    // descend at 18 m/min, bottom time measured from the surface
    let descent_s = depth_mm / 300;
    let level_s = ((bottom_time_min * 60.0) as i32 - descent_s).max(1);
    diveplan.add_segment(descent_s, depth_mm, bottom_gas, 0, true);
    diveplan.add_segment(level_s, depth_mm, bottom_gas, 0, true);
    if let Some(gas) = deco_gas {
        diveplan.add_segment(0, (switch_depth_m * 1000.0) as i32, gas, 0, false);
    }

    let config = PlanConfig::new();
    let mut model = Buhlmann::new();
    match plan(&mut diveplan, &mut cylinders, &mut model, &config, true, true) {
        Ok(Some(dive)) => {
            println!("\n{}", dive.notes);
            let runtime = dive.samples.last().map_or(0, |s| s.time_s);
            println!("Runtime: {} min, {} samples", (runtime + 30) / 60, dive.samples.len());

            let path = get_input("Write samples CSV to, '-' to skip", "-");
            if path != "-" {
                match dump_samples_csv(&dive, &path) {
                    Ok(()) => println!("Samples written to {}", path),
                    Err(err) => eprintln!("Could not write {}: {}", path, err),
                }
            }
        }
        Ok(None) => println!("Nothing to plan."),
        Err(err) => eprintln!("Planning failed: {}", err),
    }
}
