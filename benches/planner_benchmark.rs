use criterion::{criterion_group, criterion_main, Criterion};
use diveplan::buhlmann::Buhlmann;
use diveplan::cylinder::Cylinder;
use diveplan::deco::DecoModel;
use diveplan::gas::GasMix;
use diveplan::plan::Plan;
use diveplan::planner::plan;
use diveplan::PlanConfig;

fn benchmark_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("deco_model");

    group.bench_function("advance_one_second", |b| {
        let mut model = Buhlmann::new();
        model.init(1013);
        model.set_gf(0.3, 0.7, true);
        b.iter(|| model.advance(4.013, &GasMix::AIR, 1, 0))
    });

    group.bench_function("snapshot_restore", |b| {
        let mut model = Buhlmann::new();
        model.init(1013);
        b.iter(|| {
            let state = model.snapshot();
            model.restore(&state)
        })
    });

    group.finish();
}

fn benchmark_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("planning");
    group.sample_size(20);

    group.bench_function("deco_plan_40m_25min", |b| {
        b.iter(|| {
            let mut diveplan = Plan::new(30, 70);
            diveplan.add_segment(120, 40000, GasMix::new(210, 0), 0, true);
            diveplan.add_segment(1380, 40000, GasMix::new(210, 0), 0, true);
            diveplan.add_segment(0, 21000, GasMix::new(500, 0), 0, false);
            let mut cylinders = vec![
                Cylinder::new("D12", 24000, 232000, 232000, GasMix::new(210, 0)),
                Cylinder::new("S80", 11100, 207000, 207000, GasMix::new(500, 0)),
            ];
            let mut model = Buhlmann::new();
            let config = PlanConfig::new();
            plan(&mut diveplan, &mut cylinders, &mut model, &config, true, false)
        })
    });

    group.bench_function("no_deco_plan_18m_30min", |b| {
        b.iter(|| {
            let mut diveplan = Plan::new(30, 70);
            diveplan.add_segment(60, 18000, GasMix::AIR, 0, true);
            diveplan.add_segment(1800, 18000, GasMix::AIR, 0, true);
            let mut cylinders = vec![Cylinder::new("12l", 12000, 232000, 232000, GasMix::AIR)];
            let mut model = Buhlmann::new();
            let config = PlanConfig::new();
            plan(&mut diveplan, &mut cylinders, &mut model, &config, false, false)
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_model, benchmark_planning);
criterion_main!(benches);
