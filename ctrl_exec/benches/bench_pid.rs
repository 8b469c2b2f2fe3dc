//! # PID Controller Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ctrl_lib::{
    drive_ctrl::{DriveCtrl, Params},
    pid::{Gains, PidController},
    telemetry::{Frame, TelemetrySample},
};
use util::{lookup::LookupTable, module::State};

fn pid_benchmark(c: &mut Criterion) {
    // ---- Single controller cycle ----

    let mut pid = PidController::with_gains(Gains::new(1.0, 0.1, 0.5)).unwrap();
    pid.set_limits(1.0, 0.25).unwrap();
    pid.reset(0.0).unwrap();

    let mut error = 0.0f64;

    c.bench_function("pid_update_and_output", |b| {
        b.iter(|| {
            error = (error + 0.01) % 2.0;
            pid.update_error(black_box(0.05), black_box(error - 1.0))
                .unwrap();
            pid.total_error().unwrap()
        })
    });

    // ---- Drive control cycle ----

    let mut drive_ctrl = DriveCtrl::new(Params::default()).unwrap();
    let mut time_s = 0.0;

    c.bench_function("drive_ctrl_proc", |b| {
        b.iter(|| {
            time_s += 0.05;
            drive_ctrl
                .proc(black_box(&Frame::Telemetry(TelemetrySample {
                    time_s,
                    cte_m: 0.2,
                    speed_mph: 19.5,
                    steer_angle_deg: 0.0,
                })))
                .unwrap()
        })
    });

    // ---- Gain table lookup ----

    let table = LookupTable::from_points((0..100).map(|i| (i as f64, (i as f64).sqrt())))
        .unwrap();

    c.bench_function("lookup_query", |b| {
        b.iter(|| table.query(black_box(42.37)).unwrap())
    });
}

criterion_group!(benches, pid_benchmark);
criterion_main!(benches);
