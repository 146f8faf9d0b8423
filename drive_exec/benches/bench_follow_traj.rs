//! # Follow Trajectory Benchmark

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use drive_lib::{
    cmd::{CmdRunner, FollowTrajectory},
    loc::Pose,
    loco_ctrl::{self, Drivetrain},
    sim::{SimParams, SimTank},
    traj_ctrl::{self, Trajectory, TrajectoryState},
};

/// Number of cycles run per benchmark iteration
const NUM_CYCLES: usize = 100;

const CYCLE_PERIOD_S: f64 = 0.02;

fn loco_params() -> loco_ctrl::Params {
    loco_ctrl::Params {
        track_width_m: 0.7112,
        wheel_diameter_m: 0.1016,
        gear_ratio: 1.0 / 7.5833,
        k_s: 0.17247,
        k_v: 2.8886,
        k_a: 2.1367,
        max_voltage_v: 12.0,
        duty_limit: 1.0,
    }
}

fn traj_params() -> traj_ctrl::Params {
    traj_ctrl::Params {
        k_b: 2.0,
        k_zeta: 0.7,
        vel_k_p: 1.0,
        vel_k_i: 0.1,
        vel_k_d: 0.0,
    }
}

/// A sine wave S-bend, advancing 0.5 m/s along X, sampled every 20 ms.
fn s_bend() -> Trajectory {
    let n = 500;
    let states = (0..=n)
        .map(|i| {
            let t = i as f64 * CYCLE_PERIOD_S;

            // Position and its first two time derivatives
            let (x, dx, ddx): (f64, f64, f64) = (0.5 * t, 0.5, 0.0);
            let (y, dy, ddy) = (
                0.5 * (0.5 * t).sin(),
                0.25 * (0.5 * t).cos(),
                -0.125 * (0.5 * t).sin()
            );

            let vel_ms = dx.hypot(dy);
            TrajectoryState {
                time_s: t,
                pose: Pose::new(x, y, dy.atan2(dx)),
                vel_ms,
                ang_vel_rads: (dx * ddy - dy * ddx) / (vel_ms * vel_ms),
                accel_mss: Some((dx * ddx + dy * ddy) / vel_ms),
            }
        })
        .collect();

    Trajectory::new(states).unwrap()
}

fn follow_traj_benchmark(c: &mut Criterion) {
    let loco = loco_params();
    let traj = s_bend();
    let desired = traj.sample(3.0);

    // ---- Tracking law only ----

    let ramsete = traj_params().ramsete();
    let pose = Pose::new(1.4, 0.45, 0.1);
    c.bench_function("ramsete_correct", |b| {
        b.iter(|| ramsete.correct(black_box(&pose), black_box(&desired)))
    });

    // ---- Full cycle, simulation included ----

    c.bench_function("follow_traj_100_cycles", |b| {
        b.iter_batched(
            || {
                let sim = SimTank::new(&loco, SimParams::from_feedforward(&loco.feedforward()));
                let mut runner = CmdRunner::new(Drivetrain::new(loco.clone()), sim);
                let cmd = FollowTrajectory::new(
                    traj.clone(), &traj_params(), loco.max_voltage_v
                );
                runner.schedule(Box::new(cmd), None).unwrap();
                runner
            },
            |mut runner| {
                for _ in 0..NUM_CYCLES {
                    runner.actuator_mut().step(CYCLE_PERIOD_S);
                    let sensors = runner.actuator().sensor_data();
                    runner.tick(CYCLE_PERIOD_S, &sensors).unwrap();
                }
                runner
            },
            BatchSize::SmallInput
        )
    });
}

criterion_group!(benches, follow_traj_benchmark);
criterion_main!(benches);
