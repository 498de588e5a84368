//! Follow complete paths with the simulated base

use traj_lib::{
    drive::{Drivetrain, Localizer},
    follower::{Follower, Params},
    path::{Curve, Path, PathSpec},
    pose::Pose,
    sim::SimBase,
};

const DT_S: f64 = 0.01;

fn params() -> Params {
    Params {
        x_k_p: 5.0,
        x_k_i: 0.0,
        x_k_d: 0.0,
        y_k_p: 5.0,
        y_k_i: 0.0,
        y_k_d: 0.0,
        integral_clamp: 1.0,
        max_drive_velocity_ms: 50.0,
        max_drive_acceleration_mss: 25.0,
        max_centripetal_acceleration_mss: 196.0,
        profile_resolution: 500,
    }
}

/// Run the follower until it is done, returning the base and the number of cycles.
fn run(path: Path, mut base: SimBase) -> (SimBase, Follower, usize) {
    let mut follower = Follower::new(params()).unwrap();
    follower.set_path(Some(path)).unwrap();

    let duration = follower.profile().unwrap().duration();
    let max_cycles = (duration / DT_S).ceil() as usize + 10;

    let mut cycles = 0;
    while !follower.done() {
        assert!(follower.elapsed_s() < duration);

        let pose = base.pose();
        follower.update(DT_S, &pose, &mut base).unwrap();
        base.step(DT_S).unwrap();

        cycles += 1;
        assert!(cycles <= max_cycles, "Follower did not finish");
    }

    base.stop();

    (base, follower, cycles)
}

#[test]
fn test_follow_straight() {
    let path = Path::linear(&[Pose::new(0.0, 0.0), Pose::new(100.0, 0.0)]).unwrap();
    let end = path.end_pose();

    let (base, follower, _) = run(path, SimBase::new(Pose::new(0.0, 0.0), Default::default()));

    // The fastest possible profile ramps to full speed and back
    let (v, a, l) = (50.0, 25.0, 100.0);
    assert!(follower.elapsed_s() >= v / a + (l - v * v / a) / v);

    let error = base.pose().distance_to(&end);
    assert!(error < 0.05, "final error {}", error);
}

#[test]
fn test_follow_spline() {
    let spec: PathSpec = util::params::from_str(
        r#"
        type = "Hermite"
        tension = 0.0

        [[waypoints]]
        x = 0.0
        y = 0.0
        tangent = [100.0, 0.0]

        [[waypoints]]
        x = 100.0
        y = 50.0
        tangent = [100.0, 0.0]
        "#,
    )
    .unwrap();
    let path = Path::from_path_spec(&spec).unwrap();
    let end = path.end_pose();

    // Start rotated so the body frame differs from the field frame
    let base = SimBase::new(Pose::with_heading(0.0, 0.0, 0.5), Default::default());
    let (base, _, _) = run(path, base);

    let error = base.pose().distance_to(&end);
    assert!(error < 0.5, "final error {}", error);

    // Heading is not controlled
    assert!((base.pose().theta - 0.5).abs() < 1e-9);
}

#[test]
fn test_feedback_corrects_slow_drivetrain() {
    let path = Path::linear(&[
        Pose::new(0.0, 0.0),
        Pose::new(40.0, 0.0),
        Pose::new(40.0, 40.0),
    ])
    .unwrap();
    let end = path.end_pose();

    // Drivetrain only achieves 90 % of the commanded velocity
    let base = SimBase::new(Pose::new(0.0, 0.0), Default::default()).with_velocity_scale(0.9);
    let (mut base, mut follower, _) = run(path, base);

    // Keep holding the end of the path until the error settles
    for _ in 0..500 {
        let pose = base.pose();
        follower.update(DT_S, &pose, &mut base).unwrap();
        base.step(DT_S).unwrap();
    }

    let error = base.pose().distance_to(&end);
    assert!(error < 0.05, "final error {}", error);
}
