use glam::{Quat, Vec3};
use std::f32::consts::TAU;

use glass_sketch::camera::{Camera, OrbitControls};
use glass_sketch::update::{
    advance_rotations, advance_swoop, rotate_about_world_y, swoop_position, zero_rotations,
    ROTATE_PERIOD, SWOOP_PERIOD,
};

#[cfg(test)]
mod update_loop_tests {
    use super::*;

    fn angle_about_y(q: Quat) -> f32 {
        let (axis, angle) = q.to_axis_angle();
        if axis.y < 0.0 {
            TAU - angle
        } else {
            angle
        }
    }

    #[test]
    fn test_rotation_sum_over_chunks_equals_whole_interval() {
        // Simulated uneven frame pacing: the same 3.7 seconds split three
        // different ways must land on the same accumulated angle.
        let partitions: [&[f32]; 3] = [
            &[3.7],
            &[1.0, 1.0, 1.0, 0.7],
            &[0.016, 0.033, 1.951, 0.5, 0.6, 0.6],
        ];

        let angles: Vec<f32> = partitions
            .iter()
            .map(|deltas| {
                let mut q = Quat::IDENTITY;
                for &delta in *deltas {
                    q = rotate_about_world_y(q, delta);
                }
                angle_about_y(q)
            })
            .collect();

        let expected = (3.7 / ROTATE_PERIOD) * TAU % TAU;
        for angle in angles {
            assert!(
                (angle - expected).abs() < 1e-3,
                "accumulated {} expected {}",
                angle,
                expected
            );
        }
    }

    #[test]
    fn test_ten_seconds_is_one_full_revolution() {
        let mut q = Quat::IDENTITY;
        for _ in 0..600 {
            q = rotate_about_world_y(q, ROTATE_PERIOD / 600.0);
        }
        assert!(q.angle_between(Quat::IDENTITY) < 1e-2);
    }

    #[test]
    fn test_rotation_toggle_zeroes_every_tracked_object_once() {
        let mut rotations = vec![
            Quat::from_rotation_y(0.3),
            Quat::from_rotation_y(2.9),
            Quat::from_rotation_y(5.5),
        ];

        zero_rotations(rotations.iter_mut());
        for q in &rotations {
            assert_eq!(*q, Quat::IDENTITY, "rotation should be exactly zero");
        }

        // Zeroing again changes nothing
        zero_rotations(rotations.iter_mut());
        for q in &rotations {
            assert_eq!(*q, Quat::IDENTITY);
        }
    }

    #[test]
    fn test_advance_skips_untracked_objects_by_construction() {
        // Only the rotations handed to the update advance
        let mut tracked = vec![Quat::IDENTITY; 2];
        advance_rotations(tracked.iter_mut(), 1.0);

        let untracked = Quat::IDENTITY;
        assert!(tracked.iter().all(|q| *q != Quat::IDENTITY));
        assert_eq!(untracked, Quat::IDENTITY);
    }

    #[test]
    fn test_swoop_position_lies_on_the_circular_path() {
        for &time in &[0.0, 1.3, 5.0, 9.99, 42.0] {
            let theta = (time / SWOOP_PERIOD) * TAU;
            let pos = swoop_position(time);
            assert!((pos.x - 2.0 * theta.sin()).abs() < 1e-5);
            assert!((pos.y - 2.0 * theta.cos()).abs() < 1e-5);
            assert_eq!(pos.z, 4.0);
        }
    }

    #[test]
    fn test_swoop_overrides_manual_orbit() {
        let mut camera = Camera::new();
        let controls = OrbitControls::new(&camera);

        // Manual orbit runs first, then the swoop overrides it
        controls.update(&mut camera);
        advance_swoop(&mut camera, 2.5);

        assert_eq!(camera.position, swoop_position(2.5));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_disabling_swoop_does_not_snap_the_camera() {
        let mut camera = Camera::new();
        let mut controls = OrbitControls::new(&camera);

        // Swoop moved the camera away from the orbit pose
        controls.enabled = false;
        advance_swoop(&mut camera, 4.0);
        let swept = camera.position;

        // Toggle off: adopt the current pose, re-enable manual control
        controls.sync_from(&camera);
        controls.enabled = true;
        controls.update(&mut camera);

        assert!(
            (camera.position - swept).length() < 1e-3,
            "camera moved from {:?} to {:?} on toggle",
            swept,
            camera.position
        );
    }
}
