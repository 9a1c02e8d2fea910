use glam::{Quat, Vec3};
use std::f32::consts::TAU;

use crate::camera::Camera;

/// Seconds for one full revolution of a spinning object.
pub const ROTATE_PERIOD: f32 = 10.0;
/// Seconds for one full sweep of the swooping camera.
pub const SWOOP_PERIOD: f32 = 10.0;

/// Rotation advanced this frame, delta-scaled so the accumulated angle over
/// an interval does not depend on how the interval was chunked into frames.
pub fn rotation_angle(delta: f32) -> f32 {
    (delta / ROTATE_PERIOD) * TAU
}

/// Rotate about the world Y axis (not the object's local axis).
pub fn rotate_about_world_y(rotation: Quat, delta: f32) -> Quat {
    Quat::from_rotation_y(rotation_angle(delta)) * rotation
}

/// Advance every tracked rotation by this frame's delta.
pub fn advance_rotations<'a>(rotations: impl Iterator<Item = &'a mut Quat>, delta: f32) {
    let step = Quat::from_rotation_y(rotation_angle(delta));
    for rotation in rotations {
        *rotation = step * *rotation;
    }
}

/// Zero every tracked rotation. Used when the rotation toggle flips.
pub fn zero_rotations<'a>(rotations: impl Iterator<Item = &'a mut Quat>) {
    for rotation in rotations {
        *rotation = Quat::IDENTITY;
    }
}

/// Position on the fixed-radius swoop path at an absolute time.
pub fn swoop_position(time: f32) -> Vec3 {
    let theta = (time / SWOOP_PERIOD) * TAU;
    Vec3::new(2.0 * theta.sin(), 2.0 * theta.cos(), 4.0)
}

/// Place the camera on the swoop path and aim it at the scene origin,
/// overriding any manual orbit input.
pub fn advance_swoop(camera: &mut Camera, time: f32) {
    camera.position = swoop_position(time);
    camera.look_at(Vec3::ZERO);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulated_angle(q: Quat) -> f32 {
        let (axis, angle) = q.to_axis_angle();
        if axis.y < 0.0 {
            TAU - angle
        } else {
            angle
        }
    }

    #[test]
    fn rotation_is_independent_of_frame_chunking() {
        // One second in a single step vs. the same second in uneven chunks
        let mut whole = Quat::IDENTITY;
        whole = rotate_about_world_y(whole, 1.0);

        let mut chunked = Quat::IDENTITY;
        for delta in [0.4, 0.25, 0.25, 0.1] {
            chunked = rotate_about_world_y(chunked, delta);
        }

        assert!((accumulated_angle(whole) - accumulated_angle(chunked)).abs() < 1e-4);
    }

    #[test]
    fn full_period_returns_to_identity() {
        let mut rotation = Quat::IDENTITY;
        for _ in 0..100 {
            rotation = rotate_about_world_y(rotation, ROTATE_PERIOD / 100.0);
        }

        assert!(rotation.angle_between(Quat::IDENTITY) < 1e-3);
    }

    #[test]
    fn quarter_period_is_quarter_turn() {
        let rotation = rotate_about_world_y(Quat::IDENTITY, ROTATE_PERIOD / 4.0);
        assert!((accumulated_angle(rotation) - TAU / 4.0).abs() < 1e-4);
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let rotation = rotate_about_world_y(Quat::from_rotation_y(1.0), 0.0);
        assert!(rotation.angle_between(Quat::from_rotation_y(1.0)) < 1e-6);
    }

    #[test]
    fn advance_rotations_touches_every_tracked_object() {
        let mut rotations = vec![Quat::IDENTITY; 3];
        advance_rotations(rotations.iter_mut(), 2.5);

        let expected = rotation_angle(2.5);
        for q in &rotations {
            assert!((accumulated_angle(*q) - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn zero_rotations_discards_accumulated_spin() {
        let mut rotations = vec![Quat::from_rotation_y(1.2), Quat::from_rotation_y(-0.7)];
        zero_rotations(rotations.iter_mut());

        for q in &rotations {
            assert_eq!(*q, Quat::IDENTITY);
        }
    }

    #[test]
    fn swoop_path_is_a_fixed_radius_circle() {
        let pos = swoop_position(2.5);
        let theta = (2.5 / SWOOP_PERIOD) * TAU;

        assert!((pos.x - 2.0 * theta.sin()).abs() < 1e-6);
        assert!((pos.y - 2.0 * theta.cos()).abs() < 1e-6);
        assert_eq!(pos.z, 4.0);
    }

    #[test]
    fn swoop_aims_at_origin() {
        let mut camera = Camera::new();
        camera.target = Vec3::new(1.0, 1.0, 1.0);

        advance_swoop(&mut camera, 7.0);
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.position, swoop_position(7.0));
    }
}
