use glam::Quat;

use glass_sketch::scene::{DiagramGroup, Scene, SceneObject, Shading, Transform};
use glass_sketch::sketch::effective_extent;

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    fn object(name: &str, spins: bool) -> SceneObject<()> {
        SceneObject {
            name: name.to_string(),
            mesh: (),
            shading: Shading::Physical,
            transform: Transform::identity(),
            spins,
        }
    }

    #[test]
    fn test_resize_clamps_pixel_ratio_to_two() {
        // 800x600 viewport on a 3x display
        assert_eq!(effective_extent((2400, 1800), 3.0), (1600, 1200));
    }

    #[test]
    fn test_resize_keeps_lower_ratios() {
        assert_eq!(effective_extent((800, 600), 1.0), (800, 600));
        assert_eq!(effective_extent((1200, 900), 1.5), (1200, 900));
    }

    #[test]
    fn test_scene_release_is_idempotent() {
        let mut scene: Scene<()> = Scene::new();
        scene.add_object(object("body", true));
        scene.add_object(object("head", true));
        scene.set_diagram(DiagramGroup {
            name: "plan".to_string(),
            transform: Transform::identity(),
            meshes: vec![((), [1.0, 0.0, 0.0, 1.0])],
        });

        scene.clear();
        assert!(scene.is_empty());

        // A second release must not panic or double-free anything
        scene.clear();
        assert!(scene.is_empty());
    }

    #[test]
    fn test_render_loop_tolerates_partially_loaded_scene() {
        // Loads land asynchronously; the update must be valid with zero,
        // some, or all objects present.
        let mut scene: Scene<()> = Scene::new();
        glass_sketch::update::advance_rotations(scene.spinning_rotations(), 0.016);
        assert!(scene.is_empty());

        scene.add_object(object("body", true));
        glass_sketch::update::advance_rotations(scene.spinning_rotations(), 0.016);
        assert_ne!(
            scene.objects[0].transform.rotation,
            Quat::IDENTITY,
            "the one loaded object still rotates"
        );
    }
}
