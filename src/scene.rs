use glam::{Mat4, Quat, Vec3};

/// CPU-side geometry, cloned out of a loader's decode so the source buffers
/// can drop.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Bake a translation into the vertex positions.
    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            p[0] += offset.x;
            p[1] += offset.y;
            p[2] += offset.z;
        }
    }

    /// Bake a rotation about the X axis into positions and normals.
    pub fn rotate_x(&mut self, angle: f32) {
        let rotation = Quat::from_rotation_x(angle);
        for p in &mut self.positions {
            *p = (rotation * Vec3::from_array(*p)).to_array();
        }
        for n in &mut self.normals {
            *n = (rotation * Vec3::from_array(*n)).to_array();
        }
    }

    /// Bake a uniform scale into the vertex positions.
    pub fn scale(&mut self, factor: f32) {
        for p in &mut self.positions {
            p[0] *= factor;
            p[1] *= factor;
            p[2] *= factor;
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// How an object is shaded: the shared physical material, or an unlit flat
/// color (diagram geometry).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    Physical,
    Flat { color: [f32; 4] },
}

/// An entry in the live scene. Generic over the mesh payload so scene logic
/// stays testable away from the GPU; the renderer uses `SceneObject<GpuMesh>`.
#[derive(Debug)]
pub struct SceneObject<M> {
    pub name: String,
    pub mesh: M,
    pub shading: Shading,
    pub transform: Transform,
    /// Tracked by the per-frame rotation update.
    pub spins: bool,
}

/// The committed vector diagram: flat meshes under one group transform.
#[derive(Debug)]
pub struct DiagramGroup<M> {
    pub name: String,
    pub transform: Transform,
    pub meshes: Vec<(M, [f32; 4])>,
}

/// The mutable collection of renderable objects composed each frame.
#[derive(Debug)]
pub struct Scene<M> {
    pub objects: Vec<SceneObject<M>>,
    pub diagram: Option<DiagramGroup<M>>,
}

impl<M> Scene<M> {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            diagram: None,
        }
    }

    pub fn add_object(&mut self, object: SceneObject<M>) {
        log::info!("scene: committed object '{}'", object.name);
        self.objects.push(object);
    }

    pub fn set_diagram(&mut self, diagram: DiagramGroup<M>) {
        log::info!(
            "scene: committed diagram '{}' ({} meshes)",
            diagram.name,
            diagram.meshes.len()
        );
        self.diagram = Some(diagram);
    }

    /// Rotations of every tracked object, for the per-frame update.
    pub fn spinning_rotations(&mut self) -> impl Iterator<Item = &mut Quat> {
        self.objects
            .iter_mut()
            .filter(|o| o.spins)
            .map(|o| &mut o.transform.rotation)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.diagram.is_none()
    }

    /// Release every object. Safe to call more than once.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.diagram = None;
    }
}

impl<M> Default for Scene<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

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
    fn spinning_rotations_skips_static_objects() {
        let mut scene = Scene::new();
        scene.add_object(object("a", true));
        scene.add_object(object("b", false));
        scene.add_object(object("c", true));

        assert_eq!(scene.spinning_rotations().count(), 2);
    }

    #[test]
    fn clear_twice_is_safe() {
        let mut scene = Scene::new();
        scene.add_object(object("a", true));
        scene.set_diagram(DiagramGroup {
            name: "diagram".to_string(),
            transform: Transform::identity(),
            meshes: vec![((), [1.0, 1.0, 1.0, 1.0])],
        });

        scene.clear();
        scene.clear();

        assert!(scene.is_empty());
    }

    #[test]
    fn translate_then_rotate_matches_bake_order() {
        // The body shell fixups: translate (0, -68, 0), then rotate -PI/2
        // about X. A vertex at the old origin must end up at (0, 0, 68).
        let mut mesh = MeshData::new("shell");
        mesh.positions.push([0.0, 0.0, 0.0]);

        mesh.translate(Vec3::new(0.0, -68.0, 0.0));
        mesh.rotate_x(-FRAC_PI_2);

        let p = Vec3::from_array(mesh.positions[0]);
        assert!((p - Vec3::new(0.0, 0.0, 68.0)).length() < 1e-3);
    }

    #[test]
    fn rotate_x_keeps_normals_unit_length() {
        let mut mesh = MeshData::new("shell");
        mesh.normals.push([0.0, 1.0, 0.0]);

        mesh.rotate_x(-FRAC_PI_2);

        let n = Vec3::from_array(mesh.normals[0]);
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!((n - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
