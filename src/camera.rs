use glam::{Mat4, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

pub const ORBIT_ROTATE_SPEED: f32 = 0.005;
pub const ORBIT_ZOOM_SPEED: f32 = 0.25;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;
// Keep pitch off the poles so the view basis stays well defined
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Perspective camera aimed at a target point.
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            fov_y: 45.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.01,
            far: 10_000.0,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        proj * view
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            position: self.position.to_array(),
            _pad: 0.0,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera data in GPU layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _pad: f32,
}

/// Mouse-driven orbit around a fixed target.
///
/// While the swooping camera is active the controls are disabled and the
/// per-frame update leaves the camera alone.
pub struct OrbitControls {
    pub enabled: bool,
    yaw: f32,
    pitch: f32,
    distance: f32,
    target: Vec3,
    initial: (f32, f32, f32),
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl OrbitControls {
    /// Derive the orbit state from the camera's starting pose.
    pub fn new(camera: &Camera) -> Self {
        let (yaw, pitch, distance) = pose_to_orbit(camera.position, camera.target);
        Self {
            enabled: true,
            yaw,
            pitch,
            distance,
            target: camera.target,
            initial: (yaw, pitch, distance),
            dragging: false,
            last_cursor: None,
        }
    }

    /// Restore the stored initial orbit state.
    pub fn reset(&mut self) {
        let (yaw, pitch, distance) = self.initial;
        self.yaw = yaw;
        self.pitch = pitch;
        self.distance = distance;
        self.dragging = false;
        self.last_cursor = None;
    }

    /// Adopt the camera's current pose as the orbit state, so re-enabling
    /// manual control does not move the camera.
    pub fn sync_from(&mut self, camera: &Camera) {
        let (yaw, pitch, distance) = pose_to_orbit(camera.position, camera.target);
        self.yaw = yaw;
        self.pitch = pitch;
        self.distance = distance;
        self.target = camera.target;
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state.is_pressed();
            if !self.dragging {
                self.last_cursor = None;
            }
        }
    }

    pub fn process_cursor(&mut self, x: f64, y: f64) {
        if !self.enabled || !self.dragging {
            self.last_cursor = Some((x, y));
            return;
        }

        if let Some((lx, ly)) = self.last_cursor {
            let dx = (x - lx) as f32;
            let dy = (y - ly) as f32;
            self.yaw -= dx * ORBIT_ROTATE_SPEED;
            self.pitch = (self.pitch + dy * ORBIT_ROTATE_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
        }
        self.last_cursor = Some((x, y));
    }

    pub fn process_scroll(&mut self, delta: MouseScrollDelta) {
        if !self.enabled {
            return;
        }

        let steps = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
        };
        self.distance =
            (self.distance - steps * ORBIT_ZOOM_SPEED).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Apply the orbit state to the camera. No-op while disabled.
    pub fn update(&self, camera: &mut Camera) {
        if !self.enabled {
            return;
        }

        camera.position = self.target + orbit_offset(self.yaw, self.pitch, self.distance);
        camera.target = self.target;
    }
}

fn orbit_offset(yaw: f32, pitch: f32, distance: f32) -> Vec3 {
    Vec3::new(
        yaw.sin() * pitch.cos(),
        pitch.sin(),
        yaw.cos() * pitch.cos(),
    ) * distance
}

fn pose_to_orbit(position: Vec3, target: Vec3) -> (f32, f32, f32) {
    let offset = position - target;
    let distance = offset.length().max(MIN_DISTANCE);
    let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
    let yaw = offset.x.atan2(offset.z);
    (yaw, pitch, distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_state_round_trips_through_camera_pose() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(1.5, 2.0, 3.0);

        let controls = OrbitControls::new(&camera);
        let mut placed = Camera::new();
        controls.update(&mut placed);

        assert!((placed.position - camera.position).length() < 1e-4);
    }

    #[test]
    fn disabled_controls_leave_camera_alone() {
        let mut camera = Camera::new();
        let mut controls = OrbitControls::new(&camera);
        controls.enabled = false;

        camera.position = Vec3::new(9.0, 9.0, 9.0);
        controls.update(&mut camera);

        assert_eq!(camera.position, Vec3::new(9.0, 9.0, 9.0));
    }

    #[test]
    fn sync_from_adopts_current_pose_without_moving() {
        let mut camera = Camera::new();
        let mut controls = OrbitControls::new(&camera);

        // Camera has been swept somewhere else by the swoop path
        camera.position = Vec3::new(2.0, 0.0, 4.0);
        controls.sync_from(&camera);
        controls.enabled = true;

        let before = camera.position;
        controls.update(&mut camera);
        assert!((camera.position - before).length() < 1e-4);
    }

    #[test]
    fn reset_restores_initial_state() {
        let camera = Camera::new();
        let mut controls = OrbitControls::new(&camera);

        controls.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        controls.process_cursor(0.0, 0.0);
        controls.process_cursor(200.0, 80.0);
        controls.reset();

        let mut placed = Camera::new();
        controls.update(&mut placed);
        assert!((placed.position - camera.position).length() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped_off_the_poles() {
        let camera = Camera::new();
        let mut controls = OrbitControls::new(&camera);

        controls.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        controls.process_cursor(0.0, 0.0);
        controls.process_cursor(0.0, 1.0e6);

        let mut placed = Camera::new();
        controls.update(&mut placed);
        assert!(placed.position.is_finite());
    }
}
