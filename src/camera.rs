use std::f32::consts::PI;

use cgmath::{perspective, point3, vec3, Matrix4, Point3, Rad, Vector3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

pub const MIN_POLAR: f32 = 0.1;
pub const MAX_POLAR: f32 = PI - 0.1;
pub const MIN_RADIUS: f32 = 5.0;
pub const MAX_RADIUS: f32 = 30.0;

const ROTATE_PER_PIXEL: f32 = 0.01;
const ZOOM_PER_PIXEL: f32 = 0.01;
/// Pixels a single wheel notch scrolls when the platform reports lines.
pub const WHEEL_LINE_PIXELS: f32 = 100.0;

/// Spherical camera parameters around the scene origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub theta: Rad<f32>,
    pub phi: Rad<f32>,
    pub radius: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Rad(PI / 4.0), Rad(PI / 3.0), 15.0)
    }
}

impl OrbitCamera {
    const UP: Vector3<f32> = vec3(0.0, 1.0, 0.0);
    const TARGET: Point3<f32> = point3(0.0, 0.0, 0.0);

    pub fn new(theta: Rad<f32>, phi: Rad<f32>, radius: f32) -> Self {
        Self {
            theta,
            phi: Rad(phi.0.clamp(MIN_POLAR, MAX_POLAR)),
            radius: radius.clamp(MIN_RADIUS, MAX_RADIUS),
        }
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.theta -= Rad(delta_x * ROTATE_PER_PIXEL);
        self.phi = Rad((self.phi.0 - delta_y * ROTATE_PER_PIXEL).clamp(MIN_POLAR, MAX_POLAR));
    }

    /// `delta_y` follows the page convention: positive scrolls down and moves
    /// the camera away.
    pub fn zoom(&mut self, delta_y: f32) {
        self.radius = (self.radius + delta_y * ZOOM_PER_PIXEL).clamp(MIN_RADIUS, MAX_RADIUS);
    }

    pub fn position(&self) -> Point3<f32> {
        let (sin_theta, cos_theta) = self.theta.0.sin_cos();
        let (sin_phi, cos_phi) = self.phi.0.sin_cos();
        point3(
            self.radius * sin_phi * cos_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * sin_theta,
        )
    }

    /// View matrix for an eye on the orbit, looking at the origin.
    pub fn look_from(eye: Point3<f32>) -> Matrix4<f32> {
        Matrix4::look_at_rh(eye, Self::TARGET, Self::UP)
    }
}

pub struct Projection {
    aspect: f32,
    fov_y: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fov_y: f32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fov_y: Rad(fov_y),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn build_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fov_y, self.aspect, self.znear, self.zfar)
    }
}

#[rustfmt::skip]
const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { last: (f64, f64) },
}

/// Winit wheel deltas in page pixels: positive scrolls down and zooms out.
pub fn wheel_delta_y(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -*y * WHEEL_LINE_PIXELS,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
    }
}

/// Turns pointer, touch and wheel input into orbit changes.
#[derive(Debug, Default)]
pub struct OrbitController {
    state: DragState,
    cursor: Option<(f64, f64)>,
    touch_id: Option<u64>,
}

impl OrbitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.state = DragState::Dragging { last: (x, y) };
    }

    /// Applies the delta from the previous pointer sample. Returns whether the
    /// move was consumed by an active drag.
    pub fn pointer_move(&mut self, x: f64, y: f64, camera: &mut OrbitCamera) -> bool {
        let DragState::Dragging { last } = self.state else {
            return false;
        };
        let delta_x = (x - last.0) as f32;
        let delta_y = (y - last.1) as f32;
        camera.rotate(delta_x, delta_y);
        self.state = DragState::Dragging { last: (x, y) };
        true
    }

    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
        self.touch_id = None;
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64, camera: &mut OrbitCamera) -> bool {
        self.cursor = Some((x, y));
        self.pointer_move(x, y, camera)
    }

    /// A press only starts a drag once a cursor position has been seen.
    pub fn left_button(&mut self, state: ElementState) -> bool {
        match state {
            ElementState::Pressed => {
                if let Some((x, y)) = self.cursor {
                    self.pointer_down(x, y);
                }
            }
            ElementState::Released => self.pointer_up(),
        }
        true
    }

    /// Ends any drag. Returns whether one was active.
    pub fn cursor_left(&mut self) -> bool {
        self.cursor = None;
        let was_dragging = self.is_dragging();
        self.pointer_up();
        was_dragging
    }

    /// The first finger down owns the drag until it lifts.
    pub fn touch(
        &mut self,
        id: u64,
        phase: TouchPhase,
        x: f64,
        y: f64,
        camera: &mut OrbitCamera,
    ) -> bool {
        match phase {
            TouchPhase::Started => {
                if self.touch_id.is_none() {
                    self.touch_id = Some(id);
                    self.pointer_down(x, y);
                }
                true
            }
            TouchPhase::Moved => self.touch_id == Some(id) && self.pointer_move(x, y, camera),
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.touch_id == Some(id) {
                    self.pointer_up();
                }
                true
            }
        }
    }

    pub fn process_events(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x, position.y, camera)
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.left_button(*state),
            WindowEvent::CursorLeft { .. } => self.cursor_left(),
            WindowEvent::Touch(touch) => self.touch(
                touch.id,
                touch.phase,
                touch.location.x,
                touch.location.y,
                camera,
            ),
            WindowEvent::MouseWheel { delta, .. } => {
                camera.zoom(wheel_delta_y(delta));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn default_orbit_matches_demo_start() {
        let camera = OrbitCamera::default();
        assert!(approx(camera.theta.0, PI / 4.0));
        assert!(approx(camera.phi.0, PI / 3.0));
        assert!(approx(camera.radius, 15.0));
    }

    #[test]
    fn horizontal_drag_turns_azimuth_only() {
        let mut camera = OrbitCamera::default();
        let mut controller = OrbitController::new();
        controller.pointer_down(200.0, 300.0);
        assert!(controller.pointer_move(300.0, 300.0, &mut camera));

        assert!(approx(camera.theta.0, PI / 4.0 - 1.0));
        assert!(approx(camera.phi.0, PI / 3.0));
        assert!(approx(camera.radius, 15.0));
    }

    #[test]
    fn deltas_are_measured_from_previous_sample() {
        let mut camera = OrbitCamera::default();
        let mut controller = OrbitController::new();
        controller.pointer_down(0.0, 0.0);
        controller.pointer_move(10.0, 0.0, &mut camera);
        controller.pointer_move(30.0, 0.0, &mut camera);
        assert!(approx(camera.theta.0, PI / 4.0 - 0.3));
        assert_eq!(controller.state, DragState::Dragging { last: (30.0, 0.0) });
    }

    #[test]
    fn moves_while_idle_are_ignored() {
        let mut camera = OrbitCamera::default();
        let mut controller = OrbitController::new();
        assert_eq!(controller.state, DragState::Idle);
        assert!(!controller.pointer_move(500.0, 500.0, &mut camera));
        assert_eq!(camera, OrbitCamera::default());

        controller.pointer_down(0.0, 0.0);
        controller.pointer_up();
        assert!(!controller.is_dragging());
        assert!(!controller.pointer_move(500.0, 500.0, &mut camera));
        assert_eq!(camera, OrbitCamera::default());
    }

    #[test]
    fn wheel_zoom_clamps_to_max() {
        let mut camera = OrbitCamera::default();
        camera.zoom(500.0);
        assert!(approx(camera.radius, 20.0));
        camera.zoom(500.0);
        camera.zoom(500.0);
        assert!(approx(camera.radius, MAX_RADIUS));
        camera.zoom(-10_000.0);
        assert!(approx(camera.radius, MIN_RADIUS));
    }

    #[test]
    fn wheel_ignores_drag_state() {
        let mut camera = OrbitCamera::default();
        let mut controller = OrbitController::new();
        controller.pointer_down(0.0, 0.0);
        camera.zoom(-200.0);
        assert!(approx(camera.radius, 13.0));
        assert!(controller.is_dragging());
    }

    #[test]
    fn polar_angle_never_leaves_bounds() {
        let mut camera = OrbitCamera::default();
        let mut controller = OrbitController::new();
        controller.pointer_down(0.0, 0.0);
        let mut y = 0.0;
        for _ in 0..50 {
            y += 10_000.0;
            controller.pointer_move(0.0, y, &mut camera);
            assert!(camera.phi.0 >= MIN_POLAR && camera.phi.0 <= MAX_POLAR);
        }
        assert!(approx(camera.phi.0, MIN_POLAR));
        for _ in 0..50 {
            y -= 10_000.0;
            controller.pointer_move(0.0, y, &mut camera);
            assert!(camera.phi.0 >= MIN_POLAR && camera.phi.0 <= MAX_POLAR);
        }
        assert!(approx(camera.phi.0, MAX_POLAR));
    }

    #[test]
    fn position_is_spherical_projection_of_orbit() {
        let camera = OrbitCamera::new(Rad(0.0), Rad(PI / 2.0), 10.0);
        let pos = camera.position();
        assert!(approx(pos.x, 10.0));
        assert!(approx(pos.y, 0.0));
        assert!(approx(pos.z, 0.0));

        let camera = OrbitCamera::default();
        let pos = camera.position();
        let dist = (pos.x * pos.x + pos.y * pos.y + pos.z * pos.z).sqrt();
        assert!(approx(dist, 15.0));
        assert!(approx(pos.y, 15.0 * (PI / 3.0).cos()));
    }

    #[test]
    fn constructor_clamps_out_of_range_values() {
        let camera = OrbitCamera::new(Rad(0.0), Rad(5.0), 100.0);
        assert!(approx(camera.phi.0, MAX_POLAR));
        assert!(approx(camera.radius, MAX_RADIUS));
    }

    #[test]
    fn projection_ignores_zero_sized_resize() {
        let mut projection = Projection::new(1280, 720, 60f32.to_radians(), 0.1, 1000.0);
        projection.resize(0, 720);
        assert!(approx(projection.aspect(), 1280.0 / 720.0));
        projection.resize(800, 800);
        assert!(approx(projection.aspect(), 1.0));
    }

    #[test]
    fn wheel_lines_count_as_hundred_pixels() {
        assert!(approx(wheel_delta_y(&MouseScrollDelta::LineDelta(0.0, -1.0)), 100.0));
        assert!(approx(wheel_delta_y(&MouseScrollDelta::LineDelta(0.0, 2.0)), -200.0));
        let pixels = MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition::new(0.0, -35.0));
        assert!(approx(wheel_delta_y(&pixels), 35.0));

        let mut camera = OrbitCamera::default();
        camera.zoom(wheel_delta_y(&MouseScrollDelta::LineDelta(0.0, -1.0)));
        assert!(approx(camera.radius, 16.0));
    }

    #[test]
    fn touch_moves_during_drag_are_consumed() {
        let mut camera = OrbitCamera::default();
        let mut controller = OrbitController::new();
        assert!(!controller.touch(1, TouchPhase::Moved, 10.0, 10.0, &mut camera));

        assert!(controller.touch(1, TouchPhase::Started, 0.0, 0.0, &mut camera));
        assert!(controller.touch(1, TouchPhase::Moved, 50.0, 0.0, &mut camera));
        assert!(approx(camera.theta.0, PI / 4.0 - 0.5));

        assert!(controller.touch(1, TouchPhase::Ended, 50.0, 0.0, &mut camera));
        assert!(!controller.is_dragging());
        assert!(!controller.touch(1, TouchPhase::Moved, 90.0, 0.0, &mut camera));
    }

    #[test]
    fn second_finger_does_not_take_over() {
        let mut camera = OrbitCamera::default();
        let mut controller = OrbitController::new();
        controller.touch(1, TouchPhase::Started, 0.0, 0.0, &mut camera);
        controller.touch(2, TouchPhase::Started, 400.0, 400.0, &mut camera);
        assert_eq!(controller.state, DragState::Dragging { last: (0.0, 0.0) });

        assert!(!controller.touch(2, TouchPhase::Moved, 500.0, 400.0, &mut camera));
        assert_eq!(camera, OrbitCamera::default());

        controller.touch(2, TouchPhase::Ended, 500.0, 400.0, &mut camera);
        assert!(controller.is_dragging());
        controller.touch(1, TouchPhase::Cancelled, 0.0, 0.0, &mut camera);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn cursor_leaving_ends_drag() {
        let mut camera = OrbitCamera::default();
        let mut controller = OrbitController::new();
        assert!(!controller.cursor_left());

        controller.cursor_moved(10.0, 10.0, &mut camera);
        controller.left_button(ElementState::Pressed);
        assert!(controller.is_dragging());
        assert!(controller.cursor_left());
        assert!(!controller.is_dragging());
        assert!(!controller.cursor_moved(80.0, 10.0, &mut camera));
        assert_eq!(camera, OrbitCamera::default());
    }

    #[test]
    fn press_needs_known_cursor() {
        let mut camera = OrbitCamera::default();
        let mut controller = OrbitController::new();
        assert!(controller.left_button(ElementState::Pressed));
        assert!(!controller.is_dragging());

        assert!(!controller.cursor_moved(20.0, 30.0, &mut camera));
        controller.left_button(ElementState::Pressed);
        assert_eq!(controller.state, DragState::Dragging { last: (20.0, 30.0) });
        assert!(controller.cursor_moved(40.0, 30.0, &mut camera));
        assert!(approx(camera.theta.0, PI / 4.0 - 0.2));

        controller.left_button(ElementState::Released);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn look_from_matches_orbit_position() {
        let camera = OrbitCamera::default();
        let eye = camera.position();
        let view = OrbitCamera::look_from(eye);
        let origin = view * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx(origin.x, 0.0));
        assert!(approx(origin.y, 0.0));
        assert!(approx(origin.z, -15.0));
    }
}
