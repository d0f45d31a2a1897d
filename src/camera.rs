use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::config::{CameraControlsConfig, SceneConfig};
use crate::math::Ray;

pub const MIN_PHI: f32 = 0.1;
pub const MAX_PHI: f32 = std::f32::consts::PI - 0.1;
pub const DEFAULT_PHI: f32 = std::f32::consts::FRAC_PI_4;

/// Screen area the scene is drawn into, in client pixels. `left` is the
/// width of the sidebar to the left of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }

    /// True when the canvas has no drawable area
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite())
    }

    /// Client pixels to normalized device coordinates (y up). `None` for a
    /// degenerate viewport.
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<Vec2> {
        if self.is_degenerate() {
            return None;
        }
        Some(Vec2::new(
            (x - self.left) / self.width * 2.0 - 1.0,
            -((y - self.top) / self.height) * 2.0 + 1.0,
        ))
    }

    pub fn from_ndc(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width + self.left,
            (1.0 - ndc.y) * 0.5 * self.height + self.top,
        )
    }
}

/// Perspective camera orbiting the origin on a sphere of `distance`
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub theta: f32,
    pub phi: f32,
    pub distance: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    controls: CameraControlsConfig,
}

impl OrbitCamera {
    pub fn new(scene: &SceneConfig, controls: &CameraControlsConfig) -> Self {
        Self {
            theta: 0.0,
            phi: DEFAULT_PHI,
            distance: controls.default_distance,
            fov_degrees: scene.camera_fov,
            near: scene.camera_near,
            far: scene.camera_far,
            controls: controls.clone(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.distance * self.phi.sin() * self.theta.cos(),
            self.distance * self.phi.cos(),
            self.distance * self.phi.sin() * self.theta.sin(),
        )
    }

    /// Drag by a pixel delta
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.theta += dx * self.controls.rotation_speed;
        self.phi = (self.phi + dy * self.controls.rotation_speed).clamp(MIN_PHI, MAX_PHI);
    }

    /// Wheel delta; positive moves away
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta * self.controls.zoom_speed)
            .clamp(self.controls.min_distance, self.controls.max_distance);
    }

    pub fn reset(&mut self) {
        self.theta = 0.0;
        self.phi = DEFAULT_PHI;
        self.distance = self.controls.default_distance;
    }

    /// Jumps to an explicit view. Phi is clamped like a drag would be,
    /// distance is taken as given.
    pub fn set_view(&mut self, theta: f32, phi: f32, distance: f32) {
        self.theta = theta;
        self.phi = phi.clamp(MIN_PHI, MAX_PHI);
        self.distance = distance;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }

    fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// World-space ray through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2, aspect: f32) -> Ray {
        let inv = self.view_projection(aspect).inverse();
        let unproject = |z: f32| {
            let p = inv * Vec4::new(ndc.x, ndc.y, z, 1.0);
            p.truncate() / p.w
        };
        let near = unproject(-1.0);
        let far = unproject(1.0);
        Ray::new(self.position(), (far - near).normalize())
    }

    pub fn ray_from_screen(&self, viewport: &Viewport, x: f32, y: f32) -> Option<Ray> {
        let ndc = viewport.to_ndc(x, y)?;
        Some(self.ray_from_ndc(ndc, viewport.aspect()))
    }

    /// Normalized device coordinates of a world point
    pub fn project(&self, world: Vec3, aspect: f32) -> Vec2 {
        let clip = self.view_projection(aspect) * world.extend(1.0);
        Vec2::new(clip.x / clip.w, clip.y / clip.w)
    }

    pub fn project_to_screen(&self, viewport: &Viewport, world: Vec3) -> Vec2 {
        viewport.from_ndc(self.project(world, viewport.aspect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(&SceneConfig::default(), &CameraControlsConfig::default())
    }

    #[test]
    fn starts_at_default_distance() {
        let cam = camera();
        assert!((cam.position().length() - 6.0).abs() < 1e-5);
        assert!(cam.position().y > 0.0);
    }

    #[test]
    fn phi_is_clamped() {
        let mut cam = camera();
        cam.rotate(0.0, 10_000.0);
        assert!((cam.phi - MAX_PHI).abs() < 1e-6);
        cam.rotate(0.0, -10_000.0);
        assert!((cam.phi - MIN_PHI).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = camera();
        cam.zoom(10_000.0);
        assert_eq!(cam.distance, 10.0);
        cam.zoom(-10_000.0);
        assert_eq!(cam.distance, 3.0);
    }

    #[test]
    fn reset_restores_default_view() {
        let mut cam = camera();
        cam.rotate(50.0, 20.0);
        cam.zoom(100.0);
        cam.reset();
        assert_eq!(cam.theta, 0.0);
        assert_eq!(cam.phi, DEFAULT_PHI);
        assert_eq!(cam.distance, 6.0);
    }

    #[test]
    fn center_ray_points_at_origin() {
        let cam = camera();
        let ray = cam.ray_from_ndc(Vec2::ZERO, 1.5);
        let to_origin = (-cam.position()).normalize();
        assert!((ray.direction - to_origin).length() < 1e-4);
    }

    #[test]
    fn projected_point_unprojects_onto_itself() {
        let cam = camera();
        let viewport = Viewport::new(300.0, 0.0, 900.0, 600.0);
        let target = Vec3::new(0.3, -0.2, 0.4);

        let screen = cam.project_to_screen(&viewport, target);
        let ray = cam.ray_from_screen(&viewport, screen.x, screen.y).unwrap();

        let closest = ray.at((target - ray.origin).dot(ray.direction));
        assert!((closest - target).length() < 1e-3);
    }

    #[test]
    fn viewport_maps_corners_to_ndc() {
        let viewport = Viewport::new(300.0, 0.0, 800.0, 600.0);
        assert_eq!(viewport.to_ndc(300.0, 0.0), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(viewport.to_ndc(1100.0, 600.0), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(viewport.to_ndc(700.0, 300.0), Some(Vec2::ZERO));
        assert!(!viewport.contains(100.0, 100.0));
    }

    #[test]
    fn zero_sized_viewport_yields_no_ray() {
        let cam = camera();
        for viewport in [
            Viewport::new(0.0, 0.0, 0.0, 600.0),
            Viewport::new(0.0, 0.0, 800.0, 0.0),
            Viewport::new(0.0, 0.0, -5.0, 600.0),
            Viewport::new(0.0, 0.0, f32::NAN, 600.0),
        ] {
            assert!(viewport.is_degenerate());
            assert_eq!(viewport.to_ndc(10.0, 10.0), None);
            assert!(cam.ray_from_screen(&viewport, 10.0, 10.0).is_none());
        }
    }
}
