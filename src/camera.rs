//! Orbit and follow cameras

use glam::{Mat4, Vec3, Vec4};

use crate::facing;
use crate::sim::GameState;
use crate::sim::picking::Ray;

/// Starting overview position, orbiting the island
pub const ORBIT_EYE: Vec3 = Vec3::new(100.0, 80.0, 100.0);
/// Orbit limits: elevation above the sea (radians) and eye distance
pub const ORBIT_MIN_PITCH: f32 = 0.05;
pub const ORBIT_MAX_PITCH: f32 = 1.45;
pub const ORBIT_MIN_DISTANCE: f32 = 30.0;
pub const ORBIT_MAX_DISTANCE: f32 = 600.0;
/// Radians turned per dragged pixel
pub const ORBIT_DRAG_SPEED: f32 = 0.005;
/// Zoom factor exponent per wheel delta unit
pub const ORBIT_ZOOM_SPEED: f32 = 0.001;
/// Follow camera sits this far behind and above the boat
pub const FOLLOW_DISTANCE: f32 = 25.0;
pub const FOLLOW_HEIGHT: f32 = 10.0;
/// Fraction of the remaining gap closed per frame in follow mode
pub const FOLLOW_LERP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Orbit,
    Follow,
}

/// Spherical position of the orbit eye around the island
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    /// Heading around the y axis, 0 looking from +Z
    pub yaw: f32,
    /// Elevation above the horizon
    pub pitch: f32,
    pub distance: f32,
}

impl Default for Orbit {
    fn default() -> Self {
        Self::looking_from(ORBIT_EYE)
    }
}

impl Orbit {
    /// Orbit that places the eye at `eye`, within the limits
    pub fn looking_from(eye: Vec3) -> Self {
        let distance = eye.length().max(f32::EPSILON);
        Self {
            yaw: eye.x.atan2(eye.z),
            pitch: (eye.y / distance).asin().clamp(ORBIT_MIN_PITCH, ORBIT_MAX_PITCH),
            distance: distance.clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE),
        }
    }

    pub fn eye(&self, target: Vec3) -> Vec3 {
        let (sin_p, cos_p) = self.pitch.sin_cos();
        let (sin_y, cos_y) = self.yaw.sin_cos();
        target + Vec3::new(cos_p * sin_y, sin_p, cos_p * cos_y) * self.distance
    }

    /// Dragging right swings the view left; dragging down raises the eye
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.yaw = crate::normalize_angle(self.yaw - dx * ORBIT_DRAG_SPEED);
        self.pitch = (self.pitch + dy * ORBIT_DRAG_SPEED).clamp(ORBIT_MIN_PITCH, ORBIT_MAX_PITCH);
    }

    /// Positive wheel delta moves away
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (delta * ORBIT_ZOOM_SPEED).exp())
            .clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub mode: CameraMode,
    pub orbit: Orbit,
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            mode: CameraMode::Orbit,
            orbit: Orbit::default(),
            eye: ORBIT_EYE,
            target: Vec3::ZERO,
            fov_y: 75f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 2000.0,
        };
        camera.resize(width, height);
        camera
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Track the game's camera toggle and the player boat
    pub fn update(&mut self, state: &GameState) {
        let mode = if state.camera_follow {
            CameraMode::Follow
        } else {
            CameraMode::Orbit
        };
        let switched = mode != self.mode;
        self.mode = mode;

        match mode {
            CameraMode::Orbit => {
                self.target = Vec3::ZERO;
                self.eye = self.orbit.eye(self.target);
            }
            CameraMode::Follow => {
                let Some(boat) = state.player() else {
                    return;
                };
                let boat_pos = boat.position();
                let eye = boat_pos
                    + facing(boat.transform.yaw) * FOLLOW_DISTANCE
                    + Vec3::Y * FOLLOW_HEIGHT;
                let target = boat_pos + Vec3::Y * 2.0;
                if switched {
                    self.eye = eye;
                    self.target = target;
                } else {
                    self.eye = self.eye.lerp(eye, FOLLOW_LERP);
                    self.target = self.target.lerp(target, FOLLOW_LERP);
                }
            }
        }
    }

    /// Pointer drag in pixels; only the orbit view responds
    pub fn drag(&mut self, dx: f32, dy: f32) {
        if self.mode == CameraMode::Orbit {
            self.orbit.drag(dx, dy);
            self.eye = self.orbit.eye(self.target);
        }
    }

    /// Mouse wheel; only the orbit view responds
    pub fn zoom(&mut self, delta: f32) {
        if self.mode == CameraMode::Orbit {
            self.orbit.zoom(delta);
            self.eye = self.orbit.eye(self.target);
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray from the eye through a pixel (origin top-left)
    pub fn screen_to_ray(&self, x: f32, y: f32, width: f32, height: f32) -> Ray {
        let ndc_x = 2.0 * x / width.max(1.0) - 1.0;
        let ndc_y = 1.0 - 2.0 * y / height.max(1.0);
        let inv = self.view_proj().inverse();

        let unproject = |z: f32| {
            let p = inv * Vec4::new(ndc_x, ndc_y, z, 1.0);
            p.truncate() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);
        Ray::new(near, far - near)
    }
}
