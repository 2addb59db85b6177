//! Orbit/fly camera rig.
//!
//! Maintains eye/center/up and the derived view and projection matrices.
//! Motion operators are expressed against the camera's orthonormal basis:
//! `n = normalize(eye - center)`, `u = normalize(up × n)`, `v = n × u`.
//!
//! # Invariants
//! - Every mutating operator recomputes the view and combined transform
//!   before returning.
//! - Rotation operators preserve the eye-to-center distance.
//! - The up vector is only re-rotated when the line of sight comes within
//!   ~10 degrees of it, so casual panning never drifts the horizon.

use glam::{Mat4, Vec3};

/// Line-of-sight / up alignment threshold: cos(10 degrees).
const UP_FLIP_THRESHOLD: f32 = 0.985;

/// Camera state plus cached view/projection matrices.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub eye: Vec3,
    pub center: Vec3,
    pub up: Vec3,
    pub fovy: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,

    pub projection: Mat4,
    pub view: Mat4,
    /// projection * view, recomputed by every mutating operator.
    pub transform: Mat4,
}

impl CameraRig {
    pub fn new(eye: Vec3, center: Vec3, fovy: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        let mut rig = Self {
            eye,
            center,
            up: Vec3::Y,
            fovy,
            aspect,
            znear,
            zfar,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            transform: Mat4::IDENTITY,
        };
        rig.update_projection();
        rig.update_transform();
        rig
    }

    fn basis_n(&self) -> Vec3 {
        (self.eye - self.center).normalize()
    }

    fn basis_u(&self) -> Vec3 {
        self.up.cross(self.basis_n()).normalize()
    }

    fn basis_v(&self) -> Vec3 {
        let n = self.basis_n();
        n.cross(self.basis_u()).normalize()
    }

    /// Translate eye and center along the u axis.
    pub fn truck(&mut self, distance: f32) {
        let step = self.basis_u() * distance;
        self.eye += step;
        self.center += step;
        self.update_transform();
    }

    /// Translate eye and center along the v axis.
    pub fn pedestal(&mut self, distance: f32) {
        let step = self.basis_v() * distance;
        self.eye += step;
        self.center += step;
        self.update_transform();
    }

    /// Translate the eye along the n axis. The center stays put, so dollying
    /// changes the orbit radius.
    pub fn dolly(&mut self, distance: f32) {
        self.eye += self.basis_n() * distance;
        self.update_transform();
    }

    /// Rotate the center about the u axis around the eye.
    pub fn tilt(&mut self, angle: f32) {
        let axis = self.basis_u();
        self.rotate_center(angle, axis);
    }

    /// Rotate the center about the v axis around the eye.
    pub fn pan(&mut self, angle: f32) {
        let axis = self.basis_v();
        self.rotate_center(angle, axis);
    }

    /// Rotate the center (and always the up vector) about the n axis.
    pub fn cant(&mut self, angle: f32) {
        let axis = self.basis_n();
        let rotation = Mat4::from_axis_angle(axis, angle);
        self.center = self.eye + rotation.transform_vector3(self.center - self.eye);
        self.up = rotation.transform_vector3(self.up);
        self.update_transform();
    }

    /// Orbit: rotate the eye about the u axis around the fixed center.
    pub fn pitch(&mut self, angle: f32) {
        let axis = self.basis_u();
        self.rotate_eye(angle, axis);
    }

    /// Orbit: rotate the eye about the v axis around the fixed center.
    pub fn roll(&mut self, angle: f32) {
        let axis = self.basis_v();
        self.rotate_eye(angle, axis);
    }

    fn rotate_center(&mut self, angle: f32, axis: Vec3) {
        let n = self.basis_n();
        let rotation = Mat4::from_axis_angle(axis, angle);
        self.center = self.eye + rotation.transform_vector3(self.center - self.eye);
        if n.dot(self.up).abs() >= UP_FLIP_THRESHOLD {
            self.up = rotation.transform_vector3(self.up);
        }
        self.update_transform();
    }

    fn rotate_eye(&mut self, angle: f32, axis: Vec3) {
        let rotation = Mat4::from_axis_angle(axis, angle);
        self.eye = self.center + rotation.transform_vector3(self.eye - self.center);
        self.update_transform();
    }

    pub fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh_gl(self.fovy, self.aspect, self.znear, self.zfar);
        self.transform = self.projection * self.view;
    }

    pub fn update_transform(&mut self) {
        self.view = Mat4::look_at_rh(self.eye, self.center, self.up);
        self.transform = self.projection * self.view;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection();
    }
}

pub fn crate_info() -> &'static str {
    "lucent-camera v0.1.0"
}
