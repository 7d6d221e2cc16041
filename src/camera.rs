use glam::{Quat, Vec3};
use std::f32::consts::PI;

use crate::core::controller::{Button, Controller};
use crate::environment::{Camera, Transform};

pub const CAMERA_SPEED: f32 = 20.0;
pub const CAMERA_ROTATION_SPEED: f32 = 1.5;
pub const FOV_STEP: f32 = 5.0;
pub const MIN_FIELD_OF_VIEW: f32 = 10.0;
pub const MAX_FIELD_OF_VIEW: f32 = 120.0;

/// Fly-camera state driving the environment camera.
///
/// Yaw 0 with pitch 0 looks down +Z; positive pitch looks up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraRig {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Transform whose local -Z axis is `forward()`
    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: Quat::from_rotation_y(self.yaw + PI) * Quat::from_rotation_x(self.pitch),
            scale: Vec3::ONE,
        }
    }

    /// Move and turn from held buttons; `None` when nothing is held
    pub fn update(&self, delta: f32, controller: &dyn Controller) -> Option<Self> {
        let axis = |positive: Button, negative: Button| -> f32 {
            match (controller.is_down(positive), controller.is_down(negative)) {
                (true, false) => 1.0,
                (false, true) => -1.0,
                _ => 0.0,
            }
        };

        let fwd = axis(Button::KeyW, Button::KeyS);
        let right_dir = axis(Button::KeyD, Button::KeyA);
        let up_dir = axis(Button::Space, Button::Shift);
        let yaw_dir = axis(Button::KeyQ, Button::KeyE);

        if fwd == 0.0 && right_dir == 0.0 && up_dir == 0.0 && yaw_dir == 0.0 {
            return None;
        }

        let displacement = (self.forward() * fwd + self.right() * right_dir + Vec3::Y * up_dir)
            * CAMERA_SPEED
            * delta;

        Some(Self {
            position: self.position + displacement,
            yaw: self.yaw + yaw_dir * CAMERA_ROTATION_SPEED * delta,
            pitch: self.pitch,
        })
    }

    /// Apply one frame of input to `camera`.
    ///
    /// The tracked transform is written only when the rig moved, so an idle
    /// camera never invalidates accumulation.
    pub fn drive(&mut self, camera: &mut Camera, delta: f32, controller: &dyn Controller) {
        if let Some(next) = self.update(delta, controller) {
            *self = next;
            camera.transform.set(self.transform());
        }

        let fov_dir = match (
            controller.just_pressed(Button::Plus),
            controller.just_pressed(Button::Minus),
        ) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        if fov_dir != 0.0 {
            camera.field_of_view = (camera.field_of_view + fov_dir * FOV_STEP)
                .clamp(MIN_FIELD_OF_VIEW, MAX_FIELD_OF_VIEW);
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 15.0, 60.0), PI, -0.2)
    }
}
