use crate::{Quat, Vec3};

const UP_DOWN_LIMIT: f32 = 1.0;

/// Free-flying debug camera driven by accumulated Euler rotations.
#[derive(Clone, Copy, Debug)]
pub struct FreeCamera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Offset applied on reset, relative to the followed position.
    pub offset: Vec3,
    up_down: f32,
    left_right: f32,
}

impl FreeCamera {
    pub fn new(offset: Vec3) -> Self {
        Self {
            position: offset,
            rotation: Quat::IDENTITY,
            offset,
            up_down: 0.0,
            left_right: 0.0,
        }
    }

    #[inline]
    pub fn forward() -> Vec3 {
        Vec3::X
    }

    #[inline]
    pub fn right() -> Vec3 {
        Vec3::NEG_Y
    }

    #[inline]
    pub fn up() -> Vec3 {
        Vec3::Z
    }

    pub fn reset(&mut self, position: Vec3) {
        self.up_down = 0.0;
        self.left_right = 0.0;
        self.rotate(0.0, 0.0);
        self.position = position + self.offset;
    }

    /// Accumulate rotation in radians; pitch stays within +-1 rad.
    pub fn rotate(&mut self, up: f32, left: f32) {
        self.up_down = (self.up_down + up).clamp(-UP_DOWN_LIMIT, UP_DOWN_LIMIT);
        self.left_right += left;

        self.rotation = Quat::from_axis_angle(Self::up(), self.left_right)
            * Quat::from_axis_angle(Self::right(), self.up_down);
    }

    /// Move along the view direction; only the forward component of the delta is used.
    pub fn move_by(&mut self, delta: Vec3) {
        let forward = Self::forward() * Self::forward().dot(delta);
        self.position += self.rotation * forward;
    }

    pub fn pitch(&self) -> f32 {
        self.up_down
    }

    pub fn yaw(&self) -> f32 {
        self.left_right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FreeCamera::new(Vec3::ZERO);
        cam.rotate(0.8, 0.0);
        cam.rotate(0.8, 0.3);
        assert_eq!(cam.pitch(), 1.0);
        assert!((cam.yaw() - 0.3).abs() < 1e-6);
        cam.rotate(-5.0, 0.0);
        assert_eq!(cam.pitch(), -1.0);
    }

    #[test]
    fn move_ignores_sideways_component() {
        let mut cam = FreeCamera::new(Vec3::ZERO);
        cam.move_by(Vec3::new(2.0, 5.0, 7.0));
        assert!((cam.position - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn reset_clears_rotation_and_applies_offset() {
        let mut cam = FreeCamera::new(Vec3::new(0.0, 0.0, 2.0));
        cam.rotate(0.5, 1.0);
        cam.reset(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(cam.pitch(), 0.0);
        assert_eq!(cam.yaw(), 0.0);
        assert!((cam.position - Vec3::new(10.0, 0.0, 2.0)).length() < 1e-6);
        assert!(cam.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }
}
