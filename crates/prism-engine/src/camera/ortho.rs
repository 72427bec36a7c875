use glam::Mat4;

/// Orthographic camera spanning `[0, width] x [0, height]` in pixels.
///
/// The projection is recomputed on every [`Camera::update_viewport`] call and
/// depends only on the latest size.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    width: u32,
    height: u32,
    near: f32,
    far: f32,
    projection: Mat4,
}

impl Camera {
    pub fn new(near: f32, far: f32) -> Self {
        Self {
            width: 0,
            height: 0,
            near,
            far,
            projection: Mat4::IDENTITY,
        }
    }

    /// Stores the viewport and recomputes the projection.
    ///
    /// A zero extent is treated as 1 so the matrix stays finite.
    pub fn update_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.projection = Mat4::orthographic_rh(
            0.0,
            width.max(1) as f32,
            0.0,
            height.max(1) as f32,
            self.near,
            self.far,
        );
    }

    #[inline]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    #[inline]
    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;

    fn clip(camera: &Camera, x: f32, y: f32) -> Vec3 {
        let p = *camera.projection() * Vec4::new(x, y, 0.0, 1.0);
        p.truncate() / p.w
    }

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).abs().max_element() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn corners_map_to_opposite_clip_corners() {
        let mut camera = Camera::default();
        camera.update_viewport(2000, 1000);

        let lo = clip(&camera, 0.0, 0.0);
        let hi = clip(&camera, 2000.0, 1000.0);
        assert_close(Vec3::new(lo.x, lo.y, 0.0), Vec3::new(-1.0, -1.0, 0.0));
        assert_close(Vec3::new(hi.x, hi.y, 0.0), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn projection_depends_only_on_last_update() {
        let mut a = Camera::default();
        a.update_viewport(300, 200);
        a.update_viewport(640, 480);
        a.update_viewport(800, 600);

        let mut b = Camera::default();
        b.update_viewport(800, 600);

        assert_eq!(a.projection(), b.projection());
        assert_eq!(a.viewport(), (800, 600));
        assert_close(clip(&a, 800.0, 600.0).truncate().extend(0.0), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn zero_extent_stays_finite() {
        let mut camera = Camera::default();
        camera.update_viewport(0, 0);
        assert!(camera.projection().is_finite());
        assert_eq!(camera.viewport(), (0, 0));
    }

    #[test]
    fn fresh_camera_is_identity() {
        assert_eq!(*Camera::default().projection(), Mat4::IDENTITY);
    }
}
