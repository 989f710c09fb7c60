//! Camera, projection and the camera uniform.
//!
//! The camera never rotates: it always looks down -Z with +Y up, only its
//! position changes (the driver slides it along X). The projection owns the
//! viewport size so that its aspect ratio cannot drift from the surface size.

use cgmath::{Matrix4, Point3, Rad, Vector3};
use wgpu::util::DeviceExt;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P) -> Self {
        Self {
            position: position.into(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, -Vector3::unit_z(), Vector3::unit_y())
    }
}

/// Perspective projection tied to the current viewport size.
#[derive(Clone, Debug)]
pub struct Projection {
    width: u32,
    height: u32,
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Apply a new viewport size.
    ///
    /// Returns `false` without touching anything when the size is unchanged or
    /// one of the dimensions is zero (minimised window).
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.aspect = width as f32 / height as f32;
        true
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view: Matrix4::identity().into(),
            proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view = camera.calc_matrix().into();
        self.proj = projection.calc_matrix().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera: uniform buffer and its bind group.
///
/// The camera itself belongs to the scene state; this only mirrors it.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: &Camera, projection: &Projection) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        self.uniform.update_view_proj(camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Transform, Vector4};

    #[test]
    fn resize_keeps_aspect_in_sync() {
        let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
        assert!(projection.resize(1920, 1080));
        assert_eq!(projection.aspect(), 1920_f32 / 1080_f32);
        assert_eq!(projection.size(), (1920, 1080));
    }

    #[test]
    fn resize_with_same_size_is_a_noop() {
        let mut projection = Projection::new(640, 480, Deg(75.0), 0.1, 1000.0);
        let before = projection.calc_matrix();
        assert!(!projection.resize(640, 480));
        assert_eq!(projection.calc_matrix(), before);
        assert_eq!(projection.size(), (640, 480));
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut projection = Projection::new(640, 480, Deg(75.0), 0.1, 1000.0);
        assert!(!projection.resize(0, 480));
        assert!(!projection.resize(640, 0));
        assert_eq!(projection.aspect(), 640_f32 / 480_f32);
    }

    #[test]
    fn camera_looks_down_negative_z() {
        let camera = Camera::new((0.0, 0.0, 5.0));
        let origin_in_view = camera
            .calc_matrix()
            .transform_point(Point3::new(0.0, 0.0, 0.0));
        assert!((origin_in_view.z + 5.0).abs() < 1e-6);
        assert!(origin_in_view.x.abs() < 1e-6);
    }

    #[test]
    fn moving_camera_along_x_does_not_rotate_view() {
        let mut camera = Camera::new((0.0, 0.0, 5.0));
        camera.position.x += 1.0;
        let m = camera.calc_matrix();
        let dir = m * Vector4::new(0.0, 0.0, -1.0, 0.0);
        assert!((dir.z + 1.0).abs() < 1e-6);
        assert!(dir.x.abs() < 1e-6);
    }
}
