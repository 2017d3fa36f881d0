use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use showcase_scene::Primitive;
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle list, counter-clockwise front faces.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Tessellate a primitive.
pub fn build(primitive: &Primitive) -> MeshData {
    match *primitive {
        Primitive::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere(radius, width_segments.max(3), height_segments.max(2)),
        Primitive::Plane { width, height } => plane(width, height),
        Primitive::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } => torus(radius, tube, radial_segments.max(2), tubular_segments.max(3)),
    }
}

/// UV sphere. The seam column is duplicated so texture coordinates wrap.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let row = width_segments + 1;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();
            let (sin_theta, cos_theta) = (v * PI).sin_cos();
            let normal = Vec3::new(-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);
            mesh.vertices.push(Vertex {
                position: (normal * radius).to_array(),
                normal: normal.normalize_or(Vec3::Y).to_array(),
                uv: [u, 1.0 - v],
            });
        }
    }

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // Pole rows collapse to a single triangle per quad.
            if iy != 0 {
                mesh.indices.extend([a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend([b, c, d]);
            }
        }
    }
    mesh
}

/// Single-quad plane in the XY plane facing +Z.
pub fn plane(width: f32, height: f32) -> MeshData {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let vertex = |x: f32, y: f32, u: f32, v: f32| Vertex {
        position: [x, y, 0.0],
        normal: [0.0, 0.0, 1.0],
        uv: [u, v],
    };
    MeshData {
        vertices: vec![
            vertex(-hw, hh, 0.0, 1.0),
            vertex(hw, hh, 1.0, 1.0),
            vertex(-hw, -hh, 0.0, 0.0),
            vertex(hw, -hh, 1.0, 0.0),
        ],
        indices: vec![0, 2, 1, 2, 3, 1],
    }
}

/// Torus around the Z axis.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let row = tubular_segments + 1;

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32;
        let (sin_v, cos_v) = (v * TAU).sin_cos();
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32;
            let (sin_u, cos_u) = (u * TAU).sin_cos();
            let ring = radius + tube * cos_v;
            let position = Vec3::new(ring * cos_u, ring * sin_u, tube * sin_v);
            let center = Vec3::new(radius * cos_u, radius * sin_u, 0.0);
            mesh.vertices.push(Vertex {
                position: position.to_array(),
                normal: (position - center).normalize_or(Vec3::Z).to_array(),
                uv: [u, v],
            });
        }
    }

    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            mesh.indices.extend([a, b, d, b, c, d]);
        }
    }
    mesh
}
