//! Per-frame mesh generation. Every draw batch is rebuilt from simulation
//! state each frame and streamed into a fresh vertex buffer.

use glam::{Mat3, Mat4, Vec3, Vec4};

use super::vertex::Vertex;
use crate::sim::cutscene::{Debris, Particle};
use crate::sim::puzzle::AnamorphicPuzzle;

/// Model matrix from position, Euler rotation (degrees, X then Y then Z)
/// and scale.
pub fn model_matrix(position: Vec3, rotation_deg: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_x(rotation_deg.x.to_radians())
        * Mat4::from_rotation_y(rotation_deg.y.to_radians())
        * Mat4::from_rotation_z(rotation_deg.z.to_radians())
        * Mat4::from_scale(scale)
}

/// One unit-cube face: outward normal and the four corners (two triangles
/// as corner indices 0-1-2, 0-2-3). UVs span the face.
struct Face {
    normal: Vec3,
    corners: [Vec3; 4],
}

const FACES: [Face; 6] = [
    // +X / -X
    Face {
        normal: Vec3::X,
        corners: [
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
        ],
    },
    Face {
        normal: Vec3::NEG_X,
        corners: [
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, -0.5, -0.5),
        ],
    },
    // +Y / -Y
    Face {
        normal: Vec3::Y,
        corners: [
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.5, 0.5, -0.5),
        ],
    },
    Face {
        normal: Vec3::NEG_Y,
        corners: [
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, 0.5),
        ],
    },
    // +Z / -Z
    Face {
        normal: Vec3::Z,
        corners: [
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ],
    },
    Face {
        normal: Vec3::NEG_Z,
        corners: [
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
        ],
    },
];

const FACE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
const QUAD_ORDER: [usize; 6] = [0, 1, 2, 0, 2, 3];

fn push_face(out: &mut Vec<Vertex>, model: &Mat4, normal_mat: &Mat3, face: &Face, color: [f32; 4]) {
    let normal = (*normal_mat * face.normal).normalize_or(Vec3::Y);
    for &i in &QUAD_ORDER {
        let world = model.transform_point3(face.corners[i]);
        out.push(Vertex::new(
            world.to_array(),
            normal.to_array(),
            FACE_UVS[i],
            color,
        ));
    }
}

/// Full cuboid, all six faces.
pub fn cuboid(out: &mut Vec<Vertex>, model: &Mat4, color: [f32; 4]) {
    let normal_mat = Mat3::from_mat4(*model).inverse().transpose();
    for face in &FACES {
        push_face(out, model, &normal_mat, face, color);
    }
}

/// The two faces perpendicular to one local axis (0 = x sides, 1 = y
/// top/bottom, 2 = z front/back). Used to batch per-face textures.
pub fn cuboid_face_pair(out: &mut Vec<Vertex>, model: &Mat4, color: [f32; 4], axis: usize) {
    let normal_mat = Mat3::from_mat4(*model).inverse().transpose();
    let pair = &FACES[axis * 2..axis * 2 + 2];
    for face in pair {
        push_face(out, model, &normal_mat, face, color);
    }
}

/// Cuboid whose UVs come from the anamorphic projector, so the picture
/// only assembles from the projector viewpoint.
pub fn projected_cuboid(
    out: &mut Vec<Vertex>,
    model: &Mat4,
    color: [f32; 4],
    puzzle: &AnamorphicPuzzle,
) {
    let normal_mat = Mat3::from_mat4(*model).inverse().transpose();
    for face in &FACES {
        let normal = (normal_mat * face.normal).normalize_or(Vec3::Y);
        for &i in &QUAD_ORDER {
            let world = model.transform_point3(face.corners[i]);
            let uv = puzzle.projected_uv(world);
            out.push(Vertex::new(
                world.to_array(),
                normal.to_array(),
                uv.to_array(),
                color,
            ));
        }
    }
}

/// Latitude/longitude sphere.
pub fn uv_sphere(
    out: &mut Vec<Vertex>,
    center: Vec3,
    scale: Vec3,
    color: [f32; 4],
    stacks: u32,
    slices: u32,
) {
    use std::f32::consts::PI;
    let radius = scale * 0.5;

    let point = |stack: u32, slice: u32| -> (Vec3, Vec3, [f32; 2]) {
        let v = stack as f32 / stacks as f32;
        let u = slice as f32 / slices as f32;
        let phi = v * PI;
        let theta = u * 2.0 * PI;
        let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
        (center + n * radius, n, [u, v])
    };

    for stack in 0..stacks {
        for slice in 0..slices {
            let (p00, n00, uv00) = point(stack, slice);
            let (p10, n10, uv10) = point(stack + 1, slice);
            let (p01, n01, uv01) = point(stack, slice + 1);
            let (p11, n11, uv11) = point(stack + 1, slice + 1);

            out.push(Vertex::new(p00.to_array(), n00.to_array(), uv00, color));
            out.push(Vertex::new(p10.to_array(), n10.to_array(), uv10, color));
            out.push(Vertex::new(p11.to_array(), n11.to_array(), uv11, color));

            out.push(Vertex::new(p00.to_array(), n00.to_array(), uv00, color));
            out.push(Vertex::new(p11.to_array(), n11.to_array(), uv11, color));
            out.push(Vertex::new(p01.to_array(), n01.to_array(), uv01, color));
        }
    }
}

/// Planar projection matrix flattening geometry onto a plane as seen from
/// a point light: `M = dot(plane, light) * I - outer(light, plane)`.
pub fn shadow_matrix(light: Vec4, plane: Vec4) -> Mat4 {
    let d = plane.dot(light);
    let col = |j: usize| -> Vec4 {
        let mut c = -light * plane[j];
        c[j] += d;
        c
    };
    Mat4::from_cols(col(0), col(1), col(2), col(3))
}

/// Camera-facing quads for the explosion particles.
pub fn particle_quads(
    out: &mut Vec<Vertex>,
    particles: &[Particle],
    right: Vec3,
    up: Vec3,
    half_size: f32,
    limit: usize,
) {
    let normal = right.cross(up).normalize_or(Vec3::Y);
    for p in particles.iter().take(limit) {
        let color = [p.color.x, p.color.y, p.color.z, 1.0];
        let r = right * half_size;
        let u = up * half_size;
        let corners = [
            p.position - r - u,
            p.position + r - u,
            p.position + r + u,
            p.position - r + u,
        ];
        for &i in &QUAD_ORDER {
            out.push(Vertex::new(
                corners[i].to_array(),
                normal.to_array(),
                FACE_UVS[i],
                color,
            ));
        }
    }
}

/// One tumbling triangle shard per debris entry.
pub fn debris_triangles(out: &mut Vec<Vertex>, debris: &[Debris], limit: usize) {
    const SHARD: [Vec3; 3] = [
        Vec3::new(0.0, 0.5, 0.0),
        Vec3::new(-0.25, 0.0, 0.0),
        Vec3::new(0.25, 0.0, 0.0),
    ];
    for d in debris.iter().take(limit) {
        let model = model_matrix(d.position, d.orientation, d.scale);
        let color = [d.color.x, d.color.y, d.color.z, 1.0];
        for corner in SHARD {
            let world = model.transform_point3(corner);
            out.push(Vertex::new(
                world.to_array(),
                [0.0, 1.0, 0.0],
                [0.5, 0.5],
                color,
            ));
        }
    }
}

/// Inward-facing textured cube for the skybox, centered on the camera.
pub fn skybox(out: &mut Vec<Vertex>, center: Vec3, half: f32) {
    let model = model_matrix(center, Vec3::ZERO, Vec3::splat(half * 2.0));
    // Reuse the cuboid faces; the pipeline culls nothing so the inside
    // is visible, and the sky pass ignores lighting
    cuboid(out, &model, [1.0, 1.0, 1.0, 1.0]);
}

/// Crosshair overlay in clip space: two thin bars.
pub fn crosshair(out: &mut Vec<Vertex>, aspect: f32, color: [f32; 4]) {
    let (w, h) = (0.002, 0.02);
    let bars = [
        (w, h),            // vertical
        (h / aspect, w * aspect), // horizontal, aspect-corrected
    ];
    for (bw, bh) in bars {
        let corners = [
            Vec3::new(-bw, -bh, 0.0),
            Vec3::new(bw, -bh, 0.0),
            Vec3::new(bw, bh, 0.0),
            Vec3::new(-bw, bh, 0.0),
        ];
        for &i in &QUAD_ORDER {
            out.push(Vertex::new(
                corners[i].to_array(),
                [0.0, 0.0, 1.0],
                FACE_UVS[i],
                color,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_vertex_count() {
        let mut out = Vec::new();
        cuboid(&mut out, &Mat4::IDENTITY, [1.0; 4]);
        assert_eq!(out.len(), 36);
    }

    #[test]
    fn test_face_pair_covers_all_axes() {
        let mut all = Vec::new();
        for axis in 0..3 {
            cuboid_face_pair(&mut all, &Mat4::IDENTITY, [1.0; 4], axis);
        }
        assert_eq!(all.len(), 36);
    }

    #[test]
    fn test_cuboid_respects_scale() {
        let mut out = Vec::new();
        let model = model_matrix(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::new(4.0, 2.0, 2.0));
        cuboid(&mut out, &model, [1.0; 4]);
        let xs: Vec<f32> = out.iter().map(|v| v.position[0]).collect();
        let min = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((min - (-1.0)).abs() < 1e-5);
        assert!((max - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_shadow_matrix_flattens_to_plane() {
        // Light high above the floor plane y=0
        let m = shadow_matrix(Vec4::new(0.0, 30.0, 0.0, 1.0), Vec4::new(0.0, 1.0, 0.0, 0.0));
        let p = m.project_point3(Vec3::new(2.0, 5.0, -3.0));
        assert!(p.y.abs() < 1e-4);
        // Points already on the plane stay put
        let q = m.project_point3(Vec3::new(4.0, 0.0, 1.0));
        assert!((q - Vec3::new(4.0, 0.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let mut out = Vec::new();
        uv_sphere(&mut out, Vec3::new(1.0, 1.0, 1.0), Vec3::splat(2.0), [1.0; 4], 6, 8);
        assert_eq!(out.len(), 6 * 8 * 6);
        for v in &out {
            let p = Vec3::from_array(v.position) - Vec3::new(1.0, 1.0, 1.0);
            assert!((p.length() - 1.0).abs() < 1e-4);
        }
    }
}
