//! # Primitive Shape Generation
//!
//! Functions to generate the primitive shapes. All shapes are generated with
//! outward normals and texture coordinates in 0..1.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
/// Each face has its own four vertices so normals stay flat, and UV
/// coordinates cover the full 0..1 range per face.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    #[rustfmt::skip]
    let tex_coords = [
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.tex_coords = tex_coords.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|n| std::iter::repeat(*n).take(4))
        .collect();

    // Two counter-clockwise triangles per face
    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
///
/// Returns a sphere of radius 1.0 centered at the origin.
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32; // 0 to PI
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32; // 0 to 2*PI
            let x = sin_theta * phi.cos();
            let y = cos_theta;
            let z = sin_theta * phi.sin();

            data.vertices.push([x, y, z]);
            // Normal is same as position for unit sphere
            data.normals.push([x, y, z]);
            data.tex_coords.push([
                long as f32 / long_segs as f32,
                1.0 - lat as f32 / lat_segs as f32,
            ]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, second, first + 1]);
            data.indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    data
}

/// Generate a plane in the XZ plane
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `depth` - Depth of the plane (Z direction)
/// * `width_segments` - Number of subdivisions along width
/// * `depth_segments` - Number of subdivisions along depth
///
/// Returns a plane centered at the origin with normal pointing up (positive Y).
pub fn generate_plane(width: f32, depth: f32, width_segments: u32, depth_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let d_segs = depth_segments.max(1);

    for row in 0..=d_segs {
        let v = row as f32 / d_segs as f32;
        let pos_z = (0.5 - v) * depth;

        for col in 0..=w_segs {
            let u = col as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, 0.0, pos_z]);
            data.normals.push([0.0, 1.0, 0.0]);
            data.tex_coords.push([u, v]);
        }
    }

    // Counter-clockwise when viewed from above
    for row in 0..d_segs {
        for col in 0..w_segs {
            let i = row * (w_segs + 1) + col;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, i + 1, next_row]);
            data.indices.extend_from_slice(&[next_row, i + 1, next_row + 1]);
        }
    }

    data
}

/// Generate a capped cylinder standing on the XZ plane
///
/// # Arguments
/// * `radius` - Radius of the cylinder
/// * `height` - Height of the cylinder (along Y)
/// * `segments` - Number of circular segments
///
/// Returns a cylinder around the Y axis extending from y = 0 to y = height.
pub fn generate_cylinder(radius: f32, height: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);

    // Side
    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        let u = i as f32 / segs as f32;

        data.vertices.push([radius * cos_a, 0.0, radius * sin_a]);
        data.normals.push([cos_a, 0.0, sin_a]);
        data.tex_coords.push([u, 0.0]);

        data.vertices.push([radius * cos_a, height, radius * sin_a]);
        data.normals.push([cos_a, 0.0, sin_a]);
        data.tex_coords.push([u, 1.0]);
    }

    for i in 0..segs {
        let bottom_current = i * 2;
        let top_current = bottom_current + 1;
        let bottom_next = bottom_current + 2;
        let top_next = bottom_next + 1;

        data.indices
            .extend_from_slice(&[bottom_current, top_current, bottom_next]);
        data.indices
            .extend_from_slice(&[top_current, top_next, bottom_next]);
    }

    // Caps get their own rings so they keep flat normals
    add_cap(&mut data, radius, 0.0, -1.0, segs);
    add_cap(&mut data, radius, height, 1.0, segs);

    data
}

fn add_cap(data: &mut GeometryData, radius: f32, y: f32, normal_y: f32, segs: u32) {
    let center = data.vertices.len() as u32;
    data.vertices.push([0.0, y, 0.0]);
    data.normals.push([0.0, normal_y, 0.0]);
    data.tex_coords.push([0.5, 0.5]);

    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        data.vertices.push([radius * cos_a, y, radius * sin_a]);
        data.normals.push([0.0, normal_y, 0.0]);
        data.tex_coords.push([0.5 + 0.5 * cos_a, 0.5 + 0.5 * sin_a]);
    }

    for i in 0..segs {
        let current = center + 1 + i;
        let next = current + 1;
        if normal_y > 0.0 {
            data.indices.extend_from_slice(&[center, next, current]);
        } else {
            data.indices.extend_from_slice(&[center, current, next]);
        }
    }
}

/// Generate a torus lying in the XY plane
///
/// # Arguments
/// * `main_radius` - Distance from the center to the middle of the tube
/// * `tube_radius` - Radius of the tube
/// * `main_segments` - Number of segments around the ring
/// * `tube_segments` - Number of segments around the tube
///
/// Returns a torus centered at the origin whose axis of symmetry is Z.
pub fn generate_torus(
    main_radius: f32,
    tube_radius: f32,
    main_segments: u32,
    tube_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let main_segs = main_segments.max(3);
    let tube_segs = tube_segments.max(3);

    for i in 0..=main_segs {
        let u = i as f32 / main_segs as f32;
        let (sin_theta, cos_theta) = (u * 2.0 * PI).sin_cos();

        for j in 0..=tube_segs {
            let v = j as f32 / tube_segs as f32;
            let (sin_phi, cos_phi) = (v * 2.0 * PI).sin_cos();

            let ring = main_radius + tube_radius * cos_phi;
            data.vertices
                .push([ring * cos_theta, ring * sin_theta, tube_radius * sin_phi]);
            data.normals
                .push([cos_phi * cos_theta, cos_phi * sin_theta, sin_phi]);
            data.tex_coords.push([u, v]);
        }
    }

    for i in 0..main_segs {
        for j in 0..tube_segs {
            let first = i * (tube_segs + 1) + j;
            let second = first + tube_segs + 1;

            data.indices.extend_from_slice(&[first, second, first + 1]);
            data.indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "expected {}, got {}", b, a);
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);

        let (min, max) = cube.bounds();
        assert_eq!(min, [-0.5, -0.5, -0.5]);
        assert_eq!(max, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert_eq!(sphere.vertices.len(), 9 * 7);
        assert_eq!(sphere.triangle_count(), 8 * 6 * 2);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tex_coords.len());

        for v in &sphere.vertices {
            let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert_close(length, 1.0);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert!(plane.vertices.iter().all(|v| v[1] == 0.0));
        assert!(plane.normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));

        let (min, max) = plane.bounds();
        assert_eq!((min[0], max[0]), (-1.0, 1.0));
        assert_eq!((min[2], max[2]), (-1.0, 1.0));
    }

    #[test]
    fn test_cylinder_stands_on_origin() {
        let cylinder = generate_cylinder(1.0, 1.0, 16);
        let (min, max) = cylinder.bounds();
        assert_close(min[1], 0.0);
        assert_close(max[1], 1.0);
        assert_close(max[0], 1.0);
        assert_close(min[0], -1.0);

        // side quads plus two fans
        assert_eq!(cylinder.triangle_count(), 16 * 2 + 16 * 2);
    }

    #[test]
    fn test_cylinder_cap_normals_are_flat() {
        let cylinder = generate_cylinder(1.0, 2.0, 8);
        for (v, n) in cylinder.vertices.iter().zip(&cylinder.normals) {
            if n[1] != 0.0 {
                assert!(v[1] == 0.0 || v[1] == 2.0);
                assert_eq!(n[0], 0.0);
                assert_eq!(n[2], 0.0);
            }
        }
    }

    #[test]
    fn test_torus_generation() {
        let torus = generate_torus(1.0, 0.1, 12, 8);
        assert_eq!(torus.vertices.len(), 13 * 9);
        assert_eq!(torus.triangle_count(), 12 * 8 * 2);

        let (min, max) = torus.bounds();
        assert_close(max[0], 1.1);
        assert_close(min[2], -0.1);
        assert_close(max[2], 0.1);

        for (v, n) in torus.vertices.iter().zip(&torus.normals) {
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert_close(length, 1.0);
            let ring = (v[0] * v[0] + v[1] * v[1]).sqrt();
            assert!(ring >= 0.9 - 1e-5 && ring <= 1.1 + 1e-5);
        }
    }
}
