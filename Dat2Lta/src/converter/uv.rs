//! Texture space reconstruction
//!
//! Compiled worlds only keep per-vertex UVs. The editor instead stores a
//! texture origin and two scaled axes (O, P, Q) per polygon; this recovers
//! them from one triangle and the texture's pixel size.

#![allow(clippy::cast_precision_loss)]

use glam::{Vec2, Vec3};

const DEGENERATE_AREA: f32 = 1e-10;
const MIN_AXIS_LENGTH: f32 = 1e-8;

/// Origin and U/V axes used when the texture size is unknown.
pub const UNMAPPED_SPACE: (Vec3, Vec3, Vec3) = (Vec3::ZERO, Vec3::X, Vec3::Z);

/// Signed double area of the 2D triangle `a b c`.
fn area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// Weights of `t0 t1 t2` that produce `p`; degenerate triangles give `[1, 0, 0]`.
fn barycentric(t: [Vec2; 3], p: Vec2) -> Vec3 {
    let n = area(t[0], t[1], t[2]);
    if n.abs() < DEGENERATE_AREA {
        return Vec3::X;
    }
    let u = area(t[1], t[2], p) / n;
    let v = area(t[2], t[0], p) / n;
    Vec3::new(u, v, 1.0 - u - v)
}

fn blend(weights: Vec3, positions: [Vec3; 3]) -> Vec3 {
    positions[0] * weights.x + positions[1] * weights.y + positions[2] * weights.z
}

/// Texture origin and axes for a triangle.
///
/// `width`/`height` are the texture's pixel size; either being zero yields
/// [`UNMAPPED_SPACE`].
#[must_use]
pub fn texture_space(positions: [Vec3; 3], uvs: [Vec2; 3], width: u32, height: u32) -> (Vec3, Vec3, Vec3) {
    if width == 0 || height == 0 {
        return UNMAPPED_SPACE;
    }

    // Texture V runs opposite to the editor's Q axis
    let t = uvs.map(|uv| Vec2::new(uv.x, -uv.y));
    let origin = blend(barycentric(t, Vec2::ZERO), positions);
    let p = blend(barycentric(t, Vec2::X), positions) - origin;
    let q = blend(barycentric(t, Vec2::Y), positions) - origin;

    let p_len = p.length();
    let q_len = q.length();
    let tp = if p_len > MIN_AXIS_LENGTH { width as f32 / p_len } else { 1.0 };
    let tq = if q_len > MIN_AXIS_LENGTH { height as f32 / q_len } else { 1.0 };

    let p = if p_len > MIN_AXIS_LENGTH { p / p_len } else { Vec3::X };
    let q = if q_len > MIN_AXIS_LENGTH { q / q_len } else { Vec3::Y };

    let r = q.cross(p);
    if r.length() < MIN_AXIS_LENGTH {
        return UNMAPPED_SPACE;
    }
    let pn = r.cross(q).normalize();
    let qn = p.cross(r).normalize();

    let p_final = pn * tp / p.dot(pn);
    let q_final = -(qn * tq / q.dot(qn));
    (origin, p_final, q_final)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_unknown_size_is_unmapped() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let uvs = [Vec2::ZERO, Vec2::X, Vec2::Y];
        assert_eq!(texture_space(positions, uvs, 0, 64), UNMAPPED_SPACE);
        assert_eq!(texture_space(positions, uvs, 64, 0), UNMAPPED_SPACE);
    }

    #[test]
    fn test_axis_aligned_quad() {
        // 64 units of world per full texture repeat along X and Y
        let positions = [Vec3::ZERO, Vec3::new(64.0, 0.0, 0.0), Vec3::new(0.0, 64.0, 0.0)];
        let uvs = [Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let (o, p, q) = texture_space(positions, uvs, 64, 64);

        assert!(approx(o, Vec3::ZERO));
        // one pixel per world unit along X
        assert!(approx(p, Vec3::X));
        assert!(approx(q, Vec3::Y));
    }

    #[test]
    fn test_degenerate_uvs_do_not_produce_nan() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let uvs = [Vec2::ZERO; 3];
        let (o, p, q) = texture_space(positions, uvs, 32, 32);
        assert!(o.is_finite() && p.is_finite() && q.is_finite());
    }
}
