//! Quaternion ↔ intrinsic XYZ Euler conversion.
//!
//! Quaternions are `(x, y, z, w)` in `f32`; angles are radians in `f64` so that
//! repeated decompose/recompose cycles do not drift.

/// Euler triple `[x, y, z]`, intrinsic XYZ order.
pub type Euler = [f64; 3];

// |m13| above this is treated as gimbal lock.
const GIMBAL_EPS: f64 = 1.0 - 1e-12;

#[inline]
fn normalize(q: [f32; 4]) -> [f64; 4] {
    let q = [q[0] as f64, q[1] as f64, q[2] as f64, q[3] as f64];
    let len2 = q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3];
    if len2 > 0.0 {
        let inv = len2.sqrt().recip();
        [q[0] * inv, q[1] * inv, q[2] * inv, q[3] * inv]
    } else {
        [0.0, 0.0, 0.0, 1.0]
    }
}

/// Decompose a quaternion into intrinsic XYZ Euler angles.
pub fn to_euler(q: [f32; 4]) -> Euler {
    let [x, y, z, w] = normalize(q);

    // Rotation matrix entries used by the XYZ decomposition.
    let m11 = 1.0 - 2.0 * (y * y + z * z);
    let m12 = 2.0 * (x * y - w * z);
    let m13 = 2.0 * (x * z + w * y);
    let m22 = 1.0 - 2.0 * (x * x + z * z);
    let m23 = 2.0 * (y * z - w * x);
    let m32 = 2.0 * (y * z + w * x);
    let m33 = 1.0 - 2.0 * (x * x + y * y);

    let ey = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < GIMBAL_EPS {
        [(-m23).atan2(m33), ey, (-m12).atan2(m11)]
    } else {
        [m32.atan2(m22), ey, 0.0]
    }
}

/// Compose a quaternion from intrinsic XYZ Euler angles.
pub fn from_euler(e: Euler) -> [f32; 4] {
    let (s1, c1) = (e[0] * 0.5).sin_cos();
    let (s2, c2) = (e[1] * 0.5).sin_cos();
    let (s3, c3) = (e[2] * 0.5).sin_cos();

    [
        (s1 * c2 * c3 + c1 * s2 * s3) as f32,
        (c1 * s2 * c3 - s1 * c2 * s3) as f32,
        (c1 * c2 * s3 + s1 * s2 * c3) as f32,
        (c1 * c2 * c3 - s1 * s2 * s3) as f32,
    ]
}

/// Angle between two rotations, sign-insensitive.
pub fn angular_distance(a: [f32; 4], b: [f32; 4]) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let dot = (a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]).abs();
    2.0 * dot.min(1.0).acos()
}

/// Decompose every sample of a flat quaternion buffer.
pub fn eulers_from_values(values: &[f32]) -> Vec<Euler> {
    values
        .chunks_exact(4)
        .map(|q| to_euler([q[0], q[1], q[2], q[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn identity_is_zero() {
        assert_eq!(to_euler([0.0, 0.0, 0.0, 1.0]), [0.0, 0.0, 0.0]);
        assert_eq!(from_euler([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn single_axis() {
        let q = from_euler([0.3, 0.0, 0.0]);
        let e = to_euler(q);
        assert!((e[0] - 0.3).abs() < 1e-6);
        assert!(e[1].abs() < 1e-6 && e[2].abs() < 1e-6);
    }

    #[test]
    fn gimbal_lock_round_trips() {
        let q = from_euler([0.4, FRAC_PI_2, 0.0]);
        let back = from_euler(to_euler(q));
        assert!(angular_distance(q, back) < 1e-5);
    }

    #[test]
    fn renormalizes_input() {
        let q = from_euler([0.1, 0.2, 0.3]);
        let scaled = [q[0] * 3.0, q[1] * 3.0, q[2] * 3.0, q[3] * 3.0];
        let e = to_euler(scaled);
        assert!((e[0] - 0.1).abs() < 1e-6);
        assert!((e[1] - 0.2).abs() < 1e-6);
        assert!((e[2] - 0.3).abs() < 1e-6);
    }
}
