// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Float32 math helpers covering the linear algebra the kernel needs:
//! vectors, quaternions, 3×3 matrices for inertia work, and column-major 4×4
//! matrices for model transforms.
//!
//! All operations round to `f32`; no fused multiply-add is used so results
//! are reproducible across targets.

mod mat3;
mod mat4;
mod quat;
mod vec3;

pub use mat3::Mat3;
pub use mat4::Mat4;
pub use quat::Quat;
pub use vec3::Vec3;

/// Global epsilon used by math routines when detecting degenerate values.
pub const EPSILON: f32 = 1e-6;

/// Clamps `value` to the inclusive `[min, max]` range using float32 rounding.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    debug_assert!(min <= max, "invalid clamp range: {min} > {max}");
    value.max(min).min(max)
}

/// Returns `value` unless its magnitude is below `floor`, in which case the
/// floor is returned with `value`'s sign (positive for zero).
///
/// Used wherever the kernel divides by a length that may collapse to zero.
pub fn epsilon_floor(value: f32, floor: f32) -> f32 {
    if value.abs() >= floor {
        value
    } else if value < 0.0 {
        -floor
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_floor_preserves_sign() {
        assert_eq!(epsilon_floor(0.5, 1e-4), 0.5);
        assert_eq!(epsilon_floor(0.0, 1e-4), 1e-4);
        assert_eq!(epsilon_floor(-1e-9, 1e-4), -1e-4);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(2.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-2.0, 0.0, 1.0), 0.0);
    }
}
