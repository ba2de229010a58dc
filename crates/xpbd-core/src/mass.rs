// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Body-space reference inertia tensors.
//!
//! Mesh-backed bodies treat every vertex as a point mass of `m / n`. For a
//! surface mesh this is a hollow-shell approximation; no volume integration
//! is performed.

use crate::math::{Mat3, Vec3};
use crate::mesh::Mesh;
use crate::shape::Shape;

/// Diagonal padding (per unit mass) added when an accumulated tensor is
/// singular, e.g. for collinear vertex sets.
pub const SINGULAR_INERTIA_PAD: f32 = 1e-3;

/// Inertia of `points` sharing `mass` equally: `Σ mᵢ (|rᵢ|² E − rᵢ rᵢᵀ)`.
pub fn point_cloud_inertia(points: &[Vec3], mass: f32) -> Mat3 {
    if points.is_empty() {
        return Mat3::ZERO;
    }
    let m = mass / points.len() as f32;
    points.iter().fold(Mat3::ZERO, |acc, r| {
        let diag = m * r.length_squared();
        acc + Mat3::from_diagonal(diag, diag, diag) - Mat3::outer(r, r).scale(m)
    })
}

/// Solid-sphere inertia `2/5 m r²`, shifted by the parallel-axis term when
/// the sphere is offset from the body origin.
pub fn sphere_inertia(mass: f32, radius: f32, center: &Vec3) -> Mat3 {
    let i = 0.4 * mass * radius * radius;
    let c2 = center.length_squared();
    Mat3::from_diagonal(i, i, i) + Mat3::from_diagonal(c2, c2, c2).scale(mass)
        - Mat3::outer(center, center).scale(mass)
}

/// Reference inertia for a body, preferring mesh vertices, then the shape,
/// then `m·E` when no geometry is available.
///
/// Singular results are padded with [`SINGULAR_INERTIA_PAD`] so the tensor
/// can always be inverted.
pub fn reference_inertia(mesh: Option<&Mesh>, shape: Option<&Shape>, mass: f32) -> Mat3 {
    let tensor = match (mesh.filter(|m| !m.is_empty()), shape) {
        (Some(mesh), _) => point_cloud_inertia(mesh.positions(), mass),
        (None, Some(Shape::Sphere { radius, center })) => sphere_inertia(mass, *radius, center),
        (None, Some(Shape::ConvexHull { vertices, .. })) => point_cloud_inertia(vertices, mass),
        (None, None) => Mat3::from_diagonal(mass, mass, mass),
    };
    if tensor.inverse().is_some() {
        tensor
    } else {
        let pad = mass.abs().max(1.0) * SINGULAR_INERTIA_PAD;
        tensor + Mat3::from_diagonal(pad, pad, pad)
    }
}
