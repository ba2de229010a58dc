// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Built-in scenes and the meshes they use.

use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;
use xpbd_core::body::Body;
use xpbd_core::math::Vec3;
use xpbd_core::mesh::Mesh;
use xpbd_core::shape::Shape;
use xpbd_sim::{DistanceConstraint, GroundPlane, SimConfig, XpbdSystem};

/// Named scene the runner can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Two sphere meshes, one dropped onto the other, above the ground plane.
    Spheres,
    /// Two spheres meeting head-on in zero gravity.
    Collide,
    /// Boxes stacked on an immovable slab.
    Stack,
    /// A bob hanging from a fixed anchor by a distance constraint.
    Pendulum,
}

impl Scenario {
    /// Every scenario, in listing order.
    pub const ALL: [Self; 4] = [Self::Spheres, Self::Collide, Self::Stack, Self::Pendulum];

    /// Name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Spheres => "spheres",
            Self::Collide => "collide",
            Self::Stack => "stack",
            Self::Pendulum => "pendulum",
        }
    }

    /// One-line description for `xpbd list`.
    pub fn summary(self) -> &'static str {
        match self {
            Self::Spheres => "two 0.1 m sphere meshes falling onto the y = -0.1 ground",
            Self::Collide => "equal spheres meeting head-on without gravity",
            Self::Stack => "three boxes dropped onto a fixed slab",
            Self::Pendulum => "rigid distance constraint swinging a bob",
        }
    }

    /// Config used when the caller supplies none.
    pub fn default_config(self) -> SimConfig {
        match self {
            Self::Spheres => SimConfig {
                ground: Some(GroundPlane::default()),
                ..SimConfig::default()
            },
            Self::Collide => SimConfig {
                gravity: [0.0, 0.0, 0.0],
                damping: 1.0,
                restitution: 1.0,
                friction: 0.0,
                ..SimConfig::default()
            },
            Self::Stack => SimConfig::default(),
            Self::Pendulum => SimConfig {
                damping: 1.0,
                ..SimConfig::default()
            },
        }
    }

    /// Builds the scene into a fresh system.
    pub fn build(self, config: SimConfig) -> Result<XpbdSystem> {
        let mut sys = XpbdSystem::new(config)?;
        match self {
            Self::Spheres => {
                let mesh = Arc::new(uv_sphere(0.1, 20, 20));
                sys.add_object(Body::new(Vec3::ZERO, 1.0).with_mesh(Arc::clone(&mesh)))?;
                sys.add_object(Body::new(Vec3::new(0.1, 0.5, 0.0), 1.0).with_mesh(mesh))?;
            }
            Self::Collide => {
                let ball = Arc::new(Shape::sphere(0.1)?);
                sys.add_object(
                    Body::new(Vec3::new(-0.5, 0.0, 0.0), 1.0)
                        .with_shape(Arc::clone(&ball))
                        .with_linear_velocity(Vec3::UNIT_X),
                )?;
                sys.add_object(
                    Body::new(Vec3::new(0.5, 0.0, 0.0), 1.0)
                        .with_shape(ball)
                        .with_linear_velocity(-Vec3::UNIT_X),
                )?;
            }
            Self::Stack => {
                sys.add_object(
                    Body::new(Vec3::new(0.0, -0.5, 0.0), 0.0)
                        .with_shape(Arc::new(Shape::cuboid(2.0, 0.5, 2.0)?))
                        .fixed(),
                )?;
                let crate_shape = Arc::new(Shape::cuboid(0.1, 0.1, 0.1)?);
                let crate_mesh = Arc::new(cube(0.1));
                for level in 0..3u8 {
                    let y = 0.15 + f32::from(level) * 0.3;
                    sys.add_object(
                        Body::new(Vec3::new(0.0, y, 0.0), 1.0)
                            .with_shape(Arc::clone(&crate_shape))
                            .with_mesh(Arc::clone(&crate_mesh)),
                    )?;
                }
            }
            Self::Pendulum => {
                let anchor = sys.add_object(Body::new(Vec3::new(0.0, 1.0, 0.0), 0.0).fixed())?;
                let bob = sys.add_object(Body::new(Vec3::new(0.7, 1.0, 0.0), 1.0))?;
                sys.add_distance_constraint(DistanceConstraint::rigid(anchor, bob, 0.7)?)?;
            }
        }
        sys.initialize();
        Ok(sys)
    }
}

/// Latitude/longitude sphere: `stacks + 1` rings of `sectors` vertices.
pub fn uv_sphere(radius: f32, sectors: u32, stacks: u32) -> Mesh {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let mut positions = Vec::with_capacity(((stacks + 1) * sectors) as usize);
    for i in 0..=stacks {
        let phi = core::f32::consts::PI * i as f32 / stacks as f32;
        for j in 0..sectors {
            let theta = core::f32::consts::TAU * j as f32 / sectors as f32;
            positions.push(Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            ));
        }
    }
    let mut triangles = Vec::with_capacity((stacks * sectors * 2) as usize);
    for i in 0..stacks {
        for j in 0..sectors {
            let a = i * sectors + j;
            let b = i * sectors + (j + 1) % sectors;
            let c = a + sectors;
            let d = b + sectors;
            triangles.push([a, c, b]);
            triangles.push([b, c, d]);
        }
    }
    Mesh::new(positions, triangles)
}

/// Axis-aligned cube with the given half extent, twelve triangles.
pub fn cube(half: f32) -> Mesh {
    let mut positions = Vec::with_capacity(8);
    for &x in &[-half, half] {
        for &y in &[-half, half] {
            for &z in &[-half, half] {
                positions.push(Vec3::new(x, y, z));
            }
        }
    }
    // vertex index = 4·ix + 2·iy + iz
    let triangles = vec![
        [0, 1, 3],
        [0, 3, 2],
        [4, 6, 7],
        [4, 7, 5],
        [0, 4, 5],
        [0, 5, 1],
        [2, 3, 7],
        [2, 7, 6],
        [0, 2, 6],
        [0, 6, 4],
        [1, 5, 7],
        [1, 7, 3],
    ];
    Mesh::new(positions, triangles)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sphere_mesh_has_expected_counts() {
        let mesh = uv_sphere(0.1, 20, 20);
        assert_eq!(mesh.positions().len(), 21 * 20);
        assert_eq!(mesh.triangles().len(), 20 * 20 * 2);
        assert!(mesh
            .positions()
            .iter()
            .all(|p| (p.length() - 0.1).abs() < 1e-5));
    }

    #[test]
    fn cube_indices_are_in_range() {
        let mesh = cube(0.5);
        assert_eq!(mesh.positions().len(), 8);
        assert!(mesh.triangles().iter().flatten().all(|&i| i < 8));
    }

    #[test]
    fn every_scenario_builds() {
        for scenario in Scenario::ALL {
            let sys = scenario.build(scenario.default_config()).unwrap();
            assert!(sys.store().len() >= 2, "{}", scenario.name());
        }
    }
}
