/*!
Crude smoothed-particle interaction for water particles.

This is a visual effect, not a fluid solver: one explicit pass per tick computes a density for
each particle from its neighbors, turns it into a pressure, and sums pressure and viscosity
accelerations. The caller adds `acceleration * dt` to each particle's velocity and leaves
position integration to the rigid-body engine.

Kernels (Müller et al. 2003):
- density: poly6, `315 / (64 pi h^9) * (h^2 - r^2)^3`
- pressure: spiky gradient, `45 / (pi h^6) * (h - r)^2` along the separation
- viscosity: `45 / (pi h^6) * (h - r)` on the velocity difference

Rules
- Only neighbors strictly closer than `h` contribute.
- A particle is never its own neighbor, so an isolated particle feels nothing.
- Each particle's mass is `rest_density * h^3`.
*/

use std::f32::consts::PI;

use crate::{
    constants::{SPH_REST_DENSITY, SPH_SMOOTHING_RADIUS, SPH_STIFFNESS, SPH_VISCOSITY},
    types::Vec3,
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SphParams {
    pub smoothing_radius: f32,
    pub rest_density: f32,
    pub viscosity: f32,
    pub stiffness: f32,
}

impl Default for SphParams {
    fn default() -> Self {
        Self {
            smoothing_radius: SPH_SMOOTHING_RADIUS,
            rest_density: SPH_REST_DENSITY,
            viscosity: SPH_VISCOSITY,
            stiffness: SPH_STIFFNESS,
        }
    }
}

impl SphParams {
    #[inline]
    pub fn particle_mass(&self) -> f32 {
        self.rest_density * self.smoothing_radius.powi(3)
    }
}

/// Per-particle acceleration for one step. `positions` and `velocities` are parallel slices.
pub fn sph_accelerations(positions: &[Vec3], velocities: &[Vec3], params: &SphParams) -> Vec<Vec3> {
    debug_assert_eq!(positions.len(), velocities.len());

    let n = positions.len().min(velocities.len());
    let h = params.smoothing_radius;
    if n == 0 || h <= 0.0 {
        return vec![Vec3::zeros(); n];
    }

    let mass = params.particle_mass();
    let h2 = h * h;
    let poly6 = 315.0 / (64.0 * PI * h.powi(9));
    let grad = 45.0 / (PI * h.powi(6));

    // Pass 1: density and pressure.
    let mut density = vec![0.0_f32; n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let r2 = (positions[i] - positions[j]).norm_squared();
            if r2 < h2 {
                density[i] += mass * poly6 * (h2 - r2).powi(3);
            }
        }
    }
    let pressure: Vec<f32> = density
        .iter()
        .map(|rho| params.stiffness * (rho - params.rest_density))
        .collect();

    // Pass 2: accelerations.
    let mut accel = vec![Vec3::zeros(); n];
    for i in 0..n {
        if density[i] <= 0.0 {
            continue;
        }
        let mut force = Vec3::zeros();
        for j in 0..n {
            if i == j {
                continue;
            }
            let sep = positions[i] - positions[j];
            let r = sep.norm();
            if r >= h || density[j] <= 0.0 {
                continue;
            }

            if r > f32::EPSILON {
                let push = mass * (pressure[i] + pressure[j]) / (2.0 * density[j]) * grad * (h - r).powi(2);
                force += sep / r * push;
            }

            let dv = velocities[j] - velocities[i];
            force += dv * (params.viscosity * mass / density[j] * grad * (h - r));
        }
        accel[i] = force / density[i];
    }

    accel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_particle_feels_nothing() {
        let acc = sph_accelerations(&[Vec3::zeros()], &[Vec3::new(1.0, 0.0, 0.0)], &SphParams::default());
        assert_eq!(acc, vec![Vec3::zeros()]);
    }

    #[test]
    fn particles_beyond_smoothing_radius_do_not_interact() {
        let params = SphParams::default();
        let pos = [Vec3::zeros(), Vec3::new(params.smoothing_radius, 0.0, 0.0)];
        let vel = [Vec3::zeros(), Vec3::new(0.0, 5.0, 0.0)];
        let acc = sph_accelerations(&pos, &vel, &params);
        assert!(acc.iter().all(|a| *a == Vec3::zeros()));
    }

    #[test]
    fn compressed_pair_pushes_apart_symmetrically() {
        let params = SphParams::default();
        // Close enough that density exceeds rest density (positive pressure).
        let pos = [Vec3::zeros(), Vec3::new(0.01, 0.0, 0.0)];
        let vel = [Vec3::zeros(); 2];
        let acc = sph_accelerations(&pos, &vel, &params);

        assert!(acc[0].x < 0.0, "{:?}", acc[0]);
        assert!(acc[1].x > 0.0, "{:?}", acc[1]);
        assert!((acc[0] + acc[1]).norm() < 1.0e-3 * acc[0].norm());
    }

    #[test]
    fn viscosity_drags_velocities_together() {
        let params = SphParams {
            stiffness: 0.0,
            ..SphParams::default()
        };
        let pos = [Vec3::zeros(), Vec3::new(0.05, 0.0, 0.0)];
        let vel = [Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0)];
        let acc = sph_accelerations(&pos, &vel, &params);

        // With no pressure, only the velocity difference matters.
        assert!(acc[0].y < 0.0);
        assert!(acc[1].y > 0.0);
    }
}
