use crate::error::SimError;
use nalgebra as na;

/// Principal-axis inertia tensor: diagonal, strictly positive entries.
/// `inverse` is precomputed once at construction since Euler's equations
/// need `J^-1` on every derivative evaluation.
#[derive(Debug, Clone, Copy)]
pub struct InertiaTensor {
    diagonal: na::Vector3<f64>,
    matrix: na::Matrix3<f64>,
    inverse: na::Matrix3<f64>,
}

impl InertiaTensor {
    pub fn from_diagonal(jxx: f64, jyy: f64, jzz: f64) -> Result<Self, SimError> {
        if jxx <= 0.0 || jyy <= 0.0 || jzz <= 0.0 {
            return Err(SimError::ConfigInvalid(format!(
                "inertia entries must be strictly positive, got [{jxx}, {jyy}, {jzz}]"
            )));
        }
        let diagonal = na::Vector3::new(jxx, jyy, jzz);
        let matrix = na::Matrix3::from_diagonal(&diagonal);
        let inverse = na::Matrix3::from_diagonal(&na::Vector3::new(
            1.0 / jxx,
            1.0 / jyy,
            1.0 / jzz,
        ));
        Ok(InertiaTensor {
            diagonal,
            matrix,
            inverse,
        })
    }

    pub fn matrix(&self) -> &na::Matrix3<f64> {
        &self.matrix
    }

    pub fn inverse(&self) -> &na::Matrix3<f64> {
        &self.inverse
    }

    pub fn diagonal(&self) -> na::Vector3<f64> {
        self.diagonal
    }
}

/// Spacecraft shape, used only by the visualizer (not part of the dynamics).
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub lx: f64,
    pub ly: f64,
    pub lz: f64,
}
