use crate::constants::MU_EARTH;
use crate::models::spacecraft::InertiaTensor;
use nalgebra as na;

/// Specific orbital energy `E = 1/2 |v|^2 - mu/|r|`. Mass-independent:
/// the two-body model carries no spacecraft mass term.
pub fn specific_orbital_energy(r: &na::Vector3<f64>, v: &na::Vector3<f64>) -> f64 {
    0.5 * v.norm_squared() - MU_EARTH / r.magnitude()
}

/// Total angular momentum `J*omega + h`, conserved under zero external
/// torque regardless of inertia or initial wheel momentum.
pub fn total_angular_momentum(
    inertia: &InertiaTensor,
    omega: &na::Vector3<f64>,
    h: &na::Vector3<f64>,
) -> na::Vector3<f64> {
    inertia.matrix() * omega + h
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn specific_orbital_energy_matches_known_circular_orbit() {
        let r = na::Vector3::new(6871e3, 0.0, 0.0);
        let v = na::Vector3::new(0.0, 7610.0, 0.0);
        let e = specific_orbital_energy(&r, &v);
        assert!(e < 0.0);
        assert_abs_diff_eq!(e, -29_055_948.5, epsilon = 1.0);
    }

    #[test]
    fn total_angular_momentum_adds_wheel_contribution() {
        let inertia = InertiaTensor::from_diagonal(2.0, 2.0, 1.0).unwrap();
        let omega = na::Vector3::new(0.0, 0.0, 0.1);
        let h = na::Vector3::new(0.0, 0.0, 0.05);
        let l = total_angular_momentum(&inertia, &omega, &h);
        assert_abs_diff_eq!(l, na::Vector3::new(0.0, 0.0, 0.15), epsilon = 1e-12);
    }
}
