use crate::numerics::quaternion::Quaternion;
use nalgebra as na;

/// `y in R^16 = [r(3), v(3), omega(3), q(4), h(3)]`.
///
/// A flat vector rather than a struct-with-named-fields, because the
/// integrator and resampler both need to address components by flat
/// index when applying the componentwise tolerance test.
pub type StateVector = na::SVector<f64, 16>;

pub const IDX_R: usize = 0;
pub const IDX_V: usize = 3;
pub const IDX_OMEGA: usize = 6;
pub const IDX_Q: usize = 9;
pub const IDX_H: usize = 13;

pub fn pack(
    r: na::Vector3<f64>,
    v: na::Vector3<f64>,
    omega: na::Vector3<f64>,
    q: Quaternion,
    h: na::Vector3<f64>,
) -> StateVector {
    let mut y = StateVector::zeros();
    y.fixed_rows_mut::<3>(IDX_R).copy_from(&r);
    y.fixed_rows_mut::<3>(IDX_V).copy_from(&v);
    y.fixed_rows_mut::<3>(IDX_OMEGA).copy_from(&omega);
    y.fixed_rows_mut::<4>(IDX_Q).copy_from(&q.data);
    y.fixed_rows_mut::<3>(IDX_H).copy_from(&h);
    y
}

pub fn position(y: &StateVector) -> na::Vector3<f64> {
    y.fixed_rows::<3>(IDX_R).into_owned()
}

pub fn velocity(y: &StateVector) -> na::Vector3<f64> {
    y.fixed_rows::<3>(IDX_V).into_owned()
}

pub fn angular_velocity(y: &StateVector) -> na::Vector3<f64> {
    y.fixed_rows::<3>(IDX_OMEGA).into_owned()
}

pub fn attitude(y: &StateVector) -> Quaternion {
    Quaternion::from_vector4(y.fixed_rows::<4>(IDX_Q).into_owned())
}

pub fn wheel_momentum(y: &StateVector) -> na::Vector3<f64> {
    y.fixed_rows::<3>(IDX_H).into_owned()
}

/// Renormalizes the quaternion sub-vector in place. Called by the
/// integrator after every accepted step to counteract numerical drift of
/// `||q||` away from 1, rather than folding a correction into the
/// derivative function itself.
pub fn renormalize_attitude(y: &mut StateVector) {
    let q = attitude(y).normalize();
    y.fixed_rows_mut::<4>(IDX_Q).copy_from(&q.data);
}
