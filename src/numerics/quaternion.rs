use nalgebra as na;

#[cfg(test)]
use approx::AbsDiffEq;

/// Scalar-last quaternion: `(x, y, z, w)`, `w = cos(theta/2)`.
///
/// Represents a body-to-inertial rotation. `psi`/`xi`/the two product
/// operators follow Markley §2.87-2.88; see `mul_cross` and `mul_dot` for
/// why there are two distinct products instead of one overloaded `*`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub data: na::Vector4<f64>,
}

#[cfg(test)]
impl AbsDiffEq for Quaternion {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.data.abs_diff_eq(&other.data, epsilon)
    }
}

impl Quaternion {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Quaternion {
            data: na::Vector4::new(x, y, z, w),
        }
    }

    pub fn identity() -> Self {
        Quaternion::new(0.0, 0.0, 0.0, 1.0)
    }

    pub fn from_vector4(v: na::Vector4<f64>) -> Self {
        Quaternion { data: v }
    }

    /// Promote a 3-vector to a pure quaternion `(v, 0)`.
    pub fn from_vector3(v: &na::Vector3<f64>) -> Self {
        Quaternion::new(v[0], v[1], v[2], 0.0)
    }

    pub fn vector(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.data[0], self.data[1], self.data[2])
    }

    pub fn scalar(&self) -> f64 {
        self.data[3]
    }

    pub fn norm(&self) -> f64 {
        self.data.norm()
    }

    /// Returns identity when the quaternion has zero norm; never panics.
    pub fn normalize(&self) -> Self {
        let n = self.norm();
        if n == 0.0 {
            Quaternion::identity()
        } else {
            Quaternion::from_vector4(self.data / n)
        }
    }

    pub fn conj(&self) -> Self {
        Quaternion::new(-self.data[0], -self.data[1], -self.data[2], self.data[3])
    }

    pub fn inv(&self) -> Self {
        let n2 = self.data.norm_squared();
        let c = self.conj();
        if n2 == 0.0 {
            Quaternion::identity()
        } else {
            Quaternion::from_vector4(c.data / n2)
        }
    }

    /// Markley Eq. 2.87: Psi(q), a 4x3 matrix.
    fn psi(&self) -> na::Matrix4x3<f64> {
        let (x, y, z, w) = (self.data[0], self.data[1], self.data[2], self.data[3]);
        na::Matrix4x3::new(
            w, z, -y, //
            -z, w, x, //
            y, -x, w, //
            -x, -y, -z,
        )
    }

    /// Markley Eq. 2.88: Xi(q), a 4x3 matrix.
    fn xi(&self) -> na::Matrix4x3<f64> {
        let (x, y, z, w) = (self.data[0], self.data[1], self.data[2], self.data[3]);
        na::Matrix4x3::new(
            w, -z, y, //
            z, w, -x, //
            -y, x, w, //
            -x, -y, -z,
        )
    }

    /// `M_cross(q) = [Psi(q) | q]`, a 4x4 matrix used by the "⊗" product.
    fn m_cross(&self) -> na::Matrix4<f64> {
        let psi = self.psi();
        na::Matrix4::from_columns(&[
            psi.column(0).into_owned(),
            psi.column(1).into_owned(),
            psi.column(2).into_owned(),
            self.data,
        ])
    }

    /// `M_dot(q) = [Xi(q) | q]`, a 4x4 matrix used by the "⊙" product.
    fn m_dot(&self) -> na::Matrix4<f64> {
        let xi = self.xi();
        na::Matrix4::from_columns(&[
            xi.column(0).into_owned(),
            xi.column(1).into_owned(),
            xi.column(2).into_owned(),
            self.data,
        ])
    }

    /// Rotation matrix `R(q) = Xi(q)^T Psi(q)` (body -> inertial), Markley Eq. 2.129.
    pub fn to_rotation_matrix(&self) -> na::Matrix3<f64> {
        self.xi().transpose() * self.psi()
    }

    /// The "⊗" product: `q1 ⊗ q2 = M_cross(q1) * q2`.
    ///
    /// Distinct from `mul_dot` — using the wrong one for attitude kinematics
    /// flips the sign convention (see `crate::physics::attitude`).
    pub fn mul_cross(&self, other: &Quaternion) -> Self {
        Quaternion::from_vector4(self.m_cross() * other.data)
    }

    /// The "⊙" product: `q1 ⊙ q2 = M_dot(q1) * q2`. Required by the
    /// quaternion kinematic equation `qdot = 1/2 q ⊙ omega`.
    pub fn mul_dot(&self, other: &Quaternion) -> Self {
        Quaternion::from_vector4(self.m_dot() * other.data)
    }

    pub fn mul_cross_vec(&self, v: &na::Vector3<f64>) -> Self {
        self.mul_cross(&Quaternion::from_vector3(v))
    }

    pub fn mul_dot_vec(&self, v: &na::Vector3<f64>) -> Self {
        self.mul_dot(&Quaternion::from_vector3(v))
    }
}

impl std::ops::Add for Quaternion {
    type Output = Quaternion;
    fn add(self, rhs: Quaternion) -> Quaternion {
        Quaternion::from_vector4(self.data + rhs.data)
    }
}

impl std::ops::Mul<f64> for Quaternion {
    type Output = Quaternion;
    fn mul(self, scalar: f64) -> Quaternion {
        Quaternion::from_vector4(self.data * scalar)
    }
}

/// Spherical linear interpolation with shortest-arc sign fix and a linear
/// fallback for near-parallel quaternions (dot > 0.9995).
pub fn slerp(q0: &Quaternion, q1: &Quaternion, t: f64) -> Quaternion {
    let q0n = q0.normalize();
    let mut q1n = q1.normalize();
    let mut dot = q0n.data.dot(&q1n.data);

    if dot < 0.0 {
        q1n = Quaternion::from_vector4(-q1n.data);
        dot = -dot;
    }

    if dot > 0.9995 {
        return Quaternion::from_vector4(q0n.data * (1.0 - t) + q1n.data * t).normalize();
    }

    let theta = dot.acos();
    let sin_theta = theta.sin();
    let w0 = ((1.0 - t) * theta).sin() / sin_theta;
    let w1 = (t * theta).sin() / sin_theta;
    Quaternion::from_vector4(q0n.data * w0 + q1n.data * w1)
}

/// Piecewise SLERP of a quaternion keyframe sequence onto new sample times.
///
/// `t_keys` must be sorted ascending; `t_sampled` values are clamped to
/// `[t_keys[0], t_keys[last]]` before locating their bracketing segment.
pub fn slerp_array(t_sampled: &[f64], t_keys: &[f64], q_keys: &[Quaternion]) -> Vec<Quaternion> {
    assert_eq!(t_keys.len(), q_keys.len());
    if t_keys.len() == 1 {
        return vec![q_keys[0]; t_sampled.len()];
    }

    t_sampled
        .iter()
        .map(|&ts| {
            let clamped = ts.clamp(t_keys[0], t_keys[t_keys.len() - 1]);
            let idx = match t_keys.binary_search_by(|probe| probe.partial_cmp(&clamped).unwrap())
            {
                Ok(i) => i.min(t_keys.len() - 2),
                Err(i) => (i.max(1) - 1).min(t_keys.len() - 2),
            };
            let (t0, t1) = (t_keys[idx], t_keys[idx + 1]);
            let frac = if t1 > t0 {
                (clamped - t0) / (t1 - t0)
            } else {
                0.0
            };
            slerp(&q_keys[idx], &q_keys[idx + 1], frac)
        })
        .collect()
}

/// Numerically stable rotation-matrix-to-quaternion conversion, selecting
/// the largest of `{tr A, A00, A11, A22}` as the pivot. Markley Eq. 2.135.
pub fn rot_to_quat(a: &na::Matrix3<f64>) -> Quaternion {
    let tr = a.trace();
    let (a00, a11, a22) = (a[(0, 0)], a[(1, 1)], a[(2, 2)]);
    let m = tr.max(a00).max(a11).max(a22);

    if m == tr {
        let w = (1.0 + tr).sqrt() / 2.0;
        let x = (a[(2, 1)] - a[(1, 2)]) / (4.0 * w);
        let y = (a[(0, 2)] - a[(2, 0)]) / (4.0 * w);
        let z = (a[(1, 0)] - a[(0, 1)]) / (4.0 * w);
        Quaternion::new(x, y, z, w)
    } else if m == a00 {
        let x = (1.0 + 2.0 * a00 - tr).sqrt() / 2.0;
        let y = (a[(0, 1)] + a[(1, 0)]) / (4.0 * x);
        let z = (a[(0, 2)] + a[(2, 0)]) / (4.0 * x);
        let w = (a[(1, 2)] - a[(2, 1)]) / (4.0 * x);
        Quaternion::new(x, y, z, w)
    } else if m == a11 {
        let y = (1.0 + 2.0 * a11 - tr).sqrt() / 2.0;
        let x = (a[(0, 1)] + a[(1, 0)]) / (4.0 * y);
        let z = (a[(1, 2)] + a[(2, 1)]) / (4.0 * y);
        let w = (a[(0, 2)] - a[(2, 0)]) / (4.0 * y);
        Quaternion::new(x, y, z, w)
    } else {
        let z = (1.0 + 2.0 * a22 - tr).sqrt() / 2.0;
        let x = (a[(0, 2)] + a[(2, 0)]) / (4.0 * z);
        let y = (a[(1, 2)] + a[(2, 1)]) / (4.0 * z);
        let w = (a[(0, 1)] - a[(1, 0)]) / (4.0 * z);
        Quaternion::new(x, y, z, w)
    }
}

/// ZYX Euler angles `(roll, pitch, yaw)` from the rotation matrix of `q`.
pub fn quat_to_euler(q: &Quaternion) -> na::Vector3<f64> {
    let a = q.to_rotation_matrix();
    let pitch = (-a[(2, 0)]).asin();
    let yaw = a[(1, 0)].atan2(a[(0, 0)]);
    let roll = a[(2, 1)].atan2(a[(2, 2)]);
    na::Vector3::new(roll, pitch, yaw)
}

/// `qdot = 1/2 q ⊙ omega`, treating `omega` as a pure-vector quaternion.
/// The "⊙" product is mandatory here (Markley Eq. 3.20); "⊗" would flip
/// the sign convention for a body-to-inertial attitude.
pub fn quaternion_derivative(q: &Quaternion, omega_body: &na::Vector3<f64>) -> Quaternion {
    q.mul_dot_vec(omega_body) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    #[test_case(Quaternion::identity(); "identity")]
    #[test_case(Quaternion::new(0.2706, 0.2706, 0.0, 0.92388); "45 degree xy rotation")]
    #[test_case(Quaternion::new(0.0, 0.0, 0.7071, 0.7071); "90 degree z rotation")]
    fn mul_cross_with_inverse_is_identity(q: Quaternion) {
        let result = q.mul_cross(&q.inv());
        assert_abs_diff_eq!(result, Quaternion::identity(), epsilon = 1e-10);
    }

    #[test_case(Quaternion::identity(); "identity")]
    #[test_case(Quaternion::new(0.2706, 0.2706, 0.0, 0.92388); "45 degree xy rotation")]
    #[test_case(Quaternion::new(0.3, -0.1, 0.2, 0.9); "generic unit quaternion")]
    fn rotation_round_trip(q: Quaternion) {
        let q = q.normalize();
        let a = q.to_rotation_matrix();
        let recovered = rot_to_quat(&a);
        let matches_positive = (recovered.data - q.data).norm() < 1e-10;
        let matches_negative = (recovered.data + q.data).norm() < 1e-10;
        assert!(matches_positive || matches_negative);
    }

    #[test]
    fn euler_conversion_matches_single_axis_rotation() {
        let theta = 1.0_f64;
        let q = Quaternion::new(0.0, 0.0, (theta / 2.0).sin(), (theta / 2.0).cos());
        let euler = quat_to_euler(&q);
        assert_abs_diff_eq!(euler, na::Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn slerp_endpoints() {
        let q0 = Quaternion::new(0.0, 0.0, 0.0, 1.0);
        let q1 = Quaternion::new(0.0, 0.0, 0.7071, 0.7071);
        let at0 = slerp(&q0, &q1, 0.0);
        let at1 = slerp(&q0, &q1, 1.0);
        assert_abs_diff_eq!(at0, q0, epsilon = 1e-10);
        let matches_positive = (at1.data - q1.data).norm() < 1e-10;
        let matches_negative = (at1.data + q1.data).norm() < 1e-10;
        assert!(matches_positive || matches_negative);
    }

    #[test]
    fn slerp_sign_continuity_across_dense_keyframes() {
        let keys: Vec<Quaternion> = (0..8)
            .map(|i| {
                let theta = i as f64 * 0.4;
                Quaternion::new(0.0, 0.0, (theta / 2.0).sin(), (theta / 2.0).cos())
            })
            .collect();
        let t_keys: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let t_sampled: Vec<f64> = (0..71).map(|i| i as f64 * 0.1).collect();
        let sampled = slerp_array(&t_sampled, &t_keys, &keys);
        for pair in sampled.windows(2) {
            assert!(pair[0].data.dot(&pair[1].data) >= 0.0);
        }
    }

    #[test]
    fn normalize_zero_quaternion_returns_identity() {
        let zero = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert_abs_diff_eq!(zero.normalize(), Quaternion::identity(), epsilon = 1e-12);
    }
}
