use super::attitude::angular_acceleration;
use super::gravity::gravity_acceleration;
use crate::control::{control_torque, ControlPolicy};
use crate::models::spacecraft::InertiaTensor;
use crate::models::state::{self, StateVector};
use crate::numerics::quaternion::quaternion_derivative;

/// Builds the state-derivative function `f(t, y) -> ydot` for a given
/// inertia tensor and control policy. Pure and allocation-free on the
/// hot path: no global state, no heap traffic per call.
pub struct Dynamics {
    pub inertia: InertiaTensor,
    pub control: ControlPolicy,
}

impl Dynamics {
    pub fn new(inertia: InertiaTensor, control: ControlPolicy) -> Self {
        Dynamics { inertia, control }
    }

    /// `t` is unused (the model is time-invariant) but kept in the
    /// signature for symmetry with the integrator's generic interface.
    pub fn derivative(&self, _t: f64, y: &StateVector) -> StateVector {
        let r = state::position(y);
        let v = state::velocity(y);
        let omega = state::angular_velocity(y);
        let q = state::attitude(y);
        let h = state::wheel_momentum(y);

        let l_c = control_torque(&self.control, &q, &omega);

        let r_dot = v;
        let v_dot = gravity_acceleration(&r);
        let omega_dot = angular_acceleration(&self.inertia, &omega, &h, &l_c);
        let q_dot = quaternion_derivative(&q, &omega);
        let h_dot = -l_c;

        state::pack(r_dot, v_dot, omega_dot, q_dot, h_dot)
    }
}
