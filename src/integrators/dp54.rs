use crate::error::SimError;
use crate::models::state::{self, StateVector};
use crate::physics::dynamics::Dynamics;

// Dormand-Prince 5(4) Butcher tableau.
const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

const A2: [f64; 1] = [1.0 / 5.0];
const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
const A4: [f64; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
const A5: [f64; 4] = [
    19372.0 / 6561.0,
    -25360.0 / 2187.0,
    64448.0 / 6561.0,
    -212.0 / 729.0,
];
const A6: [f64; 5] = [
    9017.0 / 3168.0,
    -355.0 / 33.0,
    46732.0 / 5247.0,
    49.0 / 176.0,
    -5103.0 / 18656.0,
];
const A7: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];

// 5th-order solution weights (same as A7, FSAL) and 4th-order weights for
// the embedded error estimate.
const B5: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];
const B4: [f64; 7] = [
    5179.0 / 57600.0,
    0.0,
    7571.0 / 16695.0,
    393.0 / 640.0,
    -92097.0 / 339200.0,
    187.0 / 2100.0,
    1.0 / 40.0,
];

const MIN_STEP: f64 = 1e-10;
const SAFETY: f64 = 0.9;
const MAX_GROWTH: f64 = 5.0;
const MIN_SHRINK: f64 = 0.2;

/// Adaptive-step Dormand-Prince 5(4) integrator with componentwise mixed
/// tolerance and post-step quaternion renormalization.
///
/// Returns `(t, y)` where `y[k]` is the state at `t[k]`.
pub fn compute_states(
    dynamics: &Dynamics,
    y0: StateVector,
    t_max: f64,
    rtol: f64,
    atol: f64,
) -> Result<(Vec<f64>, Vec<StateVector>), SimError> {
    let mut t = 0.0_f64;
    let mut y = y0;
    let mut h = (t_max / 100.0).max(MIN_STEP);

    let mut ts = vec![t];
    let mut ys = vec![y];

    while t < t_max {
        if t + h > t_max {
            h = t_max - t;
        }

        let (y_high, y_low) = step(dynamics, t, &y, h);
        let err = error_norm(&y_high, &y_low, rtol, atol);

        if err <= 1.0 {
            t += h;
            let mut y_next = y_high;
            state::renormalize_attitude(&mut y_next);
            y = y_next;
            ts.push(t);
            ys.push(y);
        }

        let growth = if err == 0.0 {
            MAX_GROWTH
        } else {
            (SAFETY * err.powf(-0.2)).clamp(MIN_SHRINK, MAX_GROWTH)
        };
        h *= growth;

        if h < MIN_STEP {
            return Err(SimError::IntegrationDiverged(format!(
                "step size collapsed below floor {MIN_STEP} at t={t}"
            )));
        }
    }

    Ok((ts, ys))
}

fn step(
    dynamics: &Dynamics,
    t: f64,
    y: &StateVector,
    h: f64,
) -> (StateVector, StateVector) {
    let y0 = *y;
    let k1 = dynamics.derivative(t + C[0] * h, &y0);
    let k2 = dynamics.derivative(t + C[1] * h, &(y0 + k1 * (h * A2[0])));
    let k3 = dynamics.derivative(
        t + C[2] * h,
        &(y0 + k1 * (h * A3[0]) + k2 * (h * A3[1])),
    );
    let k4 = dynamics.derivative(
        t + C[3] * h,
        &(y0 + k1 * (h * A4[0]) + k2 * (h * A4[1]) + k3 * (h * A4[2])),
    );
    let k5 = dynamics.derivative(
        t + C[4] * h,
        &(y0 + k1 * (h * A5[0]) + k2 * (h * A5[1]) + k3 * (h * A5[2]) + k4 * (h * A5[3])),
    );
    let k6 = dynamics.derivative(
        t + C[5] * h,
        &(y0 + k1 * (h * A6[0])
            + k2 * (h * A6[1])
            + k3 * (h * A6[2])
            + k4 * (h * A6[3])
            + k5 * (h * A6[4])),
    );
    let k7 = dynamics.derivative(
        t + C[6] * h,
        &(y0 + k1 * (h * A7[0])
            + k2 * (h * A7[1])
            + k3 * (h * A7[2])
            + k4 * (h * A7[3])
            + k5 * (h * A7[4])
            + k6 * (h * A7[5])),
    );

    let ks = [k1, k2, k3, k4, k5, k6, k7];
    let mut y_high = y0;
    let mut y_low = y0;
    for i in 0..7 {
        y_high += ks[i] * (h * B5[i]);
        y_low += ks[i] * (h * B4[i]);
    }
    (y_high, y_low)
}

fn error_norm(y_high: &StateVector, y_low: &StateVector, rtol: f64, atol: f64) -> f64 {
    let mut max_ratio = 0.0_f64;
    for i in 0..16 {
        let scale = atol + rtol * y_high[i].abs().max(y_low[i].abs());
        let ratio = (y_high[i] - y_low[i]).abs() / scale;
        max_ratio = max_ratio.max(ratio);
    }
    max_ratio
}
