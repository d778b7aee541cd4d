use crate::error::SimError;
use crate::models::state::{self, StateVector};
use crate::numerics::quaternion::{quat_to_euler, slerp_array, Quaternion};
use nalgebra as na;

/// Uniformly resampled playback arrays, one entry per `t_s[k]`.
pub struct SampledTrajectory {
    pub t: Vec<f64>,
    pub r: Vec<na::Vector3<f64>>,
    pub v: Vec<na::Vector3<f64>>,
    pub euler: Vec<na::Vector3<f64>>,
    pub omega: Vec<na::Vector3<f64>>,
    pub q: Vec<Quaternion>,
    pub h: Vec<na::Vector3<f64>>,
}

/// Converts the variable-step solver trajectory `(t, y)` into uniformly
/// sampled playback arrays: linear interpolation for vector channels,
/// SLERP for attitude.
pub fn evaluate_gui(
    t: &[f64],
    y: &[StateVector],
    playback_speed: f64,
    sample_rate: f64,
) -> Result<SampledTrajectory, SimError> {
    if playback_speed <= 0.0 || sample_rate <= 0.0 {
        return Err(SimError::InvalidSampling(format!(
            "playback_speed and sample_rate must be positive, got {playback_speed}, {sample_rate}"
        )));
    }
    if t.len() != y.len() {
        return Err(SimError::InvalidSampling(
            "t and y arrays must have equal length".to_string(),
        ));
    }

    let delta = playback_speed / sample_rate;

    if t.len() <= 1 {
        return Ok(SampledTrajectory {
            t: Vec::new(),
            r: Vec::new(),
            v: Vec::new(),
            euler: Vec::new(),
            omega: Vec::new(),
            q: Vec::new(),
            h: Vec::new(),
        });
    }

    let t_end = *t.last().unwrap();
    let m = (t_end / delta).ceil() as usize;
    let t_s: Vec<f64> = (0..m).map(|k| k as f64 * delta).collect();

    let r: Vec<na::Vector3<f64>> = t_s
        .iter()
        .map(|&ts| interpolate_vector(t, y, ts, state::position))
        .collect();
    let v: Vec<na::Vector3<f64>> = t_s
        .iter()
        .map(|&ts| interpolate_vector(t, y, ts, state::velocity))
        .collect();
    let omega: Vec<na::Vector3<f64>> = t_s
        .iter()
        .map(|&ts| interpolate_vector(t, y, ts, state::angular_velocity))
        .collect();
    let h: Vec<na::Vector3<f64>> = t_s
        .iter()
        .map(|&ts| interpolate_vector(t, y, ts, state::wheel_momentum))
        .collect();

    let q_keys: Vec<Quaternion> = y.iter().map(state::attitude).collect();
    let q = slerp_array(&t_s, t, &q_keys);
    let euler = q.iter().map(quat_to_euler).collect();

    Ok(SampledTrajectory {
        t: t_s,
        r,
        v,
        euler,
        omega,
        q,
        h,
    })
}

fn interpolate_vector(
    t: &[f64],
    y: &[StateVector],
    ts: f64,
    extract: impl Fn(&StateVector) -> na::Vector3<f64>,
) -> na::Vector3<f64> {
    let idx = match t.binary_search_by(|probe| probe.partial_cmp(&ts).unwrap()) {
        Ok(i) => return extract(&y[i]),
        Err(i) => i,
    };
    if idx == 0 {
        return extract(&y[0]);
    }
    if idx >= t.len() {
        return extract(&y[t.len() - 1]);
    }
    let (t0, t1) = (t[idx - 1], t[idx]);
    let frac = (ts - t0) / (t1 - t0);
    let (y0, y1) = (extract(&y[idx - 1]), extract(&y[idx]));
    y0 + (y1 - y0) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerics::quaternion::Quaternion;

    fn sample_trajectory() -> (Vec<f64>, Vec<StateVector>) {
        let t = vec![0.0, 1.0, 2.0];
        let y = vec![
            state::pack(
                na::Vector3::new(0.0, 0.0, 0.0),
                na::Vector3::new(1.0, 0.0, 0.0),
                na::Vector3::zeros(),
                Quaternion::identity(),
                na::Vector3::zeros(),
            ),
            state::pack(
                na::Vector3::new(1.0, 0.0, 0.0),
                na::Vector3::new(1.0, 0.0, 0.0),
                na::Vector3::zeros(),
                Quaternion::identity(),
                na::Vector3::zeros(),
            ),
            state::pack(
                na::Vector3::new(2.0, 0.0, 0.0),
                na::Vector3::new(1.0, 0.0, 0.0),
                na::Vector3::zeros(),
                Quaternion::identity(),
                na::Vector3::zeros(),
            ),
        ];
        (t, y)
    }

    #[test]
    fn resampler_shape_matches_formula() {
        let (t, y) = sample_trajectory();
        let result = evaluate_gui(&t, &y, 1.0, 10.0).unwrap();
        let expected_len = (2.0_f64 / (1.0 / 10.0)).ceil() as usize;
        assert_eq!(result.t.len(), expected_len);
        assert_eq!(result.r.len(), expected_len);
        assert_eq!(result.q.len(), expected_len);
    }

    #[test]
    fn invalid_sampling_rejects_non_positive_rate() {
        let (t, y) = sample_trajectory();
        assert!(evaluate_gui(&t, &y, 1.0, 0.0).is_err());
        assert!(evaluate_gui(&t, &y, 0.0, 10.0).is_err());
    }

    #[test]
    fn single_point_trajectory_yields_empty_sampling() {
        let t = vec![0.0];
        let y = vec![state::pack(
            na::Vector3::zeros(),
            na::Vector3::zeros(),
            na::Vector3::zeros(),
            Quaternion::identity(),
            na::Vector3::zeros(),
        )];
        let result = evaluate_gui(&t, &y, 1.0, 10.0).unwrap();
        assert!(result.t.is_empty());
    }

    #[test]
    fn linear_interpolation_midpoint() {
        let (t, y) = sample_trajectory();
        let result = evaluate_gui(&t, &y, 1.0, 2.0).unwrap();
        // delta = 0.5; sample at t=0.5 should be midway between r(0)=0 and r(1)=1.
        let idx = result
            .t
            .iter()
            .position(|&ts| (ts - 0.5).abs() < 1e-9)
            .unwrap();
        assert!((result.r[idx].x - 0.5).abs() < 1e-9);
    }
}
