use crate::config::SimulationConfig;
use crate::control::control_type_from_alias;
use crate::error::SimError;
use crate::integrators::dp54;
use crate::metrics::Metrics;
use crate::models::spacecraft::InertiaTensor;
use crate::models::state;
use crate::numerics::quaternion::{rot_to_quat, Quaternion};
use crate::physics::dynamics::Dynamics;
use crate::resample;
use nalgebra as na;
use serde::Serialize;
use std::time::Instant;

/// The sampled playback dataset returned to HTTP and WebSocket clients.
#[derive(Debug, Serialize)]
pub struct Dataset {
    pub t: Vec<f64>,
    pub qx: Vec<f64>,
    pub qy: Vec<f64>,
    pub qz: Vec<f64>,
    pub qw: Vec<f64>,
    pub p: Vec<f64>,
    pub q: Vec<f64>,
    pub r: Vec<f64>,
    pub hx: Vec<f64>,
    pub hy: Vec<f64>,
    pub hz: Vec<f64>,
    pub sample_rate: f64,
    pub earth_initial_sidereal_angle_rad: f64,
    pub earth_spin_rate_radps: f64,
}

/// Runs one complete compute: builds the initial state and dynamics from
/// `config`, integrates, resamples for playback, and returns the dataset
/// plus compute metrics. Consumed once; no state survives the call.
pub fn run(config: &SimulationConfig) -> Result<(Dataset, Metrics), SimError> {
    config.validate()?;

    let inertia = InertiaTensor::from_diagonal(
        config.spacecraft.inertia[0],
        config.spacecraft.inertia[1],
        config.spacecraft.inertia[2],
    )?;

    let y0 = build_initial_state(config)?;

    let q_cmd = Quaternion::new(
        config.control.qc[0],
        config.control.qc[1],
        config.control.qc[2],
        config.control.qc[3],
    );
    let control = control_type_from_alias(
        &config.control.control_type,
        config.control.kp,
        config.control.kd,
        q_cmd,
    );
    let dynamics = Dynamics::new(inertia, control);

    let start = Instant::now();
    let (t, y) = dp54::compute_states(
        &dynamics,
        y0,
        config.simulation.t_max,
        config.simulation.rtol,
        config.simulation.atol,
    )?;
    let compute_time = start.elapsed();

    let sampled = resample::evaluate_gui(
        &t,
        &y,
        config.simulation.playback_speed,
        config.simulation.sample_rate,
    )?;

    let epoch = parse_epoch(config.epoch_utc.as_deref());
    let sidereal_angle = crate::earth::sidereal_angle_rad(epoch);
    let spin_rate = crate::earth::spin_rate_radps();

    let dataset = Dataset {
        t: sampled.t,
        qx: sampled.q.iter().map(|q| q.vector()[0]).collect(),
        qy: sampled.q.iter().map(|q| q.vector()[1]).collect(),
        qz: sampled.q.iter().map(|q| q.vector()[2]).collect(),
        qw: sampled.q.iter().map(|q| q.scalar()).collect(),
        p: sampled.omega.iter().map(|w| w.x).collect(),
        q: sampled.omega.iter().map(|w| w.y).collect(),
        r: sampled.omega.iter().map(|w| w.z).collect(),
        hx: sampled.h.iter().map(|h| h.x).collect(),
        hy: sampled.h.iter().map(|h| h.y).collect(),
        hz: sampled.h.iter().map(|h| h.z).collect(),
        sample_rate: config.simulation.sample_rate,
        earth_initial_sidereal_angle_rad: sidereal_angle,
        earth_spin_rate_radps: spin_rate,
    };

    let metrics = Metrics::new(compute_time, t.len());

    Ok((dataset, metrics))
}

fn parse_epoch(epoch_utc: Option<&str>) -> chrono::DateTime<chrono::Utc> {
    match epoch_utc {
        Some(s) => chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .map(|naive| naive.and_utc())
            .unwrap_or_else(|_| chrono::Utc::now()),
        None => chrono::Utc::now(),
    }
}

fn build_initial_state(config: &SimulationConfig) -> Result<state::StateVector, SimError> {
    let ic = &config.initial_conditions;
    let h = na::Vector3::zeros();

    let r = ic
        .r_eci_m
        .map(na::Vector3::from)
        .unwrap_or_else(na::Vector3::zeros);
    let v = ic
        .v_eci_mps
        .map(na::Vector3::from)
        .unwrap_or_else(na::Vector3::zeros);

    let (q_bi, omega) = match ic.frame.as_str() {
        "inertial" => (
            Quaternion::new(ic.q_bi[0], ic.q_bi[1], ic.q_bi[2], ic.q_bi[3]),
            na::Vector3::from(ic.omega_bi_radps),
        ),
        "orbit" => {
            let q_bo = Quaternion::new(ic.q_bi[0], ic.q_bi[1], ic.q_bi[2], ic.q_bi[3]);
            let omega_bo = na::Vector3::from(ic.omega_bi_radps);
            let (q_io, omega_oi) = orbit_frame_state(&r, &v)?;
            let q_bi = q_io.mul_cross(&q_bo);
            // omega_bi = omega_bo + R_bo^T * omega_oi: the body's rate
            // relative to the orbit frame plus the orbit frame's own
            // rate relative to the inertial frame, rotated into body
            // coordinates via the body-to-orbit rotation's transpose.
            let r_bo = q_bo.to_rotation_matrix();
            let omega_bi = omega_bo + r_bo.transpose() * omega_oi;
            (q_bi, omega_bi)
        }
        other => return Err(SimError::ConfigUnknownFrame(other.to_string())),
    };

    Ok(state::pack(r, v, omega, q_bi, h))
}

/// Builds the inertial-to-orbit-frame quaternion `q_io` and the orbit
/// frame's angular velocity relative to the inertial frame, expressed in
/// orbit-frame coordinates (`omega_oi`). `z_o` points to nadir, `y_o` is
/// anti-normal to the orbit plane, `x_o` completes the right-handed
/// triad; `omega_oi` follows from the two-body acceleration at `r`.
fn orbit_frame_state(
    r: &na::Vector3<f64>,
    v: &na::Vector3<f64>,
) -> Result<(Quaternion, na::Vector3<f64>), SimError> {
    let r_mag = r.magnitude();
    if r_mag == 0.0 {
        return Err(SimError::ConfigInvalid(
            "frame \"orbit\" requires a nonzero initial position".to_string(),
        ));
    }
    let rxv = r.cross(v);
    let rxv_mag = rxv.magnitude();
    if rxv_mag == 0.0 {
        return Err(SimError::ConfigInvalid(
            "frame \"orbit\" requires non-collinear position and velocity".to_string(),
        ));
    }

    let z_o = -r / r_mag;
    let y_o = -rxv / rxv_mag;
    let x_o = y_o.cross(&z_o);

    let r_io = na::Matrix3::from_rows(&[x_o.transpose(), y_o.transpose(), z_o.transpose()]);
    let q_io = rot_to_quat(&r_io);

    let accel = crate::physics::gravity::gravity_acceleration(r);
    let omega_oi = na::Vector3::new(
        0.0,
        -rxv_mag / r_mag.powi(2),
        r_mag * rxv.dot(&accel) / rxv_mag.powi(2),
    );

    Ok((q_io, omega_oi))
}
