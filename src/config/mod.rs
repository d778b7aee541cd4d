pub mod presets;

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacecraftConfig {
    pub inertia: [f64; 3],
    pub shape: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialConditions {
    pub frame: String,
    pub q_bi: [f64; 4],
    pub omega_bi_radps: [f64; 3],
    #[serde(default)]
    pub r_eci_m: Option<[f64; 3]>,
    #[serde(default)]
    pub v_eci_mps: Option<[f64; 3]>,
    #[serde(default)]
    pub orbit: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub dt_sim: f64,
    pub t_max: f64,
    pub playback_speed: f64,
    pub sample_rate: f64,
    pub rtol: f64,
    pub atol: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    pub control_type: String,
    pub kp: f64,
    pub kd: f64,
    pub qc: [f64; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub spacecraft: SpacecraftConfig,
    pub initial_conditions: InitialConditions,
    pub simulation: SimulationSettings,
    pub control: ControlConfig,
    #[serde(default)]
    pub epoch_utc: Option<String>,
}

impl SimulationConfig {
    /// Deep-merges a partial JSON payload into `self` by recognized
    /// field, per the wire schema's override table. Arrays replace
    /// wholesale; unknown keys are ignored.
    pub fn merge(&mut self, payload: &Value) -> Result<(), SimError> {
        let Some(obj) = payload.as_object() else {
            return Ok(());
        };

        if let Some(v) = obj.get("inertia").and_then(as_vec3) {
            self.spacecraft.inertia = v;
        }
        if let Some(v) = obj.get("shape").and_then(as_vec3) {
            self.spacecraft.shape = v;
        }
        if let Some(v) = obj.get("q_bi").and_then(as_vec4) {
            self.initial_conditions.frame = "inertial".to_string();
            self.initial_conditions.q_bi = v;
        }
        if let Some(v) = obj.get("omega_bi_radps").and_then(as_vec3) {
            self.initial_conditions.omega_bi_radps = v;
        }
        if let Some(v) = obj.get("dt_sim").and_then(Value::as_f64) {
            self.simulation.dt_sim = v;
        }
        if let Some(v) = obj.get("t_max").and_then(Value::as_f64) {
            self.simulation.t_max = v;
        }
        if let Some(v) = obj.get("playback_speed").and_then(Value::as_f64) {
            self.simulation.playback_speed = v;
        }
        if let Some(v) = obj.get("sample_rate").and_then(Value::as_f64) {
            self.simulation.sample_rate = v;
        }
        if let Some(v) = obj.get("rtol").and_then(Value::as_f64) {
            self.simulation.rtol = v;
        }
        if let Some(v) = obj.get("atol").and_then(Value::as_f64) {
            self.simulation.atol = v;
        }

        // Control fields may arrive nested under "control" or flat at
        // the payload's top level (the wire format accepts both).
        let control_source = obj
            .get("control")
            .and_then(Value::as_object)
            .unwrap_or(obj);

        if let Some(v) = control_source
            .get("control_type")
            .or_else(|| control_source.get("ctrl"))
            .and_then(Value::as_str)
        {
            self.control.control_type = v.to_string();
        }
        if let Some(v) = control_source.get("kp").and_then(Value::as_f64) {
            self.control.kp = v;
        }
        if let Some(v) = control_source.get("kd").and_then(Value::as_f64) {
            self.control.kd = v;
        }
        if let Some(v) = control_source.get("qc").and_then(as_vec4) {
            self.control.qc = v;
        }

        self.validate()
    }

    /// The normalized, client-facing defaults shape: `{spacecraft,
    /// initial_conditions:{q_bi, omega_bi_radps, orbit}, simulation,
    /// control}`. Deliberately narrower than the full internal struct —
    /// `name`, `epoch_utc`, and the raw ECI position/velocity are
    /// internal/session-level details, not part of the documented
    /// defaults response.
    pub fn to_defaults_json(&self) -> Value {
        serde_json::json!({
            "spacecraft": {
                "inertia": self.spacecraft.inertia,
                "shape": self.spacecraft.shape,
            },
            "initial_conditions": {
                "q_bi": self.initial_conditions.q_bi,
                "omega_bi_radps": self.initial_conditions.omega_bi_radps,
                "orbit": self.initial_conditions.orbit,
            },
            "simulation": {
                "dt_sim": self.simulation.dt_sim,
                "t_max": self.simulation.t_max,
                "playback_speed": self.simulation.playback_speed,
                "sample_rate": self.simulation.sample_rate,
                "rtol": self.simulation.rtol,
                "atol": self.simulation.atol,
            },
            "control": {
                "control_type": self.control.control_type,
                "kp": self.control.kp,
                "kd": self.control.kd,
                "qc": self.control.qc,
            },
        })
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.spacecraft.inertia.iter().any(|&j| j <= 0.0) {
            return Err(SimError::ConfigInvalid(format!(
                "inertia entries must be strictly positive, got {:?}",
                self.spacecraft.inertia
            )));
        }
        if self.simulation.t_max <= 0.0 {
            return Err(SimError::ConfigInvalid(format!(
                "t_max must be positive, got {}",
                self.simulation.t_max
            )));
        }
        if self.simulation.sample_rate <= 0.0 {
            return Err(SimError::ConfigInvalid(format!(
                "sample_rate must be positive, got {}",
                self.simulation.sample_rate
            )));
        }
        if self.simulation.playback_speed <= 0.0 {
            return Err(SimError::ConfigInvalid(format!(
                "playback_speed must be positive, got {}",
                self.simulation.playback_speed
            )));
        }
        if self.simulation.rtol < 0.0 || self.simulation.atol < 0.0 {
            return Err(SimError::ConfigInvalid(
                "rtol and atol must be non-negative".to_string(),
            ));
        }
        match self.initial_conditions.frame.as_str() {
            "inertial" | "orbit" => {}
            other => return Err(SimError::ConfigUnknownFrame(other.to_string())),
        }
        if !is_unit_quaternion(&self.initial_conditions.q_bi) {
            return Err(SimError::ConfigInvalid(format!(
                "initial_conditions.q_bi must be unit norm, got {:?}",
                self.initial_conditions.q_bi
            )));
        }
        if !is_unit_quaternion(&self.control.qc) {
            return Err(SimError::ConfigInvalid(format!(
                "control.qc must be unit norm, got {:?}",
                self.control.qc
            )));
        }
        Ok(())
    }
}

/// Bundled presets and hand-entered payloads carry quaternions rounded
/// to a handful of decimal digits, so this allows a little slack past
/// an exact unit norm rather than rejecting e.g. `[0,0,0.479,0.878]`
/// (norm ~1.00016) while still catching `[1,1,1,1]` (norm 2).
const UNIT_QUATERNION_TOLERANCE: f64 = 1e-3;

fn is_unit_quaternion(q: &[f64; 4]) -> bool {
    let norm = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    (norm - 1.0).abs() < UNIT_QUATERNION_TOLERANCE
}

fn as_vec3(v: &Value) -> Option<[f64; 3]> {
    let arr = v.as_array()?;
    if arr.len() != 3 {
        return None;
    }
    Some([arr[0].as_f64()?, arr[1].as_f64()?, arr[2].as_f64()?])
}

fn as_vec4(v: &Value) -> Option<[f64; 4]> {
    let arr = v.as_array()?;
    if arr.len() != 4 {
        return None;
    }
    Some([
        arr[0].as_f64()?,
        arr[1].as_f64()?,
        arr[2].as_f64()?,
        arr[3].as_f64()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_config() -> SimulationConfig {
        SimulationConfig {
            name: Some("test".to_string()),
            spacecraft: SpacecraftConfig {
                inertia: [10.0, 10.0, 10.0],
                shape: [1.0, 1.0, 1.0],
            },
            initial_conditions: InitialConditions {
                frame: "inertial".to_string(),
                q_bi: [0.0, 0.0, 0.0, 1.0],
                omega_bi_radps: [0.0, 0.0, 0.0],
                r_eci_m: None,
                v_eci_mps: None,
                orbit: None,
            },
            simulation: SimulationSettings {
                dt_sim: 0.1,
                t_max: 1000.0,
                playback_speed: 1.0,
                sample_rate: 30.0,
                rtol: 1e-12,
                atol: 1e-12,
            },
            control: ControlConfig {
                control_type: "none".to_string(),
                kp: 0.0,
                kd: 0.0,
                qc: [0.0, 0.0, 0.0, 1.0],
            },
            epoch_utc: None,
        }
    }

    #[test]
    fn merge_with_empty_payload_is_idempotent() {
        let mut cfg = sample_config();
        let before = serde_json::to_value(&cfg).unwrap();
        cfg.merge(&json!({})).unwrap();
        let after = serde_json::to_value(&cfg).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn merging_twice_equals_merging_once() {
        let mut once = sample_config();
        once.merge(&json!({"t_max": 60.0, "control_type": "tracking"}))
            .unwrap();

        let mut twice = sample_config();
        twice
            .merge(&json!({"t_max": 60.0, "control_type": "tracking"}))
            .unwrap();
        twice
            .merge(&json!({"t_max": 60.0, "control_type": "tracking"}))
            .unwrap();

        assert_eq!(
            serde_json::to_value(&once).unwrap(),
            serde_json::to_value(&twice).unwrap()
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut cfg = sample_config();
        cfg.merge(&json!({"bogus_field": 42})).unwrap();
        assert_eq!(cfg.simulation.t_max, 1000.0);
    }

    #[test]
    fn defaults_json_omits_internal_only_fields() {
        let cfg = sample_config();
        let value = cfg.to_defaults_json();
        assert!(value.get("name").is_none());
        assert!(value.get("epoch_utc").is_none());
        assert!(value["initial_conditions"].get("frame").is_none());
        assert!(value["initial_conditions"].get("r_eci_m").is_none());
        assert!(value["initial_conditions"].get("v_eci_mps").is_none());
        assert_eq!(value["spacecraft"]["inertia"], json!([10.0, 10.0, 10.0]));
        assert_eq!(value["control"]["control_type"], json!("none"));
    }

    #[test]
    fn rejects_non_positive_t_max() {
        let mut cfg = sample_config();
        assert!(cfg.merge(&json!({"t_max": -1.0})).is_err());
    }

    #[test]
    fn rejects_non_unit_qc() {
        let mut cfg = sample_config();
        assert!(cfg.merge(&json!({"qc": [1.0, 1.0, 1.0, 1.0]})).is_err());
    }

    #[test]
    fn rejects_non_unit_q_bi() {
        let mut cfg = sample_config();
        cfg.initial_conditions.q_bi = [1.0, 1.0, 1.0, 1.0];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn accepts_rounded_near_unit_qc() {
        let mut cfg = sample_config();
        assert!(cfg
            .merge(&json!({"qc": [0.0, 0.0, 0.479, 0.878]}))
            .is_ok());
    }

    #[test]
    fn flat_control_fields_are_accepted() {
        let mut cfg = sample_config();
        cfg.merge(&json!({
            "control_type": "nonlinear_tracking",
            "kp": 1.0,
            "kd": 2.0,
            "qc": [0.0, 0.0, 0.479, 0.878]
        }))
        .unwrap();
        assert_eq!(cfg.control.control_type, "nonlinear_tracking");
        assert_eq!(cfg.control.kp, 1.0);
    }
}
