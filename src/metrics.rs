use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub compute_time_s: f64,
    pub num_integration_points: usize,
    pub time_per_integration_point_s: f64,
    pub solver_state_size_bytes: usize,
    pub solver_state_size_readable: String,
}

impl Metrics {
    /// `num_points` is the length of the solver's `t` array (not the
    /// resampled playback array). The size proxy counts the raw solver
    /// output only: `sizeof(f64) * (1 + 16) * N`.
    pub fn new(compute_time: Duration, num_points: usize) -> Self {
        let solver_state_size_bytes = std::mem::size_of::<f64>() * (1 + 16) * num_points;
        let compute_time_s = compute_time.as_secs_f64();
        let time_per_integration_point_s = if num_points > 0 {
            compute_time_s / num_points as f64
        } else {
            0.0
        };
        Metrics {
            compute_time_s,
            num_integration_points: num_points,
            time_per_integration_point_s,
            solver_state_size_bytes,
            solver_state_size_readable: bytes_human(solver_state_size_bytes),
        }
    }
}

pub fn bytes_human(n: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let n = n as f64;
    if n >= MB {
        format!("{:.2} MB", n / MB)
    } else if n >= KB {
        format!("{:.2} KB", n / KB)
    } else {
        format!("{n} B")
    }
}
