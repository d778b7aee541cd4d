use crate::constants::EARTH_ANGULAR_VELOCITY_RADPS;
use chrono::{DateTime, Utc};

/// Closed-form Greenwich mean sidereal angle (IAU 1982 formula), used
/// only by the visualizer to orient the Earth mesh at playback start.
/// Good to a few arcseconds over the mission timescales this simulator
/// targets; not a substitute for an EOP-corrected transform.
pub fn sidereal_angle_rad(epoch: DateTime<Utc>) -> f64 {
    let jd = julian_date(epoch);
    let t = (jd - 2_451_545.0) / 36525.0;

    let theta_deg = 280.460_618_37
        + 360.985_647_366_29 * (jd - 2_451_545.0)
        + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;

    (theta_deg.rem_euclid(360.0)).to_radians()
}

fn julian_date(epoch: DateTime<Utc>) -> f64 {
    2_440_587.5 + epoch.timestamp() as f64 / 86400.0
}

/// Mean Earth spin rate, rad/s. Constant to the precision this
/// simulator needs (no polar-motion or length-of-day correction).
pub fn spin_rate_radps() -> f64 {
    EARTH_ANGULAR_VELOCITY_RADPS
}
