/// Gravitational parameter of Earth, mu = G * M_EARTH (m^3/s^2), taken
/// directly rather than derived from G and M_EARTH separately.
pub const MU_EARTH: f64 = 3.986004418e14;

#[allow(dead_code)]
pub const R_EARTH: f64 = 6.371e6; // Radius of Earth (m)

pub const EARTH_ANGULAR_VELOCITY_RADPS: f64 = 7.2921150e-5; // mean sidereal rotation rate

pub const WGS84_A: f64 = 6378137.0; // Semi-major axis [m]
#[allow(dead_code)]
pub const WGS84_F: f64 = 1.0 / 298.257223563; // Flattening

pub const PI: f64 = std::f64::consts::PI;
