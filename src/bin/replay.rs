use attitude_sim::config::presets;
use attitude_sim::simulate;
use csv::Writer;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

/// Batch replay: runs one compute against the bundled default preset (or
/// the preset named by the first CLI argument) and writes the resampled
/// playback dataset to `output/simulation_data.csv`, for offline
/// inspection without standing up the HTTP/WS server.
fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(filename) => presets::read_preset(&filename)?,
        None => presets::load_defaults()?,
    };

    let (dataset, metrics) = simulate::run(&config)?;

    let output_dir = Path::new("output");
    fs::create_dir_all(output_dir)?;
    let file = File::create(output_dir.join("simulation_data.csv"))?;
    let mut writer = Writer::from_writer(file);

    writer.write_record([
        "Time (s)",
        "Quaternion X",
        "Quaternion Y",
        "Quaternion Z",
        "Quaternion W",
        "Angular Velocity P (rad/s)",
        "Angular Velocity Q (rad/s)",
        "Angular Velocity R (rad/s)",
        "Wheel Momentum X",
        "Wheel Momentum Y",
        "Wheel Momentum Z",
    ])?;

    for i in 0..dataset.t.len() {
        writer.write_record([
            format!("{:.3}", dataset.t[i]),
            format!("{:.9}", dataset.qx[i]),
            format!("{:.9}", dataset.qy[i]),
            format!("{:.9}", dataset.qz[i]),
            format!("{:.9}", dataset.qw[i]),
            format!("{:.9}", dataset.p[i]),
            format!("{:.9}", dataset.q[i]),
            format!("{:.9}", dataset.r[i]),
            format!("{:.9}", dataset.hx[i]),
            format!("{:.9}", dataset.hy[i]),
            format!("{:.9}", dataset.hz[i]),
        ])?;
    }
    writer.flush()?;

    println!(
        "wrote {} samples to output/simulation_data.csv ({} integration points, {:.3}s compute)",
        dataset.t.len(),
        metrics.num_integration_points,
        metrics.compute_time_s
    );

    Ok(())
}
