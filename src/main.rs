//! Demo harness: drives a simulated sounding-rocket ascent through RK4
//! ground truth, feeds the estimator real sensor forward models, and logs
//! the fused state to CSV. Not part of the library surface; a stand-in for
//! the original firmware's CAN/serial front end.

use estimator::atmosphere::Atmosphere;
use estimator::callbacks::{FlightCallbacks, RecordingCallbacks};
use estimator::config::FilterConfig;
use estimator::coordinates::{ecef_to_geodetic, geodetic_to_ecef, make_ltp_rotation, Geodetic};
use estimator::estimator::Estimator;
use estimator::integrators::RK4;
use estimator::models::RocketState;
use estimator::physics::drag::DragConfiguration;
use estimator::physics::dynamics::{EquationsOfMotion, FlightPhysicsContext, PosVel};
use estimator::sensors::{Accelerometer, GpsSensor, Gyroscope, Magnetometer, Pressure};
use nalgebra as na;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

/// Drag configuration switches once the truth generator judges the
/// airframe past apogee and descending, mirroring what the drogue/main
/// chute deployment would do to the real vehicle's cross section.
fn drag_for_phase(elapsed_since_ignition: Option<f64>, vel: &na::Vector3<f64>, pos: &na::Vector3<f64>) -> DragConfiguration {
    let descending = pos.dot(vel) < 0.0;
    match elapsed_since_ignition {
        Some(_) if !descending => DragConfiguration::ROCKET,
        _ if descending => DragConfiguration::DROGUE_CHUTE,
        _ => DragConfiguration::ROCKET,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("estimator=info".parse()?))
        .init();

    let pad = Geodetic::new(45.0_f64.to_radians(), -120.0_f64.to_radians(), 1200.0);
    let atmosphere = Atmosphere::default();
    let pad_rotpos = make_ltp_rotation(pad);

    let mut truth = PosVel { pos: geodetic_to_ecef(pad), vel: na::Vector3::zeros() };
    let mut truth_acc = na::Vector3::zeros();

    let config = FilterConfig::default();
    let mut flight_estimator = Estimator::new(config, Box::new(RecordingCallbacks::default()));
    flight_estimator.init(pad);

    let output_dir = Path::new("output");
    fs::create_dir_all(output_dir)?;
    let file = File::create(output_dir.join("flight.csv"))?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["time_s", "truth_altitude_m", "truth_speed_mps", "phase"])?;

    let dt = 0.01;
    let total_time = 120.0;
    let mut ignition_time: Option<f64> = None;
    let mut armed = false;
    let mut launched = false;

    let mut t = 0.0;
    let mut last_logged = -1.0;
    while t < total_time {
        if !armed && t > 1.0 {
            flight_estimator.arm();
            armed = true;
        }
        if armed && !launched && t > 1.5 {
            flight_estimator.launch();
            ignition_time = Some(t);
            launched = true;
        }

        let elapsed_since_ignition = ignition_time.map(|ignition| t - ignition);
        let context = FlightPhysicsContext {
            atmosphere: &atmosphere,
            rotpos: pad_rotpos,
            ignition_time,
            drag_configuration: drag_for_phase(elapsed_since_ignition, &truth.vel, &truth.pos),
        };

        truth_acc = context.compute_derivative(t, &truth).vel;
        truth = RK4::new(context).integrate(t, &truth, dt);

        let mut geodetic = ecef_to_geodetic(truth.pos);
        if geodetic.altitude < pad.altitude {
            geodetic = Geodetic::new(geodetic.latitude, geodetic.longitude, pad.altitude);
            truth.pos = geodetic_to_ecef(geodetic);
            let up = truth.pos.normalize();
            let radial_vel = truth.vel.dot(&up);
            if radial_vel < 0.0 {
                truth.vel -= up * radial_vel;
            }
            let radial_acc = truth_acc.dot(&up);
            if radial_acc < 0.0 {
                truth_acc -= up * radial_acc;
            }
        }

        let truth_state =
            RocketState { pos: truth.pos, vel: truth.vel, acc: truth_acc, rotpos: pad_rotpos, rotvel: na::Vector3::zeros() };

        flight_estimator.accelerometer_sensor(Accelerometer::simulate(&truth_state));
        flight_estimator.gyroscope_sensor(Gyroscope::simulate(&truth_state));
        flight_estimator.magnetometer_sensor(Magnetometer::simulate(&truth_state));
        flight_estimator.pressure_sensor(Pressure::simulate(&truth_state, &atmosphere));
        flight_estimator.gps_sensor(GpsSensor::simulate(&truth_state));

        flight_estimator.tick(dt)?;

        if t - last_logged >= 0.5 {
            writer.write_record(&[
                format!("{t:.2}"),
                format!("{:.2}", geodetic.altitude - pad.altitude),
                format!("{:.2}", truth.vel.magnitude()),
                format!("{}", flight_estimator.phase()),
            ])?;
            last_logged = t;
        }

        t += dt;
    }

    writer.flush()?;
    println!("flight log written to output/flight.csv");
    Ok(())
}
