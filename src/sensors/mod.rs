pub mod accelerometer;
pub mod gps_sensor;
pub mod gyroscope;
pub mod likelihood;
pub mod magnetometer;
pub mod pressure;

pub use accelerometer::{Accelerometer, AccelerometerReading};
pub use gps_sensor::{GpsFix, GpsSensor};
pub use gyroscope::{Gyroscope, GyroscopeReading};
pub use magnetometer::{Magnetometer, MagnetometerReading};
pub use pressure::{Pressure, PressureReading};
