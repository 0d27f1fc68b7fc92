pub mod sampler;
pub mod scd30;

pub use sampler::{AirSensor, POLL_INTERVAL, SampleError, Sampler};
pub use scd30::{Measurement, Scd30, Scd30Error};
