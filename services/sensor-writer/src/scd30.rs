//! Sensirion SCD30 CO2 / temperature / humidity sensor over I2C.
//!
//! Every command is a big-endian 16-bit word. Arguments and response words
//! are each followed by a CRC-8 byte. The sensor wants a stop condition
//! between a command and the read of its response, so reads are a separate
//! transfer after [`READ_DELAY_MS`].

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

pub const DEFAULT_ADDRESS: u8 = 0x61;

const READ_DELAY_MS: u32 = 10;
const CRC_INIT: u8 = 0xFF;
const CRC_POLY: u8 = 0x31;
const MAX_WORDS: usize = 6;

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartContinuousMeasurement = 0x0010,
    StopContinuousMeasurement = 0x0104,
    MeasurementInterval = 0x4600,
    DataReady = 0x0202,
    ReadMeasurement = 0x0300,
    AutomaticSelfCalibration = 0x5306,
    ForcedRecalibration = 0x5204,
    TemperatureOffset = 0x5403,
    AltitudeCompensation = 0x5102,
    FirmwareVersion = 0xD100,
    SoftReset = 0xD304,
}

#[derive(Debug, thiserror::Error)]
pub enum Scd30Error {
    #[error("i2c transfer failed: {0:?}")]
    I2c(ErrorKind),
    #[error("crc mismatch in sensor response")]
    Crc,
    #[error("sensor reports {actual} after being set to {expected}")]
    Verify { expected: u16, actual: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub co2_ppm: f32,
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// CRC-8 as used by Sensirion sensors: poly 0x31, init 0xFF, no reflection.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC_INIT;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

pub struct Scd30<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Scd30<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Starts continuous measurement. `ambient_pressure_mbar` of 0 disables
    /// pressure compensation.
    pub fn start_continuous_measurement(
        &mut self,
        ambient_pressure_mbar: u16,
    ) -> Result<(), Scd30Error> {
        self.write_with_arg(Command::StartContinuousMeasurement, ambient_pressure_mbar)
    }

    pub fn stop_continuous_measurement(&mut self) -> Result<(), Scd30Error> {
        self.write_command(Command::StopContinuousMeasurement)
    }

    pub fn data_ready(&mut self) -> Result<bool, Scd30Error> {
        let [status] = self.read_words::<1>(Command::DataReady)?;
        Ok(status == 1)
    }

    pub fn read_measurement(&mut self) -> Result<Measurement, Scd30Error> {
        let w = self.read_words::<6>(Command::ReadMeasurement)?;
        Ok(Measurement {
            co2_ppm: words_to_f32(w[0], w[1]),
            temperature_c: words_to_f32(w[2], w[3]),
            humidity_pct: words_to_f32(w[4], w[5]),
        })
    }

    pub fn measurement_interval(&mut self) -> Result<u16, Scd30Error> {
        let [secs] = self.read_words::<1>(Command::MeasurementInterval)?;
        Ok(secs)
    }

    pub fn set_measurement_interval(&mut self, secs: u16) -> Result<(), Scd30Error> {
        self.write_with_arg(Command::MeasurementInterval, secs)?;
        let actual = self.measurement_interval()?;
        verify(secs, actual)
    }

    /// Offset in hundredths of a degree Celsius.
    pub fn temperature_offset(&mut self) -> Result<u16, Scd30Error> {
        let [offset] = self.read_words::<1>(Command::TemperatureOffset)?;
        Ok(offset)
    }

    pub fn set_temperature_offset(&mut self, centi_celsius: u16) -> Result<(), Scd30Error> {
        self.write_with_arg(Command::TemperatureOffset, centi_celsius)?;
        let actual = self.temperature_offset()?;
        verify(centi_celsius, actual)
    }

    /// Altitude above sea level in metres.
    pub fn altitude_compensation(&mut self) -> Result<u16, Scd30Error> {
        let [metres] = self.read_words::<1>(Command::AltitudeCompensation)?;
        Ok(metres)
    }

    pub fn set_altitude_compensation(&mut self, metres: u16) -> Result<(), Scd30Error> {
        self.write_with_arg(Command::AltitudeCompensation, metres)?;
        self.delay.delay_ms(READ_DELAY_MS);
        let actual = self.altitude_compensation()?;
        verify(metres, actual)
    }

    pub fn forced_recalibration(&mut self) -> Result<u16, Scd30Error> {
        let [ppm] = self.read_words::<1>(Command::ForcedRecalibration)?;
        Ok(ppm)
    }

    /// Tells the sensor the true CO2 concentration right now. The sensor
    /// does not echo this back reliably, so there is no read-back check.
    pub fn set_forced_recalibration(&mut self, reference_ppm: u16) -> Result<(), Scd30Error> {
        self.write_with_arg(Command::ForcedRecalibration, reference_ppm)
    }

    pub fn automatic_self_calibration(&mut self) -> Result<bool, Scd30Error> {
        let [status] = self.read_words::<1>(Command::AutomaticSelfCalibration)?;
        Ok(status == 1)
    }

    pub fn set_automatic_self_calibration(&mut self, enabled: bool) -> Result<(), Scd30Error> {
        let status = u16::from(enabled);
        self.write_with_arg(Command::AutomaticSelfCalibration, status)?;
        let actual = self.read_words::<1>(Command::AutomaticSelfCalibration)?[0];
        verify(status, actual)
    }

    /// Returns `(major, minor)`.
    pub fn firmware_version(&mut self) -> Result<(u8, u8), Scd30Error> {
        let [version] = self.read_words::<1>(Command::FirmwareVersion)?;
        let [major, minor] = version.to_be_bytes();
        Ok((major, minor))
    }

    pub fn soft_reset(&mut self) -> Result<(), Scd30Error> {
        self.write_command(Command::SoftReset)
    }

    fn write_command(&mut self, cmd: Command) -> Result<(), Scd30Error> {
        let frame = (cmd as u16).to_be_bytes();
        self.i2c
            .write(self.address, &frame)
            .map_err(|e| Scd30Error::I2c(e.kind()))
    }

    fn write_with_arg(&mut self, cmd: Command, arg: u16) -> Result<(), Scd30Error> {
        let [c0, c1] = (cmd as u16).to_be_bytes();
        let [a0, a1] = arg.to_be_bytes();
        let frame = [c0, c1, a0, a1, crc8(&[a0, a1])];
        self.i2c
            .write(self.address, &frame)
            .map_err(|e| Scd30Error::I2c(e.kind()))
    }

    fn read_words<const N: usize>(&mut self, cmd: Command) -> Result<[u16; N], Scd30Error> {
        debug_assert!(N <= MAX_WORDS);
        self.write_command(cmd)?;
        self.delay.delay_ms(READ_DELAY_MS);

        let mut buf = [0u8; MAX_WORDS * 3];
        let buf = &mut buf[..N * 3];
        self.i2c
            .read(self.address, buf)
            .map_err(|e| Scd30Error::I2c(e.kind()))?;

        let mut words = [0u16; N];
        for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(3)) {
            if crc8(&chunk[..2]) != chunk[2] {
                return Err(Scd30Error::Crc);
            }
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        Ok(words)
    }
}

fn words_to_f32(hi: u16, lo: u16) -> f32 {
    f32::from_bits((u32::from(hi) << 16) | u32::from(lo))
}

fn verify(expected: u16, actual: u16) -> Result<(), Scd30Error> {
    if expected == actual {
        Ok(())
    } else {
        Err(Scd30Error::Verify { expected, actual })
    }
}
