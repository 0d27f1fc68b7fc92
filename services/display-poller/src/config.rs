use std::time::Duration;

use anyhow::{Context, Result, bail};
use telemetry_record::env::{parse_i2c_address, read_env, read_env_optional};
use url::Url;

use crate::lcd;

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_URL: &str = "http://192.168.1.193:8080";

pub const LCD_COLS: u8 = 16;
pub const LCD_ROWS: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Lcd { bus: String, address: u8 },
    Console,
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub url: Url,
    pub interval: Duration,
    pub request_timeout: Duration,
    pub backend: Backend,
}

impl PollerConfig {
    pub fn from_env() -> Result<Self> {
        let raw_url = read_env("DISPLAY_POLLER_URL", DEFAULT_URL);
        let url = Url::parse(&raw_url)
            .with_context(|| format!("DISPLAY_POLLER_URL={raw_url} is not a valid url"))?;

        let backend = match read_env("DISPLAY_BACKEND", "lcd").to_ascii_lowercase().as_str() {
            "console" => Backend::Console,
            "lcd" => {
                let bus = read_env("LCD_I2C_BUS", "/dev/i2c-1");
                let address = match read_env_optional("LCD_I2C_ADDRESS") {
                    Some(raw) => parse_i2c_address(&raw)
                        .with_context(|| format!("LCD_I2C_ADDRESS={raw} is not an i2c address"))?,
                    None => lcd::DEFAULT_ADDRESS,
                };
                Backend::Lcd { bus, address }
            }
            other => bail!("DISPLAY_BACKEND={other} is not one of lcd, console"),
        };

        Ok(Self {
            url,
            interval: POLL_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
            backend,
        })
    }
}
