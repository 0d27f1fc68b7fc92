//! HD44780 character LCD behind a PCF8574 I2C port expander, driven in
//! 4-bit mode.
//!
//! Expander pin map: P0 = RS, P1 = RW, P2 = E, P3 = backlight, P4-P7 = D4-D7.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};

use crate::display::{Display, DisplayError};

pub const DEFAULT_ADDRESS: u8 = 0x27;

const RS: u8 = 0x01;
const ENABLE: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x04;
const CMD_DISPLAY_CONTROL: u8 = 0x08;
const CMD_FUNCTION_SET: u8 = 0x20;
const CMD_SET_DDRAM: u8 = 0x80;

const ENTRY_LEFT: u8 = 0x02;
const DISPLAY_ON: u8 = 0x04;
const TWO_LINES: u8 = 0x08;

const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];
/// Widest line the controller addresses.
const MAX_COLS: u8 = 40;

pub struct Hd44780<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    cols: u8,
    rows: u8,
    cursor: (u8, u8),
}

impl<I2C: I2c, D: DelayNs> Hd44780<I2C, D> {
    /// Runs the 4-bit initialisation sequence and leaves the display
    /// cleared with the backlight on. Geometry is clamped to 1-40 columns
    /// and 1-4 rows.
    pub fn new(
        i2c: I2C,
        delay: D,
        address: u8,
        cols: u8,
        rows: u8,
    ) -> Result<Self, DisplayError> {
        let mut lcd = Self {
            i2c,
            delay,
            address,
            cols: cols.clamp(1, MAX_COLS),
            rows: rows.clamp(1, ROW_OFFSETS.len() as u8),
            cursor: (0, 0),
        };
        lcd.init()?;
        Ok(lcd)
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        let row = row % self.rows;
        let col = col % self.cols;
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[row as usize] + col))?;
        self.cursor = (row, col);
        Ok(())
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);
        self.expander_write(BACKLIGHT)?;
        // Force 8-bit mode three times, then drop to 4-bit.
        for wait_us in [4_500, 4_500, 150] {
            self.write_nibble(0x03, 0)?;
            self.delay.delay_us(wait_us);
        }
        self.write_nibble(0x02, 0)?;

        self.command(CMD_FUNCTION_SET | TWO_LINES)?;
        self.command(CMD_DISPLAY_CONTROL | DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE | ENTRY_LEFT)
    }

    fn command(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, 0)
    }

    fn data(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, RS)
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), DisplayError> {
        self.write_nibble(value >> 4, mode)?;
        self.write_nibble(value & 0x0F, mode)
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), DisplayError> {
        let bits = (nibble << 4) | mode | BACKLIGHT;
        self.expander_write(bits | ENABLE)?;
        self.delay.delay_us(1);
        self.expander_write(bits)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn expander_write(&mut self, bits: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[bits])
            .map_err(|e| DisplayError::I2c(e.kind()))
    }

    fn put_char(&mut self, c: char) -> Result<(), DisplayError> {
        let byte = if c.is_ascii() && !c.is_ascii_control() {
            c as u8
        } else {
            b'?'
        };
        self.data(byte)?;
        let (row, col) = self.cursor;
        if col + 1 >= self.cols {
            // Line wrap: the controller's own address counter does not
            // follow row order, so move explicitly.
            self.set_cursor((row + 1) % self.rows, 0)
        } else {
            self.cursor = (row, col + 1);
            Ok(())
        }
    }
}

impl<I2C: I2c, D: DelayNs> Display for Hd44780<I2C, D> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        self.cursor = (0, 0);
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        for c in text.chars() {
            match c {
                '\n' => {
                    let next = (self.cursor.0 + 1) % self.rows;
                    self.set_cursor(next, 0)?;
                }
                '\r' => self.set_cursor(self.cursor.0, 0)?,
                c => self.put_char(c)?,
            }
        }
        Ok(())
    }
}
