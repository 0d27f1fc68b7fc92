use embedded_hal::i2c::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("lcd i2c write failed: {0:?}")]
    I2c(ErrorKind),
}

/// A character display the poller can draw on.
pub trait Display {
    fn clear(&mut self) -> Result<(), DisplayError>;
    fn write_str(&mut self, text: &str) -> Result<(), DisplayError>;
}

impl<T: Display + ?Sized> Display for Box<T> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        (**self).write_str(text)
    }
}

/// Logs what an LCD of the given geometry would show. For hosts without
/// the hardware. Zero columns or rows count as one.
pub struct ConsoleDisplay {
    cols: usize,
    rows: usize,
    text: String,
}

impl ConsoleDisplay {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            text: String::new(),
        }
    }

    /// Current contents split the way the LCD would wrap them.
    pub fn lines(&self) -> Vec<String> {
        let chars: Vec<char> = self.text.chars().collect();
        let mut lines: Vec<String> = chars
            .chunks(self.cols)
            .map(|c| c.iter().collect())
            .collect();
        lines.truncate(self.rows);
        lines
    }
}

impl Display for ConsoleDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.text.clear();
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        self.text.push_str(text);
        for (row, line) in self.lines().iter().enumerate() {
            let padded = format!("{line:<width$}", width = self.cols);
            tracing::info!(row, "|{padded}|");
        }
        Ok(())
    }
}
