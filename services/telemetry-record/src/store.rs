use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::record::{RECORD_LEN, RecordError, TelemetryRecord};

/// Where the sensor writer leaves the latest reading unless told otherwise.
pub const DEFAULT_RECORD_PATH: &str = "/dev/shm/sensor_data";

/// Handle on the shared record file. Holds only the path; every call opens
/// the file afresh so readers always see the latest write.
#[derive(Debug, Clone)]
pub struct SharedRecord {
    path: PathBuf,
}

impl SharedRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the shared record with `record`.
    ///
    /// The bytes go to a uniquely named temp file in the same directory and
    /// are renamed over the target, so a concurrent `load` sees either the
    /// previous record or this one in full, and two concurrent stores never
    /// share a staging file.
    pub fn store(&self, record: &TelemetryRecord) -> Result<(), RecordError> {
        let write_err = |source| RecordError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
        staged.write_all(&record.encode()).map_err(write_err)?;
        // Temp files start out owner-only; the reading service may run as
        // another user.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(write_err)?;
        }
        staged
            .persist(&self.path)
            .map_err(|e| write_err(e.error))?;
        tracing::trace!(path = %self.path.display(), "telemetry record stored");
        Ok(())
    }

    pub fn load(&self) -> Result<TelemetryRecord, RecordError> {
        let unavailable = |source| RecordError::Unavailable {
            path: self.path.clone(),
            source,
        };
        let file = File::open(&self.path).map_err(unavailable)?;
        let mut buf = Vec::with_capacity(RECORD_LEN);
        file.take(RECORD_LEN as u64)
            .read_to_end(&mut buf)
            .map_err(unavailable)?;
        TelemetryRecord::decode(&buf)
    }
}
