//! # JSON Extension
//!
//! With the `serde` feature enabled, [`FsExtJson`] adds `read_json` and
//! `write_json` to every driver. Both stream through a [`Handle`], so the
//! file is released on every path.
//!
//! ```toml
//! [dependencies]
//! fatfs-handle = { version = "0.1", features = ["serde"] }
//! ```

use serde::{Serialize, de::DeserializeOwned};

use crate::{Driver, FsError, Handle, OpenFlags};

/// JSON serialization extension methods.
///
/// Available when the `serde` feature is enabled.
pub trait FsExtJson: Driver + Sized {
    /// Read a file and deserialize it as JSON.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the file doesn't exist
    /// - [`FsError::Deserialization`] if the contents are not valid JSON for `T`
    ///
    /// # Example
    ///
    /// ```rust
    /// use fatfs_handle::{FsExtJson, MemoryDriver};
    ///
    /// let driver = MemoryDriver::new();
    /// driver.write_json("/cfg.json", &serde_json::json!({ "baud": 9600 })).unwrap();
    /// let cfg: serde_json::Value = driver.read_json("/cfg.json").unwrap();
    /// assert_eq!(cfg["baud"], 9600);
    /// ```
    fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FsError> {
        let file = self.open_file(path, OpenFlags::READ)?;
        let mut handle = Handle::from_file(self, file, path)?;
        let value = serde_json::from_reader(&mut handle)
            .map_err(|e| FsError::Deserialization(e.to_string()))?;
        handle.try_close()?;
        Ok(value)
    }

    /// Serialize `value` as pretty-printed JSON, replacing the file.
    ///
    /// # Errors
    ///
    /// - [`FsError::Serialization`] if serialization or the write fails
    /// - driver errors from opening or closing the file
    fn write_json<T: Serialize>(&self, path: &str, value: &T) -> Result<(), FsError> {
        let file = self.open_file(path, OpenFlags::WRITE)?;
        let mut handle = Handle::from_file(self, file, path)?;
        serde_json::to_writer_pretty(&mut handle, value)
            .map_err(|e| FsError::Serialization(e.to_string()))?;
        handle.try_flush()?;
        handle.try_close()
    }
}

impl<D: Driver> FsExtJson for D {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FsFile, MemoryDriver};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        name: String,
        retries: u32,
    }

    #[test]
    fn json_round_trip_releases_handles() {
        let driver = MemoryDriver::new();
        let settings = Settings {
            name: "sd".into(),
            retries: 3,
        };
        driver.write_json("/settings.json", &settings).unwrap();
        let back: Settings = driver.read_json("/settings.json").unwrap();
        assert_eq!(back, settings);
        assert_eq!(driver.open_resources(), 0);
    }

    #[test]
    fn invalid_json_is_a_deserialization_error() {
        let driver = MemoryDriver::new();
        let mut file = driver.open_file("/test.txt", OpenFlags::WRITE).unwrap();
        driver.write(&mut file, &[0u8; 100]).unwrap();
        driver.close_file(file).unwrap();

        let result: Result<Settings, _> = driver.read_json("/test.txt");
        assert!(matches!(result, Err(FsError::Deserialization(_))));
        assert_eq!(driver.open_resources(), 0);
    }

    #[test]
    fn missing_file_is_not_found() {
        let result: Result<Settings, _> = MemoryDriver::new().read_json("/nope.json");
        assert!(matches!(result, Err(FsError::NotFound { .. })));
    }
}
