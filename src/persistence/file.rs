use super::{PersistenceError, PersistenceResult, SettingsStore};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Settings kept as one JSON object on disk. A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> PersistenceResult<BTreeMap<String, String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        let value: serde_json::Value = serde_json::from_reader(file)?;
        match value {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| match value {
                    serde_json::Value::String(text) => Ok((key, text)),
                    other => Err(PersistenceError::InvalidData(format!(
                        "settings key '{key}' holds {other} instead of a string"
                    ))),
                })
                .collect(),
            _ => Err(PersistenceError::InvalidData(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, values)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> PersistenceResult<()> {
        let _guard = self.lock.lock();
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }
}
