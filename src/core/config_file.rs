/*
 * A key=value configuration store with line-oriented text persistence.
 * Keys map to `Value` payloads; serialization iterates the underlying
 * `BTreeMap`, so the file order is deterministic (lexicographic by key).
 *
 * Loading is permissive by contract: a line without an '=' is skipped, and a
 * value that fails to parse is stored anyway in whatever state the parse
 * attempt left behind. Only the file-open step can fail a save or load;
 * malformed content inside an openable file never does. Callers that need
 * stricter validation check the stored values themselves.
 */
use super::obfuscation::{self, ObfuscationKey};
use super::value::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    FileNotFound(PathBuf),
    FileCantOpen(PathBuf),
    FileAlreadyInUse(PathBuf),
    Io(io::Error),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "File not found: {path:?}"),
            ConfigError::FileCantOpen(path) => write!(f, "File cannot be opened: {path:?}"),
            ConfigError::FileAlreadyInUse(path) => write!(f, "File is already in use: {path:?}"),
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Clone)]
pub struct ConfigFile {
    values: BTreeMap<String, Value>,
}

impl ConfigFile {
    pub fn new() -> Self {
        ConfigFile {
            values: BTreeMap::new(),
        }
    }

    pub fn set_value<V: Into<Value>>(&mut self, key: &str, value: V) {
        self.values.insert(key.to_string(), value.into());
    }

    /*
     * Returns the stored value for `key`, or `default` when the key is
     * absent. Combined with the permissive reads on `Value`, this lets
     * callers pull settings out of a partially populated file without
     * special-casing every miss.
     */
    pub fn get_value(&self, key: &str, default: Value) -> Value {
        match self.values.get(key) {
            Some(value) => value.clone(),
            None => default,
        }
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn erase_value(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    fn open_error(path: &Path, error: io::Error) -> ConfigError {
        match error.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ConfigError::FileCantOpen(path.to_path_buf()),
            io::ErrorKind::ResourceBusy => ConfigError::FileAlreadyInUse(path.to_path_buf()),
            _ => ConfigError::Io(error),
        }
    }

    fn serialize_lines(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.values {
            out.push_str(key);
            out.push('=');
            out.push_str(&value.serialize());
            out.push('\n');
        }
        out
    }

    /*
     * Merges `bytes` into the store. Matching keys are replaced; keys absent
     * from the text keep whatever the caller put there beforehand. Parse
     * failures are logged at debug level and the partial value is stored
     * regardless.
     */
    fn load_from_bytes(&mut self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        for line in text.split('\n') {
            let Some(separator) = line.find('=') else {
                continue;
            };
            let key = &line[..separator];
            let raw = &line[separator + 1..];
            let mut value = Value::default();
            if let Err(error) = value.parse(raw) {
                log::debug!("ConfigFile: value for key '{key}' did not parse cleanly: {error}");
            }
            self.values.insert(key.to_string(), value);
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Self::open_error(path, e))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.serialize_lines().as_bytes())?;
        writer.flush()?;
        log::debug!("ConfigFile: Saved {} entries to {path:?}.", self.values.len());
        Ok(())
    }

    pub fn load(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path).map_err(|e| Self::open_error(path, e))?;
        self.load_from_bytes(&bytes);
        log::debug!("ConfigFile: Loaded {} entries from {path:?}.", self.values.len());
        Ok(())
    }

    pub fn save_obfuscated(&self, path: &Path, key: &ObfuscationKey) -> Result<()> {
        let file = File::create(path).map_err(|e| Self::open_error(path, e))?;
        let mut writer = BufWriter::new(file);
        let mut bytes = self.serialize_lines().into_bytes();
        obfuscation::transform_in_place(&mut bytes, key);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_obfuscated(&mut self, path: &Path, key: &ObfuscationKey) -> Result<()> {
        let mut bytes = std::fs::read(path).map_err(|e| Self::open_error(path, e))?;
        obfuscation::transform_in_place(&mut bytes, key);
        self.load_from_bytes(&bytes);
        Ok(())
    }
}
