//! JSON configuration files with create-on-first-run defaults.
//!
//! Applications describe where their config lives through [`AppConfig`];
//! [`load`] then reads the file, first writing one with default values if
//! nothing exists yet. Paths default to `$HOME/.config/<app>/<file>`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

/// Types that can live in an application config file.
pub trait AppConfig: Serialize + DeserializeOwned {
    /// Directory name under `~/.config` holding this app's files.
    const APP_NAME: &'static str;
    /// File name used when no explicit path is given.
    const FILE_NAME: &'static str;
}

/// A config value together with where it came from.
#[derive(Debug, Clone)]
pub struct Loaded<C> {
    /// The parsed configuration.
    pub config: C,
    /// The file it was read from.
    pub path: PathBuf,
    /// True when the file did not exist and was created with defaults.
    pub created: bool,
}

/// Read a JSON file into any deserializable value.
pub fn read<C: DeserializeOwned>(path: &Path) -> Result<C> {
    let file = File::open(path).map_err(|e| Error::config_io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| json_error(path, e))
}

/// Load a config file, creating it from `default` when missing.
///
/// With a `path` of `None` the file lives at
/// `$HOME/.config/<APP_NAME>/<FILE_NAME>`. The value is always read back
/// from disk, so hand-edited files win over the built-in defaults.
pub fn load<C: AppConfig>(path: Option<&Path>, default: C) -> Result<Loaded<C>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path::<C>()?,
    };

    let created = match fs::metadata(&path) {
        Ok(_) => false,
        Err(e) if e.kind() == ErrorKind::NotFound => true,
        Err(e) => return Err(Error::config_io(&path, e)),
    };
    if created {
        write_default(&path, &default)?;
        info!("Created default config at {}", path.display());
    }

    let config = read(&path)?;
    Ok(Loaded {
        config,
        path,
        created,
    })
}

/// Write `value` as pretty-printed JSON, creating parent directories.
pub fn write_default<C: Serialize>(path: &Path, value: &C) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::config_io(dir, e))?;
    }
    let file = File::create(path).map_err(|e| Error::config_io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| json_error(path, e))?;
    writer.flush().map_err(|e| Error::config_io(path, e))
}

/// Default location: `$HOME/.config/<APP_NAME>/<FILE_NAME>`.
pub fn default_config_path<C: AppConfig>() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or(Error::HomeNotFound)?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join(C::APP_NAME)
        .join(C::FILE_NAME))
}

/// Keep I/O failures surfaced through serde_json apart from syntax errors.
fn json_error(path: &Path, err: serde_json::Error) -> Error {
    if err.is_io() {
        Error::config_io(path, err.into())
    } else {
        Error::config_parse(path, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestConfig {
        a: String,
        b: i64,
        kv: BTreeMap<String, String>,
    }

    impl AppConfig for TestConfig {
        const APP_NAME: &'static str = "repool-test";
        const FILE_NAME: &'static str = "test.cfg.json";
    }

    fn sample() -> TestConfig {
        TestConfig {
            a: "AVal".to_string(),
            b: 1234,
            kv: BTreeMap::from([
                ("A".to_string(), "a".to_string()),
                ("B".to_string(), "b".to_string()),
            ]),
        }
    }

    const SAMPLE_JSON: &str = r#"{
  "a": "AVal",
  "b": 1234,
  "kv": {
    "A": "a",
    "B": "b"
  }
}"#;

    #[test]
    fn test_creates_default_config_file() {
        let path = std::env::temp_dir().join("repool-create-test.cfg.json");
        let _ = fs::remove_file(&path);

        let loaded = load(Some(path.as_path()), sample()).unwrap();
        assert!(loaded.created);
        assert_eq!(loaded.path, path);
        assert_eq!(loaded.config, sample());

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, SAMPLE_JSON);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_loads_existing_file_over_defaults() {
        let path = std::env::temp_dir().join("repool-existing-test.cfg.json");
        fs::write(&path, SAMPLE_JSON).unwrap();

        let mut other = sample();
        other.a = "ignored default".to_string();
        other.b = 9;

        let loaded = load(Some(path.as_path()), other).unwrap();
        assert!(!loaded.created);
        assert_eq!(loaded.config, sample());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("repool-no-such-file.cfg.json");
        let _ = fs::remove_file(&path);

        let err = read::<TestConfig>(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigIo { .. }));
    }

    #[test]
    fn test_read_rejects_invalid_json() {
        let path = std::env::temp_dir().join("repool-bad-json-test.cfg.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read::<TestConfig>(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_default_path_under_home() {
        if std::env::var_os("HOME").is_none() {
            return;
        }
        let path = default_config_path::<TestConfig>().unwrap();
        assert!(path.ends_with(".config/repool-test/test.cfg.json"));
    }
}
