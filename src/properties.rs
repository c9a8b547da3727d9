use std::{collections::HashMap, fmt::Display, fs::File, io::BufReader, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const HUF_ONE_GB: u64 = 1_000_000_000;
pub const HUF_TEN_MB: u64 = 10_000_000;

const KEY_COMPRESS_MAX: &str = "macrochunk.compress.max";
const KEY_DECOMPRESS_MAX: &str = "macrochunk.decompress.max";
const KEY_THREADS: &str = "threads";
const KEY_GRAIN: &str = "parallel.grain";

/// Tuning knobs of the compression engine. None of them changes the produced bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest macrochunk read at once while compressing.
    pub compress_macrochunk_max: u64,
    /// Largest payload slice read at once while decompressing.
    pub decompress_macrochunk_max: u64,
    /// Worker threads of the parallel strategy, 0 lets rayon decide.
    pub threads: usize,
    /// Minimum number of bytes handed to one parallel task.
    pub parallel_grain: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compress_macrochunk_max: HUF_ONE_GB,
            decompress_macrochunk_max: HUF_TEN_MB,
            threads: 0,
            parallel_grain: 1 << 16,
        }
    }
}

impl EngineConfig {
    /// Reads a Java-style `.properties` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let values = java_properties::read(BufReader::new(file)).map_err(|e| Error::Config(e.to_string()))?;

        Self::try_from(values)
    }

    pub fn validate(&self) -> Result<()> {
        if self.compress_macrochunk_max == 0 {
            return Err(Error::Config(format!("{KEY_COMPRESS_MAX} must be positive")));
        }
        if self.decompress_macrochunk_max == 0 {
            return Err(Error::Config(format!("{KEY_DECOMPRESS_MAX} must be positive")));
        }
        if self.parallel_grain == 0 {
            return Err(Error::Config(format!("{KEY_GRAIN} must be positive")));
        }
        Ok(())
    }
}

fn parse_value<T>(values: &HashMap<String, String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    values
        .get(key)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|e| Error::Config(format!("bad value {v:?} for {key}: {e}")))
        })
        .transpose()
}

impl TryFrom<HashMap<String, String>> for EngineConfig {
    type Error = Error;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        let mut config = EngineConfig::default();

        if let Some(max) = parse_value(&value, KEY_COMPRESS_MAX)? {
            config.compress_macrochunk_max = max;
        }
        if let Some(max) = parse_value(&value, KEY_DECOMPRESS_MAX)? {
            config.decompress_macrochunk_max = max;
        }
        if let Some(threads) = parse_value(&value, KEY_THREADS)? {
            config.threads = threads;
        }
        if let Some(grain) = parse_value(&value, KEY_GRAIN)? {
            config.parallel_grain = grain;
        }

        config.validate()?;
        Ok(config)
    }
}

impl From<EngineConfig> for String {
    fn from(val: EngineConfig) -> Self {
        let mut s = String::new();

        s.push_str("#BCP engine properties\n");
        s.push_str(&format!("{KEY_COMPRESS_MAX}={}\n", val.compress_macrochunk_max));
        s.push_str(&format!("{KEY_DECOMPRESS_MAX}={}\n", val.decompress_macrochunk_max));
        s.push_str(&format!("{KEY_THREADS}={}\n", val.threads));
        s.push_str(&format!("{KEY_GRAIN}={}\n", val.parallel_grain));

        s
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use crate::error::Error;

    use super::EngineConfig;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = EngineConfig::try_from(HashMap::new()).unwrap();

        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.compress_macrochunk_max, 1_000_000_000);
        assert_eq!(config.decompress_macrochunk_max, 10_000_000);
    }

    #[test]
    fn test_known_keys_override_and_unknown_are_ignored() {
        let config = EngineConfig::try_from(map(&[
            ("macrochunk.compress.max", "4096"),
            ("macrochunk.decompress.max", " 17 "),
            ("threads", "2"),
            ("nodes", "12"),
        ]))
        .unwrap();

        assert_eq!(config.compress_macrochunk_max, 4096);
        assert_eq!(config.decompress_macrochunk_max, 17);
        assert_eq!(config.threads, 2);
        assert_eq!(config.parallel_grain, 1 << 16);
    }

    #[test]
    fn test_bad_values() {
        for pairs in [
            [("threads", "many")],
            [("macrochunk.compress.max", "-1")],
            [("macrochunk.decompress.max", "0")],
            [("parallel.grain", "0")],
        ] {
            assert!(matches!(EngineConfig::try_from(map(&pairs)), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_properties_file_round_trip() {
        let config = EngineConfig {
            compress_macrochunk_max: 123,
            decompress_macrochunk_max: 45,
            threads: 3,
            parallel_grain: 6,
        };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        let text: String = config.clone().into();
        file.write_all(text.as_bytes()).unwrap();
        file.flush().unwrap();

        assert_eq!(EngineConfig::load(file.path()).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(EngineConfig::load(dir.path().join("none.properties")), Err(Error::Io(_))));
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let config: EngineConfig = serde_json::from_str(r#"{"threads": 4}"#).unwrap();

        assert_eq!(config.threads, 4);
        assert_eq!(config.compress_macrochunk_max, EngineConfig::default().compress_macrochunk_max);
    }
}
