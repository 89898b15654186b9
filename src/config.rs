use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sink::{SinkConfig, StreamTarget};

/// Default collector endpoint for the remote sink
pub const DEFAULT_POST_URL: &str = "https://lc.llnl.gov";

/// Remote deliveries never get less than this
pub const MIN_TIMEOUT_SECS: u64 = 1;

/// Main netout configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Colon-separated attribute names whose events export a snapshot
    pub trigger: String,
    /// Record template; empty means synthesize one from the trigger list
    pub formatstring: String,
    /// `stdout`, `stderr`, `none`, or a file path
    pub filename: String,
    /// Collector URL for the remote sink
    pub posturl: String,
    pub sink: SinkMode,
    /// Upper bound on a single remote delivery
    pub timeout_secs: u64,
    pub log_level: LogLevel,
}

/// Where rendered records go
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkMode {
    /// Write to the stream named by `filename`
    #[default]
    Stream,
    /// POST to `posturl`
    Remote,
}

impl SinkMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stream" => Some(Self::Stream),
            "remote" | "post" | "http" => Some(Self::Remote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger: String::new(),
            formatstring: String::new(),
            filename: "stdout".to_string(),
            posturl: DEFAULT_POST_URL.to_string(),
            sink: SinkMode::default(),
            timeout_secs: 10,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then apply `NETOUT_*` overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let mut candidates = Vec::new();
        if let Ok(env_path) = std::env::var("NETOUT_CONFIG") {
            candidates.push(PathBuf::from(env_path));
        }
        if let Ok(netout_dir) = std::env::var("NETOUT_DIR") {
            candidates.push(PathBuf::from(netout_dir).join("netout.yaml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("netout").join("netout.yaml"));
        }
        candidates.push(PathBuf::from("netout.yaml"));

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Override keys from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override keys from `lookup`, one `NETOUT_<KEY>` variable per key
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("NETOUT_TRIGGER") {
            self.trigger = v;
        }
        if let Some(v) = lookup("NETOUT_FORMATSTRING") {
            self.formatstring = v;
        }
        if let Some(v) = lookup("NETOUT_FILENAME") {
            self.filename = v;
        }
        if let Some(v) = lookup("NETOUT_POSTURL") {
            self.posturl = v;
        }
        if let Some(v) = lookup("NETOUT_SINK") {
            match SinkMode::from_str(&v) {
                Some(mode) => self.sink = mode,
                None => log::warn!("Ignoring unknown NETOUT_SINK value: {}", v),
            }
        }
        if let Some(v) = lookup("NETOUT_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(e) => log::warn!("Ignoring NETOUT_TIMEOUT_SECS={}: {}", v, e),
            }
        }
    }

    /// Resolve the sink this configuration selects
    pub fn sink_config(&self) -> SinkConfig {
        match self.sink {
            SinkMode::Remote => SinkConfig::Remote {
                url: self.posturl.clone(),
                timeout: Duration::from_secs(self.timeout_secs.max(MIN_TIMEOUT_SECS)),
            },
            SinkMode::Stream => match self.filename.as_str() {
                "none" => SinkConfig::Discard,
                "stdout" => SinkConfig::Stream(StreamTarget::Stdout),
                "stderr" => SinkConfig::Stream(StreamTarget::Stderr),
                path => SinkConfig::Stream(StreamTarget::File(Self::expand_path(Path::new(path)))),
            },
        }
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.trigger, "");
        assert_eq!(config.formatstring, "");
        assert_eq!(config.filename, "stdout");
        assert_eq!(config.posturl, DEFAULT_POST_URL);
        assert_eq!(config.sink, SinkMode::Stream);
        assert_eq!(config.sink_config(), SinkConfig::Stream(StreamTarget::Stdout));
    }

    #[test]
    fn test_sink_config_selection() {
        let mut config = Config::default();

        config.filename = "none".to_string();
        assert_eq!(config.sink_config(), SinkConfig::Discard);

        config.filename = "stderr".to_string();
        assert_eq!(config.sink_config(), SinkConfig::Stream(StreamTarget::Stderr));

        config.filename = "/tmp/netout.log".to_string();
        assert_eq!(
            config.sink_config(),
            SinkConfig::Stream(StreamTarget::File(PathBuf::from("/tmp/netout.log")))
        );

        config.sink = SinkMode::Remote;
        config.posturl = "http://collector:8080/ingest".to_string();
        config.timeout_secs = 3;
        assert_eq!(
            config.sink_config(),
            SinkConfig::Remote {
                url: "http://collector:8080/ingest".to_string(),
                timeout: Duration::from_secs(3),
            }
        );
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("NETOUT_TRIGGER", "region:loop"),
            ("NETOUT_FILENAME", "none"),
            ("NETOUT_SINK", "remote"),
            ("NETOUT_POSTURL", ""),
            ("NETOUT_TIMEOUT_SECS", "4"),
        ]));

        assert_eq!(config.trigger, "region:loop");
        assert_eq!(config.filename, "none");
        assert_eq!(config.sink, SinkMode::Remote);
        assert_eq!(config.posturl, "");
        assert_eq!(config.timeout_secs, 4);
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("NETOUT_SINK", "carrier-pigeon"), ("NETOUT_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.sink, SinkMode::Stream);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_zero_timeout_uses_minimum() {
        let config = Config {
            sink: SinkMode::Remote,
            timeout_secs: 0,
            ..Config::default()
        };
        match config.sink_config() {
            SinkConfig::Remote { timeout, .. } => assert_eq!(timeout, Duration::from_secs(MIN_TIMEOUT_SECS)),
            other => panic!("unexpected sink: {:?}", other),
        }
    }

    #[test]
    fn test_parse_yaml_partial() {
        let config: Config = serde_yaml::from_str("trigger: region\nsink: remote\nlog_level: debug\n").unwrap();
        assert_eq!(config.trigger, "region");
        assert_eq!(config.sink, SinkMode::Remote);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.filename, "stdout");
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netout.yaml");
        fs::write(&path, "trigger: a:b\nformatstring: \"%a%\"\n").unwrap();

        let config = Config::load_file_chain(Some(&path)).unwrap();
        assert_eq!(config.trigger, "a:b");
        assert_eq!(config.formatstring, "%a%");
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let path = PathBuf::from("/nonexistent/netout.yaml");
        assert!(Config::load_file_chain(Some(&path)).is_err());
    }

    #[test]
    fn test_expand_path_no_expansion() {
        let path = PathBuf::from("/usr/local/bin");
        assert_eq!(Config::expand_path(&path), PathBuf::from("/usr/local/bin"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(&PathBuf::from("~/records.log"));
        assert!(!expanded.to_string_lossy().contains('~'));
        assert!(expanded.to_string_lossy().ends_with("records.log"));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Warn.as_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::default().as_filter(), log::LevelFilter::Info);
    }
}
