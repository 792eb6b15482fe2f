use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "hikelog.yaml";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemAction {
    Edit,
    Delete,
}

impl ItemAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "edit" => Some(Self::Edit),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    // Path of the list page; item endpoints are derived from it
    #[serde(default = "default_list_path")]
    pub list_path: String,
    #[serde(default = "default_csrf_cookie")]
    pub csrf_cookie: String,
    // Optional session cookie value seeded into the cookie jar (sessionid)
    #[serde(default)]
    pub session_cookie: Option<String>,
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
    // Id of the select control the combobox replaces
    #[serde(default = "default_select_id")]
    pub select_id: String,
    #[serde(default = "default_carousel_interval_ms")]
    pub carousel_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            list_path: default_list_path(),
            csrf_cookie: default_csrf_cookie(),
            session_cookie: None,
            session_cookie_name: default_session_cookie_name(),
            select_id: default_select_id(),
            carousel_interval_ms: default_carousel_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            log_file: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}
fn default_list_path() -> String {
    "/log/".into()
}
fn default_csrf_cookie() -> String {
    "csrftoken".into()
}
fn default_session_cookie_name() -> String {
    "sessionid".into()
}
fn default_select_id() -> String {
    "id_gunung".into()
}
fn default_carousel_interval_ms() -> u64 {
    4000
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn carousel_interval(&self) -> Duration {
        Duration::from_millis(self.carousel_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn list_url(&self) -> Result<url::Url, ConfigError> {
        let base = url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl(self.base_url.clone(), e.to_string()))?;
        base.join(&self.list_path)
            .map_err(|e| ConfigError::InvalidUrl(self.list_path.clone(), e.to_string()))
    }

    pub fn log_path(&self) -> PathBuf {
        match &self.log_file {
            Some(p) => PathBuf::from(p),
            None => std::env::temp_dir().join("hikelog.log"),
        }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("HIKELOG_BASE_URL") {
            if !v.is_empty() {
                self.base_url = v;
            }
        }
        if let Ok(v) = std::env::var("HIKELOG_SESSION") {
            if !v.is_empty() {
                self.session_cookie = Some(v);
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {0:?}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("parsing {0:?}: {1}")]
    Parse(PathBuf, #[source] serde_yaml::Error),
    #[error("invalid url '{0}': {1}")]
    InvalidUrl(String, String),
    #[error("list_path must start with '/': {0}")]
    RelativeListPath(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

pub(crate) fn validate_config(cfg: &AppConfig) -> Result<(), ConfigError> {
    if !cfg.list_path.starts_with('/') {
        return Err(ConfigError::RelativeListPath(cfg.list_path.clone()));
    }
    cfg.list_url()?;
    if cfg.carousel_interval_ms == 0 {
        return Err(ConfigError::Zero("carousel_interval_ms"));
    }
    if cfg.request_timeout_secs == 0 {
        return Err(ConfigError::Zero("request_timeout_secs"));
    }
    if cfg.csrf_cookie.trim().is_empty() {
        return Err(ConfigError::Empty("csrf_cookie"));
    }
    if cfg.select_id.trim().is_empty() {
        return Err(ConfigError::Empty("select_id"));
    }
    Ok(())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    serde_yaml::from_str(&s).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

/// Resolve `hikelog.yaml` from `HIKELOG_CONFIG_DIR`, the CWD, then
/// `~/.config/hikelog`. A missing file means defaults; env overrides apply last.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut cfg = match find_config_file() {
        Some(p) => load_config_from(&p)?,
        None => AppConfig::default(),
    };
    cfg.apply_env();
    validate_config(&cfg)?;
    Ok(cfg)
}

fn find_config_file() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("HIKELOG_CONFIG_DIR") {
        let p = PathBuf::from(dir).join(CONFIG_FILE);
        return p.exists().then_some(p);
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let local = cwd.join(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("hikelog")
                .join(CONFIG_FILE)
        })
        .filter(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        validate_config(&cfg).unwrap();
        assert_eq!(cfg.list_url().unwrap().as_str(), "http://127.0.0.1:8000/log/");
        assert_eq!(cfg.carousel_interval(), Duration::from_millis(4000));
    }

    #[test]
    fn validate_rejects_relative_list_path_and_zero_interval() {
        let cfg = AppConfig {
            list_path: "log/".into(),
            ..Default::default()
        };
        let err = validate_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));

        let cfg = AppConfig {
            carousel_interval_ms: 0,
            ..Default::default()
        };
        let err = validate_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("carousel_interval_ms"));
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let cfg = AppConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&cfg),
            Err(ConfigError::InvalidUrl(..))
        ));
    }

    #[test]
    fn load_from_yaml_fills_missing_fields_with_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "base_url: http://hike.test\nsession_cookie: abc\n").unwrap();
        let cfg = load_config_from(f.path()).unwrap();
        assert_eq!(cfg.base_url, "http://hike.test");
        assert_eq!(cfg.session_cookie.as_deref(), Some("abc"));
        assert_eq!(cfg.list_path, "/log/");
        assert_eq!(cfg.select_id, "id_gunung");
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "carousel_interval_ms: [1, 2").unwrap();
        let err = load_config_from(f.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(..)));
    }

    #[test]
    fn item_action_round_trips_names() {
        assert_eq!(ItemAction::parse("edit"), Some(ItemAction::Edit));
        assert_eq!(ItemAction::parse("delete").map(|a| a.as_str()), Some("delete"));
        assert_eq!(ItemAction::parse("share"), None);
    }
}
