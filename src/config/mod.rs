use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::attendance::ServiceSettings;
use crate::modules::board::DEFAULT_RELOAD_DELAY;

pub const DEFAULT_SERVER: &str = "http://localhost:5003";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: String,

    /// Raw `Cookie` header of a logged-in session
    pub session_cookie: Option<String>,

    pub reload_delay_ms: u64,

    pub request_timeout_secs: Option<u64>,

    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            session_cookie: None,
            reload_delay_ms: DEFAULT_RELOAD_DELAY.as_millis() as u64,
            request_timeout_secs: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// CLI values win over the file
    pub fn apply_overrides(
        &mut self,
        server: Option<String>,
        session_cookie: Option<String>,
        reload_delay_ms: Option<u64>,
    ) {
        if let Some(server) = server.filter(|s| !s.trim().is_empty()) {
            self.server = server;
        }
        if let Some(cookie) = session_cookie {
            self.session_cookie = Some(cookie);
        }
        if let Some(delay) = reload_delay_ms {
            self.reload_delay_ms = delay;
        }
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            server: self.server.clone(),
            session_cookie: self.session_cookie.clone(),
            request_timeout: self
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .as_deref()
            .and_then(expand_path)
            .or_else(data_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Load the config file. A missing file yields defaults silently; an
/// unreadable or malformed one yields defaults plus the reason, which the
/// caller logs once logging is up.
pub fn load(explicit: Option<&Path>) -> (Config, Option<String>) {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(config_path) else {
        return (Config::default(), None);
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            return (Config::default(), None)
        }
        Err(err) => {
            return (
                Config::default(),
                Some(format!("{}: {err}", path.display())),
            )
        }
    };
    match parse(&content) {
        Ok(config) => (config, None),
        Err(err) => (
            Config::default(),
            Some(format!("{}: {err}", path.display())),
        ),
    }
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TIMBRA_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("timbra").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("timbra").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "timbra", "timbra")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("timbra"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("timbra"));
    }
    directories::ProjectDirs::from("io", "timbra", "timbra")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    Some(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.reload_delay(), Duration::from_millis(500));
        assert_eq!(config.service_settings().request_timeout, None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = parse(
            r#"
            server = "https://presenze.example.com"
            session_cookie = "session=abc"
            request_timeout_secs = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.server, "https://presenze.example.com");
        assert_eq!(config.reload_delay_ms, 500);
        let settings = config.service_settings();
        assert_eq!(settings.session_cookie.as_deref(), Some("session=abc"));
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(8)));
    }

    #[test]
    fn malformed_explicit_file_falls_back_with_reason() {
        let path = std::env::temp_dir().join(format!("timbra-config-{}.toml", std::process::id()));
        fs::write(&path, "server = [1, 2").unwrap();

        let (config, problem) = load(Some(&path));
        let _ = fs::remove_file(&path);

        assert_eq!(config, Config::default());
        assert!(problem.is_some());
    }

    #[test]
    fn missing_explicit_file_is_reported() {
        let path = std::env::temp_dir().join("timbra-config-does-not-exist.toml");
        let (config, problem) = load(Some(&path));
        assert_eq!(config, Config::default());
        assert!(problem.is_some());
    }

    #[test]
    fn cli_overrides_win() {
        let mut config = parse("server = \"http://file:5003\"\nreload_delay_ms = 900").unwrap();
        config.apply_overrides(
            Some("http://cli:8080".into()),
            Some("session=cli".into()),
            Some(250),
        );
        assert_eq!(config.server, "http://cli:8080");
        assert_eq!(config.session_cookie.as_deref(), Some("session=cli"));
        assert_eq!(config.reload_delay(), Duration::from_millis(250));

        config.apply_overrides(Some("  ".into()), None, None);
        assert_eq!(config.server, "http://cli:8080");
    }

    #[test]
    fn zero_timeout_means_transport_default() {
        let config = parse("request_timeout_secs = 0").unwrap();
        assert_eq!(config.service_settings().request_timeout, None);
    }
}
