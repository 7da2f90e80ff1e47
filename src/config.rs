use std::path::PathBuf;

pub const DB_ENV: &str = "LEXDESK_DB";
pub const LOG_ENV: &str = "LEXDESK_LOG";
pub const LOG_DIR_ENV: &str = "LEXDESK_LOG_DIR";
pub const LOG_JSON_ENV: &str = "LEXDESK_LOG_JSON";

pub const DEFAULT_LOG_FILTER: &str = "lexdesk=info,sqlx=warn";
const APP_DIR: &str = "lexdesk";
const DB_FILE: &str = "lexdesk.sqlite3";

/// Runtime settings resolved from the environment. Command line flags are
/// applied on top by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_filter: String,
    /// Daily rolling log files are written here when set.
    pub log_dir: Option<PathBuf>,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            db_path: non_empty(DB_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            log_filter: non_empty(LOG_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            log_dir: non_empty(LOG_DIR_ENV).map(PathBuf::from),
            log_json: non_empty(LOG_JSON_ENV)
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
        }
    }
}

pub fn default_db_path() -> PathBuf {
    let base = dirs::data_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(std::env::temp_dir);
    base.join(APP_DIR).join(DB_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.log_filter, DEFAULT_LOG_FILTER);
        assert!(cfg.log_json);
        assert!(cfg.log_dir.is_none());
        assert!(cfg.db_path.ends_with("lexdesk/lexdesk.sqlite3"));
    }

    #[test]
    fn environment_overrides() {
        let cfg = config(&[
            (DB_ENV, "/tmp/x.sqlite3"),
            (LOG_ENV, "lexdesk=debug"),
            (LOG_DIR_ENV, "/tmp/logs"),
            (LOG_JSON_ENV, "false"),
        ]);
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/x.sqlite3"));
        assert_eq!(cfg.log_filter, "lexdesk=debug");
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert!(!cfg.log_json);
    }

    #[test]
    fn blank_values_fall_back() {
        let cfg = config(&[(LOG_ENV, "  "), (LOG_JSON_ENV, "")]);
        assert_eq!(cfg.log_filter, DEFAULT_LOG_FILTER);
        assert!(cfg.log_json);
    }
}
