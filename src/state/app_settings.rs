use livescore_api::store::FileStore;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

pub const SOURCE_URL_VAR: &str = "LIVESCORE_SOURCE_URL";
pub const SEED_VAR: &str = "LIVESCORE_SEED";
pub const DATA_DIR_VAR: &str = "LIVESCORE_DATA_DIR";
pub const LOG_VAR: &str = "LIVESCORE_LOG";

const DEFAULT_SEED: u64 = 42;
const DETAIL_REFRESH: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Mock { seed: u64 },
    Http { url: String },
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub data_dir: PathBuf,
    pub source: SourceConfig,
    pub detail_refresh: Duration,
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let source = match var(SOURCE_URL_VAR) {
            Some(url) => SourceConfig::Http { url },
            None => SourceConfig::Mock {
                seed: var(SEED_VAR).and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_SEED),
            },
        };

        Self {
            full_screen: false,
            log_level: var(LOG_VAR).and_then(|l| l.parse().ok()),
            data_dir: var(DATA_DIR_VAR).map(PathBuf::from).unwrap_or_else(FileStore::default_dir),
            source,
            detail_refresh: DETAIL_REFRESH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_the_seeded_mock_feed() {
        let s = settings(&[]);
        assert_eq!(s.source, SourceConfig::Mock { seed: DEFAULT_SEED });
        assert_eq!(s.log_level, None);
        assert_eq!(s.detail_refresh, Duration::from_secs(30));
        assert!(!s.full_screen);
    }

    #[test]
    fn source_url_selects_http() {
        let s = settings(&[(SOURCE_URL_VAR, "http://localhost:8080"), (SEED_VAR, "7")]);
        assert_eq!(s.source, SourceConfig::Http { url: "http://localhost:8080".into() });
    }

    #[test]
    fn reads_seed_level_and_dir() {
        let s = settings(&[(SEED_VAR, "7"), (LOG_VAR, "debug"), (DATA_DIR_VAR, "/tmp/ls")]);
        assert_eq!(s.source, SourceConfig::Mock { seed: 7 });
        assert_eq!(s.log_level, Some(LevelFilter::Debug));
        assert_eq!(s.data_dir, PathBuf::from("/tmp/ls"));
    }

    #[test]
    fn garbage_values_fall_back() {
        let s = settings(&[(SEED_VAR, "many"), (LOG_VAR, "loud"), (SOURCE_URL_VAR, "  ")]);
        assert_eq!(s.source, SourceConfig::Mock { seed: DEFAULT_SEED });
        assert_eq!(s.log_level, None);
    }
}
