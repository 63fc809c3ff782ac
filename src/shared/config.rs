//! Application configuration. Data paths, demo mode, realtime tuning.

use serde::Deserialize;

/// Default capacity for the realtime booking-events channel. Lagged
/// subscribers skip ahead; missed events are recovered by a window refresh.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory for the SQLite database. Read from TUTORBOOK_DATA_DIR.
    pub data_dir: Option<String>,

    /// Run against the in-memory store with demo data instead of SQLite.
    /// Read from TUTORBOOK_IN_MEMORY.
    #[serde(default)]
    pub in_memory: Option<bool>,

    /// Tutor name to preselect at startup. Read from TUTORBOOK_TUTOR.
    #[serde(default)]
    pub tutor: Option<String>,

    /// Realtime event channel capacity. Read from TUTORBOOK_EVENT_CAPACITY.
    #[serde(default)]
    pub event_capacity: Option<usize>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("TUTORBOOK"));
        if let Ok(path) = std::env::var("TUTORBOOK_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    pub fn in_memory_or_default(&self) -> bool {
        self.in_memory.unwrap_or(false)
    }

    pub fn event_capacity_or_default(&self) -> usize {
        self.event_capacity.unwrap_or(DEFAULT_EVENT_CAPACITY)
    }

    /// Tutor preselection. The TUTORBOOK env source already maps
    /// TUTORBOOK_TUTOR into `tutor`.
    pub fn preselected_tutor(&self) -> Option<String> {
        self.tutor.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preselection_reads_the_tutor_field_only() {
        let cfg = AppConfig {
            tutor: Some("Naledi Dlamini".into()),
            ..AppConfig::default()
        };
        assert_eq!(cfg.preselected_tutor().as_deref(), Some("Naledi Dlamini"));
        assert_eq!(AppConfig::default().preselected_tutor(), None);
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_dir_or_default(), "./data");
        assert!(!cfg.in_memory_or_default());
        assert_eq!(cfg.event_capacity_or_default(), DEFAULT_EVENT_CAPACITY);
    }
}
