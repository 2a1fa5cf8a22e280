use log::LevelFilter;
use std::time::Duration;

pub const LOG_LEVEL_VAR: &str = "HANDBALL_LOG";
pub const REFRESH_VAR: &str = "HANDBALL_REFRESH_SECS";
const DEFAULT_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: LevelFilter,
    /// `None` disables background refresh.
    pub refresh_every: Option<Duration>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: LevelFilter::Warn,
            refresh_every: Some(Duration::from_secs(DEFAULT_REFRESH_SECS)),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let log_level = lookup(LOG_LEVEL_VAR)
            .and_then(|level| level.trim().parse::<LevelFilter>().ok())
            .unwrap_or(defaults.log_level);
        let refresh_every = match lookup(REFRESH_VAR).map(|secs| secs.trim().parse::<u64>()) {
            Some(Ok(0)) => None,
            Some(Ok(secs)) => Some(Duration::from_secs(secs)),
            _ => defaults.refresh_every,
        };
        Self { full_screen: false, log_level, refresh_every }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let settings = AppSettings::from_lookup(|_| None);
        assert_eq!(settings.log_level, LevelFilter::Warn);
        assert_eq!(settings.refresh_every, Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_disables_refresh() {
        let settings = AppSettings::from_lookup(|key| match key {
            REFRESH_VAR => Some("0".into()),
            LOG_LEVEL_VAR => Some("debug".into()),
            _ => None,
        });
        assert_eq!(settings.refresh_every, None);
        assert_eq!(settings.log_level, LevelFilter::Debug);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let settings = AppSettings::from_lookup(|_| Some("soon".into()));
        assert_eq!(settings.log_level, LevelFilter::Warn);
        assert_eq!(settings.refresh_every, Some(Duration::from_secs(30)));
    }
}
