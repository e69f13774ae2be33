//! Configuration access port trait.

/// Boolean spellings accepted in settings files.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// `[section] key = value` settings.
///
/// Adapters only supply raw strings. The typed getters fall back to `default`
/// when the key is missing or unparsable; [`crate::domain::config_validation`]
/// rejects the latter before settings are built.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get_string(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.get_string(section, key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .and_then(|v| parse_flag(&v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(&'static str, &'static str), &'static str>);

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0
                .iter()
                .find(|((s, k), _)| *s == section && *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn flags_accept_common_spellings() {
        for raw in ["true", "YES", " on ", "1"] {
            assert_eq!(parse_flag(raw), Some(true), "{raw:?}");
        }
        for raw in ["false", "No", "off", "0"] {
            assert_eq!(parse_flag(raw), Some(false), "{raw:?}");
        }
        assert_eq!(parse_flag("sometimes"), None);
    }

    #[test]
    fn typed_getters_parse_or_fall_back() {
        let config = MapConfig(HashMap::from([
            (("chart", "width"), " 1600 "),
            (("chart", "height"), "tall"),
            (("backtest", "commission"), "0.001"),
            (("backtest", "trade_on_close"), "yes"),
        ]));
        assert_eq!(config.get_int("chart", "width", 0), 1600);
        assert_eq!(config.get_int("chart", "height", 800), 800);
        assert_eq!(config.get_int("chart", "missing", 7), 7);
        assert_eq!(config.get_double("backtest", "commission", 0.0), 0.001);
        assert!(config.get_bool("backtest", "trade_on_close", false));
        assert!(!config.get_bool("backtest", "missing", false));
    }
}
