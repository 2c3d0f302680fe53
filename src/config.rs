use std::{env, path::PathBuf};

const DEFAULT_ROSTER: [&str; 4] = ["Coach Alex", "Coach Jordan", "Coach Sam", "Coach Taylor"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Csv(PathBuf),
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreKind,
    pub roster: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let store = match lookup("H2O_STORE").as_deref().map(str::trim) {
            Some("memory") => StoreKind::Memory,
            _ => StoreKind::Csv(
                lookup("H2O_DATA_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("data/intake.csv")),
            ),
        };

        let roster: Vec<String> = lookup("H2O_ROSTER")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let roster = if roster.is_empty() {
            DEFAULT_ROSTER.iter().map(|name| name.to_string()).collect()
        } else {
            roster
        };

        Self {
            port,
            store,
            roster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.store, StoreKind::Csv(PathBuf::from("data/intake.csv")));
        assert_eq!(config.roster.len(), 4);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("H2O_STORE", "memory"),
            ("H2O_ROSTER", "Ana, Bo,,"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.roster, vec!["Ana".to_string(), "Bo".to_string()]);
    }
}
