use std::env;

use anyhow::Context;

use crate::format::Palette;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub palette: Palette,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let max_connections = match lookup("QCFORGE_DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("QCFORGE_DB_MAX_CONNECTIONS is not a number: {raw:?}"))?
                .max(1),
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let palette = match lookup("QCFORGE_PALETTE") {
            Some(raw) => Palette::new(
                raw.split(',')
                    .map(str::trim)
                    .filter(|color| !color.is_empty()),
            )
            .context("QCFORGE_PALETTE has no colors")?,
            None => Palette::default(),
        };

        Ok(Self {
            database_url,
            max_connections,
            palette,
        })
    }

    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to a production Postgres instance (or pass --input)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.palette, Palette::default());
        assert!(config.require_database_url().is_err());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://qc@localhost/qcforge"),
            ("QCFORGE_DB_MAX_CONNECTIONS", "12"),
            ("QCFORGE_PALETTE", "#111, #222 ,"),
        ]))
        .unwrap();
        assert_eq!(config.require_database_url().unwrap(), "postgres://qc@localhost/qcforge");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.palette.colors(), ["#111", "#222"]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("QCFORGE_DB_MAX_CONNECTIONS", "many")])).is_err());
        assert!(Config::from_lookup(lookup(&[("QCFORGE_PALETTE", " , ")])).is_err());
    }
}
