//! Runtime configuration for the inspection binary.
//! Everything has a default; the library itself needs no configuration.

use crate::entity::EntityKind;
use std::path::PathBuf;

pub const DEFAULT_KIND: EntityKind = EntityKind::Shutter;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Resource type the payload holds.
    pub kind: EntityKind,
    /// Payload file; `None` reads stdin.
    pub input: Option<PathBuf>,
    /// Pretty-print the canonical JSON written to stdout.
    pub pretty: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind = match lookup("OPENMOTICS_KIND") {
            Some(v) if !v.trim().is_empty() => parse_kind(&v)?,
            _ => DEFAULT_KIND,
        };

        let input = lookup("OPENMOTICS_INPUT").and_then(|v| parse_input(&v));

        let pretty = lookup("OPENMOTICS_PRETTY")
            .map(|s| matches!(s.trim(), "1" | "true" | "TRUE"))
            .unwrap_or(true);

        Ok(Config { kind, input, pretty })
    }

    /// Apply `--kind` / `--input` overrides from the command line.
    pub fn with_overrides(mut self, kind: Option<&str>, input: Option<&str>) -> Result<Self, String> {
        if let Some(k) = kind {
            self.kind = parse_kind(k)?;
        }
        if let Some(i) = input {
            self.input = parse_input(i);
        }
        Ok(self)
    }
}

fn parse_kind(s: &str) -> Result<EntityKind, String> {
    EntityKind::parse(s).ok_or_else(|| {
        format!(
            "unknown resource kind `{}` (expected shutters, thermostat_groups or thermostat_units)",
            s.trim()
        )
    })
}

fn parse_input(s: &str) -> Option<PathBuf> {
    match s.trim() {
        "" | "-" => None,
        path => Some(PathBuf::from(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.kind, EntityKind::Shutter);
        assert_eq!(cfg.input, None);
        assert!(cfg.pretty);
    }

    #[test]
    fn reads_all_variables() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("OPENMOTICS_KIND", "thermostat_units"),
            ("OPENMOTICS_INPUT", "payload.json"),
            ("OPENMOTICS_PRETTY", "0"),
        ]))
        .unwrap();
        assert_eq!(cfg.kind, EntityKind::ThermostatUnit);
        assert_eq!(cfg.input, Some(PathBuf::from("payload.json")));
        assert!(!cfg.pretty);
    }

    #[test]
    fn dash_means_stdin() {
        let cfg = Config::from_lookup(lookup_from(&[("OPENMOTICS_INPUT", "-")])).unwrap();
        assert_eq!(cfg.input, None);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = Config::from_lookup(lookup_from(&[("OPENMOTICS_KIND", "outputs")])).unwrap_err();
        assert!(err.contains("outputs"));
    }

    #[test]
    fn cli_overrides_env() {
        let cfg = Config::from_lookup(lookup_from(&[("OPENMOTICS_KIND", "shutters")]))
            .unwrap()
            .with_overrides(Some("groups"), Some("/tmp/g.json"))
            .unwrap();
        assert_eq!(cfg.kind, EntityKind::ThermostatGroup);
        assert_eq!(cfg.input, Some(PathBuf::from("/tmp/g.json")));
    }
}
