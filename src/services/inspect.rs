//! Decode a payload of one resource kind and summarize what came out.

use crate::decode::{decode_collection, decode_str, encode, SchemaValidationError};
use crate::entity::{Entity, EntityKind, FieldAlias};
use crate::models::shutter::Shutter;
use crate::models::thermostat::{ThermostatGroup, ThermostatUnit};
use core::fmt;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum InspectError {
    /// Reading the payload failed.
    Io(std::io::Error),
    /// The payload did not match the schema.
    Validation(SchemaValidationError),
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectError::Io(e) => write!(f, "io error: {}", e),
            InspectError::Validation(e) => write!(f, "{}", e),
        }
    }
}

impl Error for InspectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InspectError::Io(e) => Some(e),
            InspectError::Validation(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for InspectError {
    fn from(value: std::io::Error) -> Self {
        InspectError::Io(value)
    }
}

impl From<SchemaValidationError> for InspectError {
    fn from(value: SchemaValidationError) -> Self {
        InspectError::Validation(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub kind: EntityKind,
    /// `"{idx}_{name}"` per decoded entity, in payload order.
    pub identities: Vec<String>,
    /// Re-encoded entities, using the wire keys.
    pub canonical: Value,
}

/// Read a payload from `path`, or stdin when `None`.
pub fn read_payload(path: Option<&Path>) -> Result<String, InspectError> {
    match path {
        Some(p) => Ok(std::fs::read_to_string(p)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

pub fn inspect_str(kind: EntityKind, raw: &str) -> Result<Summary, InspectError> {
    let value: Value = decode_str(raw)?;
    inspect_value(kind, value)
}

pub fn inspect_value(kind: EntityKind, raw: Value) -> Result<Summary, InspectError> {
    match kind {
        EntityKind::Shutter => summarize::<Shutter>(raw, audit_shutter),
        EntityKind::ThermostatGroup => summarize::<ThermostatGroup>(raw, audit_group),
        EntityKind::ThermostatUnit => summarize::<ThermostatUnit>(raw, audit_unit),
    }
}

fn summarize<T>(raw: Value, audit: fn(&T)) -> Result<Summary, InspectError>
where
    T: Entity + DeserializeOwned + Serialize,
{
    debug!(
        "{} wire aliases: {}",
        T::KIND,
        T::ALIASES
            .iter()
            .map(|a| format!("{} -> {}", a.wire, a.field))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let entities: Vec<T> = decode_collection(raw).inspect_err(|e| {
        if let Some(field) = failing_field::<T>(e) {
            warn!("{} payload rejected in field `{}`", T::KIND, field);
        }
    })?;
    info!("Decoded {} {} entit{}", entities.len(), T::KIND, if entities.len() == 1 { "y" } else { "ies" });

    let mut identities = Vec::with_capacity(entities.len());
    let mut canonical = Vec::with_capacity(entities.len());
    for entity in &entities {
        debug!("{} {}", T::KIND, entity.identity());
        audit(entity);
        identities.push(entity.identity());
        canonical.push(encode(entity)?);
    }

    Ok(Summary {
        kind: T::KIND,
        identities,
        canonical: Value::Array(canonical),
    })
}

/// Top-level struct field of `T` that a validation error points at, with wire
/// keys translated through `T::ALIASES`. The collection prefix (`data[3]`) is skipped.
pub fn failing_field<T: Entity>(err: &SchemaValidationError) -> Option<&str> {
    let path = err.path();
    let path = path.strip_prefix("data").unwrap_or(path);
    let path = match path.strip_prefix('[') {
        Some(rest) => rest.split_once(']').map(|(_, tail)| tail).unwrap_or(rest),
        None => path,
    };
    let path = path.strip_prefix('.').unwrap_or(path);

    let key = if path.is_empty() {
        err.missing_field()?
    } else {
        path.split(['.', '[']).next().unwrap_or(path)
    };
    Some(FieldAlias::field_for(T::ALIASES, key))
}

fn audit_shutter(s: &Shutter) {
    if let Some(state) = s.status.state.as_deref()
        && s.status.known_state().is_none()
    {
        warn!("Shutter {}: unrecognised state {:?}", s, state);
    }
}

fn audit_group(g: &ThermostatGroup) {
    if let Some(status) = g.status.as_ref()
        && let Some(mode) = status.mode.as_deref()
        && status.known_mode().is_none()
    {
        warn!("Thermostat group {}: unrecognised mode {:?}", g, mode);
    }
}

fn audit_unit(u: &ThermostatUnit) {
    if let Some(status) = u.status.as_ref()
        && let Some(preset) = status.preset.as_deref()
        && status.known_preset().is_none()
    {
        warn!("Thermostat unit {}: unrecognised preset {:?}", u, preset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summarizes_shutter_fixture() {
        let raw = read_payload(Some(Path::new("tests/data/shutters.json"))).expect("fixture present");
        let summary = inspect_str(EntityKind::Shutter, &raw).unwrap();
        assert_eq!(summary.kind, EntityKind::Shutter);
        assert_eq!(summary.identities, vec!["12_Kitchen Shutter", "13_Attic"]);
        assert_eq!(summary.canonical[0]["type"], json!("shutter"));
        assert_eq!(summary.canonical[1]["_version"], Value::Null);
    }

    #[test]
    fn summarizes_units_with_string_acl() {
        let summary = inspect_value(
            EntityKind::ThermostatUnit,
            json!([{"id": 8, "name": "Bathroom", "_acl": "some-string", "status": {"preset": "BOOST"}}]),
        )
        .unwrap();
        assert_eq!(summary.identities, vec!["8_Bathroom"]);
        assert_eq!(summary.canonical[0]["_acl"], json!("some-string"));
    }

    #[test]
    fn validation_failure_is_surfaced() {
        let err = inspect_value(EntityKind::ThermostatGroup, json!({"data": [{"id": 1, "name": "x"}]})).unwrap_err();
        match err {
            InspectError::Validation(e) => {
                assert!(e.is_missing_field());
                assert_eq!(e.path(), "data[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failing_field_translates_wire_keys() {
        let group = json!({"id": 1, "local_id": 0, "name": "x", "_acl": "some-string"});
        let err = decode_collection::<ThermostatGroup>(json!({"data": [group]})).unwrap_err();
        assert_eq!(err.path(), "data[0]._acl");
        assert_eq!(failing_field::<ThermostatGroup>(&err), Some("acl"));

        let err = decode_collection::<Shutter>(json!([{"name": "x", "type": "shutter", "status": {}}])).unwrap_err();
        assert_eq!(failing_field::<Shutter>(&err), Some("idx"));

        let err = decode_collection::<Shutter>(json!({"id": 1, "name": "x", "type": 4, "status": {}})).unwrap_err();
        assert_eq!(failing_field::<Shutter>(&err), Some("shutter_type"));

        let err = decode_collection::<ThermostatUnit>(json!([{"id": 1, "name": "x", "status": {"output_0": [1]}}]))
            .unwrap_err();
        assert_eq!(failing_field::<ThermostatUnit>(&err), Some("status"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_payload(Some(Path::new("tests/data/does-not-exist.json"))).unwrap_err();
        assert!(matches!(err, InspectError::Io(_)));
    }
}
