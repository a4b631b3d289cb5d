//! Thermostat groups and units of the OpenMotics cloud API.
//!
//! Group wire shape (abridged):
//!
//! ```text
//! {
//!   "_acl": { "set_state": {"allowed": true}, "set_mode": {"allowed": false} },
//!   "_version": <version>,
//!   "id": <id>, "local_id": <local id>, "name": "<name>",
//!   "schedule": { "data": { "<timestamp>": "AUTO|AWAY|PARTY|VACATION", .. }, "start": .. },
//!   "status": { "mode": "HEATING|COOLING", "state": "ON|OFF" },
//!   "capabilities": ["HEATING", "COOLING"],
//!   "thermostat_ids": { .. }
//! }
//! ```
//!
//! Unit wire shape (abridged):
//!
//! ```text
//! {
//!   "_version": <version>,
//!   "_acl": "<acl>",
//!   "id": <id>, "local_id": <local id>, "name": "<name>",
//!   "location": { "installation_id": .., "room_id": .., "thermostat_group_id": .. },
//!   "status": {
//!     "actual_temperature": <measured>, "current_setpoint": <desired>,
//!     "output_0": <level>, "output_1": <level>, "preset": "AUTO|PARTY|AWAY|VACATION"
//!   }
//! }
//! ```
//!
//! `Configuration` and `GroupLocation` are standalone shapes: the upstream
//! resources document them but the entity structs above do not carry them.

use core::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::entity::{Entity, EntityKind, FieldAlias};
use crate::utils::{lenient_bool, lenient_string, parse_enum_name, serde_enum_name};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThermostatMode {
    Heating,
    Cooling,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThermostatPreset {
    Auto,
    Away,
    Party,
    Vacation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroupLocation {
    pub thermostat_group_id: Option<i64>,
    pub installation_id: Option<i64>,
    pub room_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UnitLocation {
    pub thermostat_group_id: Option<i64>,
    pub installation_id: Option<i64>,
    pub room_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroupStatus {
    pub mode: Option<String>, // HEATING/COOLING
    #[serde(default, deserialize_with = "lenient_bool")]
    pub state: Option<bool>, // true/false or "ON"/"OFF" on the wire
}

impl GroupStatus {
    pub fn known_mode(&self) -> Option<ThermostatMode> {
        self.mode.as_deref().and_then(parse_enum_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UnitStatus {
    pub actual_temperature: Option<f64>,
    pub current_setpoint: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub output_0: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub output_1: Option<String>,
    pub preset: Option<String>,
}

impl UnitStatus {
    pub fn known_preset(&self) -> Option<ThermostatPreset> {
        self.preset.as_deref().and_then(parse_enum_name)
    }
}

/// Preset temperatures, kept as text. Upper-case wire keys and numeric values
/// are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Presets {
    #[serde(default, alias = "AWAY", deserialize_with = "lenient_string")]
    pub away: Option<String>,
    #[serde(default, alias = "PARTY", deserialize_with = "lenient_string")]
    pub party: Option<String>,
    #[serde(default, alias = "VACATION", deserialize_with = "lenient_string")]
    pub vacation: Option<String>,
}

/// Shared by groups and unit configuration presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schedule {
    pub data: Option<BTreeMap<String, Value>>, // keyed by timestamp string
    #[serde(default, deserialize_with = "lenient_string")]
    pub start: Option<String>,
}

impl Schedule {
    /// Entries whose key is an integer timestamp, in ascending order.
    /// Non-numeric keys are skipped.
    pub fn transitions(&self) -> Vec<(i64, &Value)> {
        let mut out = self
            .data
            .iter()
            .flatten()
            .filter_map(|(k, v)| k.trim().parse::<i64>().ok().map(|ts| (ts, v)))
            .collect::<Vec<_>>();
        out.sort_by_key(|(ts, _)| *ts);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigurationPreset {
    pub output_0_id: Option<i64>,
    pub output_1_id: Option<i64>,
    pub presets: Option<Presets>,
    pub schedule: Option<Schedule>,
    pub sensor_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Configuration {
    pub heating: Option<ConfigurationPreset>,
    pub cooling: Option<ConfigurationPreset>,
}

impl Configuration {
    pub fn for_mode(&self, mode: ThermostatMode) -> Option<&ConfigurationPreset> {
        match mode {
            ThermostatMode::Heating => self.heating.as_ref(),
            ThermostatMode::Cooling => self.cooling.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Allowed {
    pub allowed: Option<bool>,
}

/// Permission flags for group-level actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Acl {
    pub set_state: Option<Allowed>,
    pub set_mode: Option<Allowed>,
}

impl Acl {
    pub fn can_set_state(&self) -> Option<bool> {
        self.set_state.as_ref().and_then(|a| a.allowed)
    }

    pub fn can_set_mode(&self) -> Option<bool> {
        self.set_mode.as_ref().and_then(|a| a.allowed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatGroup {
    #[serde(rename = "id")]
    pub idx: i64,
    pub local_id: i64,
    pub name: String,
    pub schedule: Option<Schedule>,
    pub capabilities: Option<Vec<Value>>,
    #[serde(rename = "_version", default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
    pub thermostat_ids: Option<BTreeMap<String, Value>>,
    pub status: Option<GroupStatus>,
    #[serde(rename = "_acl")]
    pub acl: Option<Acl>,
}

impl ThermostatGroup {
    /// Whether the group advertises `mode` in its capabilities.
    pub fn supports(&self, mode: ThermostatMode) -> bool {
        let Some(name) = serde_enum_name(&mode) else {
            return false;
        };
        self.capabilities
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .any(|c| c.as_str() == Some(name.as_str()))
    }
}

impl Entity for ThermostatGroup {
    const KIND: EntityKind = EntityKind::ThermostatGroup;
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("id", "idx"),
        FieldAlias::new("_version", "version"),
        FieldAlias::new("_acl", "acl"),
    ];

    fn idx(&self) -> i64 {
        self.idx
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ThermostatGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.idx, self.name)
    }
}

/// Note: `acl` is a bare string here while groups carry a structured [`Acl`].
/// Both shapes are accepted as the API returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatUnit {
    #[serde(rename = "id")]
    pub idx: i64,
    pub local_id: Option<i64>,
    pub name: String,
    pub location: Option<UnitLocation>,
    pub status: Option<UnitStatus>,
    #[serde(rename = "_version", default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
    #[serde(rename = "_acl")]
    pub acl: Option<String>,
}

impl Entity for ThermostatUnit {
    const KIND: EntityKind = EntityKind::ThermostatUnit;
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("id", "idx"),
        FieldAlias::new("_version", "version"),
        FieldAlias::new("_acl", "acl"),
    ];

    fn idx(&self) -> i64 {
        self.idx
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ThermostatUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.idx, self.name)
    }
}
