//! Top-level entity identity and wire-name alias tables.

use core::fmt;

/// One wire key <-> struct field pairing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FieldAlias {
    /// Key as it appears in the JSON payload.
    pub wire: &'static str,
    /// Field name on the Rust struct.
    pub field: &'static str,
}

impl FieldAlias {
    pub const fn new(wire: &'static str, field: &'static str) -> Self {
        FieldAlias { wire, field }
    }

    /// Struct field for a wire key, or the key itself when it is not aliased.
    pub fn field_for<'a>(table: &[FieldAlias], wire: &'a str) -> &'a str {
        table.iter().find(|a| a.wire == wire).map(|a| a.field).unwrap_or(wire)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Shutter,
    ThermostatGroup,
    ThermostatUnit,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Shutter => "shutter",
            EntityKind::ThermostatGroup => "thermostat_group",
            EntityKind::ThermostatUnit => "thermostat_unit",
        }
    }

    /// Accepts singular and plural resource names (`shutter`, `shutters`, ...).
    pub fn parse(s: &str) -> Option<EntityKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shutter" | "shutters" => Some(EntityKind::Shutter),
            "thermostat_group" | "thermostat_groups" | "group" | "groups" => Some(EntityKind::ThermostatGroup),
            "thermostat_unit" | "thermostat_units" | "unit" | "units" => Some(EntityKind::ThermostatUnit),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A top-level resource returned by the cloud API.
///
/// `ALIASES` must agree with the serde attributes on the implementing struct.
pub trait Entity {
    const KIND: EntityKind;
    const ALIASES: &'static [FieldAlias];

    fn idx(&self) -> i64;
    fn name(&self) -> &str;

    /// `"{idx}_{name}"`, computed on demand. Used for display and logs only.
    fn identity(&self) -> String {
        format!("{}_{}", self.idx(), self.name())
    }
}
