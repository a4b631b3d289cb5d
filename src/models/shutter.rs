//! Shutter resource of the OpenMotics cloud API.
//!
//! Wire shape (abridged):
//!
//! ```text
//! {
//!   "_version": <version>,
//!   "id": <id>,
//!   "local_id": <local id>,
//!   "name": "<name>",
//!   "type": "<type>",
//!   "capabilities": ["UP_DOWN", "POSITION", "RELATIVE_POSITION",
//!                    "HW_LOCK"|"CLOUD_LOCK", "PRESET", "CHANGE_PRESET"],
//!   "location": { "floor_coordinates": {"x": .., "y": ..}, "floor_id": ..,
//!                 "installation_id": <installation id>, "room_id": .. },
//!   "status": {
//!     "last_change": <epoch in seconds>,
//!     "position": null | <position>,
//!     "state": null | "UP|DOWN|STOP|GOING_UP|GOING_DOWN",
//!     "locked": true | false,
//!     "manual_override": true | false
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use core::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{Entity, EntityKind, FieldAlias};
use crate::models::location::Location;
use crate::utils::{epoch_seconds_to_utc, lenient_string, parse_enum_name, serde_enum_name};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShutterState {
    Up,
    Down,
    Stop,
    GoingUp,
    GoingDown,
}

impl ShutterState {
    pub fn is_moving(&self) -> bool {
        matches!(self, ShutterState::GoingUp | ShutterState::GoingDown)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShutterCapability {
    UpDown,
    Position,
    RelativePosition,
    HwLock,
    CloudLock,
    Preset,
    ChangePreset,
}

/// Live state. Every field may be absent or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Status {
    pub locked: Option<bool>,
    pub manual_override: Option<bool>,
    pub state: Option<String>, // UP/DOWN/STOP/GOING_UP/GOING_DOWN, not enforced
    pub position: Option<i64>,
    pub last_change: Option<f64>,
    pub preset_position: Option<i64>,
}

impl Status {
    /// The reported state, when it is one of the documented values.
    pub fn known_state(&self) -> Option<ShutterState> {
        self.state.as_deref().and_then(parse_enum_name)
    }

    pub fn last_change_at(&self) -> Option<DateTime<Utc>> {
        self.last_change.and_then(epoch_seconds_to_utc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Attributes {
    #[serde(default, deserialize_with = "lenient_string")]
    pub azimuth: Option<String>,
    pub compass_point: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub surface_area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shutter {
    #[serde(rename = "id")]
    pub idx: i64,
    pub local_id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub shutter_type: String,
    pub capabilities: Option<Vec<Value>>,
    pub status: Status,
    pub location: Option<Location>,
    pub attributes: Option<Attributes>,
    pub metadata: Option<String>,
    #[serde(rename = "_version", default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
}

impl Shutter {
    pub fn has_capability(&self, cap: ShutterCapability) -> bool {
        let Some(name) = serde_enum_name(&cap) else {
            return false;
        };
        self.capabilities
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .any(|c| c.as_str() == Some(name.as_str()))
    }
}

impl Entity for Shutter {
    const KIND: EntityKind = EntityKind::Shutter;
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("id", "idx"),
        FieldAlias::new("type", "shutter_type"),
        FieldAlias::new("_version", "version"),
    ];

    fn idx(&self) -> i64 {
        self.idx
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Shutter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.idx, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode, decode_collection, decode_str, encode};
    use serde_json::json;

    fn living() -> Value {
        json!({
            "id": 3,
            "local_id": 1,
            "name": "Living",
            "type": "shutter",
            "status": {
                "state": "UP",
                "position": null,
                "locked": false,
                "manual_override": false,
                "last_change": null,
                "preset_position": null
            },
            "_version": "1.0"
        })
    }

    #[test]
    fn decodes_minimal_payload() {
        let s: Shutter = decode(living()).unwrap();
        assert_eq!(s.idx, 3);
        assert_eq!(s.local_id, Some(1));
        assert_eq!(s.shutter_type, "shutter");
        assert_eq!(s.status.state.as_deref(), Some("UP"));
        assert_eq!(s.status.known_state(), Some(ShutterState::Up));
        assert_eq!(s.status.locked, Some(false));
        assert_eq!(s.status.position, None);
        assert_eq!(s.version.as_deref(), Some("1.0"));
        assert!(s.location.is_none());
        assert!(s.attributes.is_none());
        assert!(s.capabilities.is_none());
    }

    #[test]
    fn identity_string() {
        let mut s: Shutter = decode(living()).unwrap();
        s.idx = 12;
        s.name = "Kitchen Shutter".to_string();
        assert_eq!(s.identity(), "12_Kitchen Shutter");
        assert_eq!(s.to_string(), "12_Kitchen Shutter");
    }

    #[test]
    fn required_fields_are_enforced() {
        for missing in ["id", "name", "type", "status"] {
            let mut raw = living();
            raw.as_object_mut().unwrap().remove(missing);
            let err = decode::<Shutter>(raw).unwrap_err();
            assert!(err.is_missing_field(), "{missing}: {err}");
        }
    }

    #[test]
    fn wrong_type_for_id_fails() {
        let mut raw = living();
        raw["id"] = json!("three");
        let err = decode::<Shutter>(raw).unwrap_err();
        assert_eq!(err.path(), "id");
    }

    #[test]
    fn null_optionals_decode_to_unset() {
        let s: Shutter = decode(json!({
            "id": 1,
            "local_id": null,
            "name": "Attic",
            "type": "shutter",
            "capabilities": null,
            "status": {},
            "location": null,
            "attributes": null,
            "metadata": null,
            "_version": null
        }))
        .unwrap();
        assert_eq!(s.local_id, None);
        assert_eq!(s.status, Status::default());
        assert_eq!(s.status.known_state(), None);
        assert_eq!(s.version, None);
    }

    #[test]
    fn numeric_version_is_kept_as_text() {
        let mut raw = living();
        raw["_version"] = json!(1.0);
        let s: Shutter = decode(raw).unwrap();
        assert_eq!(s.version.as_deref(), Some("1.0"));
        assert_eq!(encode(&s).unwrap()["_version"], json!("1.0"));
    }

    #[test]
    fn unknown_state_is_kept_verbatim() {
        let mut raw = living();
        raw["status"]["state"] = json!("HALFWAY");
        let s: Shutter = decode(raw).unwrap();
        assert_eq!(s.status.state.as_deref(), Some("HALFWAY"));
        assert_eq!(s.status.known_state(), None);
    }

    #[test]
    fn encode_restores_wire_keys() {
        let s: Shutter = decode(living()).unwrap();
        let out = encode(&s).unwrap();
        let obj = out.as_object().unwrap();
        for alias in Shutter::ALIASES {
            assert!(obj.contains_key(alias.wire), "missing wire key {}", alias.wire);
            assert!(!obj.contains_key(alias.field), "leaked field name {}", alias.field);
        }
        assert_eq!(out["id"], json!(3));
        assert_eq!(out["type"], json!("shutter"));
        assert_eq!(out["_version"], json!("1.0"));
        assert_eq!(decode::<Shutter>(out).unwrap(), s);
    }

    #[test]
    fn decodes_full_fixture() {
        let json = std::fs::read_to_string("tests/data/shutters.json").expect("fixture present");
        let raw: Value = serde_json::from_str(&json).expect("fixture is json");
        let shutters: Vec<Shutter> = decode_collection(raw).unwrap();
        assert_eq!(shutters.len(), 2);

        let kitchen = &shutters[0];
        assert_eq!(kitchen.to_string(), "12_Kitchen Shutter");
        assert!(kitchen.has_capability(ShutterCapability::Position));
        assert!(kitchen.has_capability(ShutterCapability::CloudLock));
        assert!(!kitchen.has_capability(ShutterCapability::HwLock));
        assert_eq!(kitchen.status.known_state(), Some(ShutterState::GoingDown));
        assert!(kitchen.status.known_state().unwrap().is_moving());
        assert_eq!(kitchen.status.last_change_at().map(|t| t.timestamp()), Some(1_696_156_800));
        let loc = kitchen.location.as_ref().unwrap();
        assert_eq!(loc.installation_id, 21);
        assert_eq!(loc.coordinates(), Some((120, 45)));
        let attrs = kitchen.attributes.as_ref().unwrap();
        assert_eq!(attrs.compass_point.as_deref(), Some("S"));
        assert_eq!(attrs.azimuth.as_deref(), Some("180"));
        assert_eq!(attrs.surface_area.as_deref(), Some("2.4"));
        assert_eq!(kitchen.metadata.as_deref(), Some("front façade"));

        let attic = &shutters[1];
        assert_eq!(attic.status, Status::default());
        assert!(!attic.has_capability(ShutterCapability::UpDown));

        for s in &shutters {
            let back: Shutter = decode(encode(s).unwrap()).unwrap();
            assert_eq!(&back, s);
        }
    }

    #[test]
    fn decodes_from_text() {
        let s: Shutter = decode_str(&living().to_string()).unwrap();
        assert_eq!(s.identity(), "3_Living");
    }
}
