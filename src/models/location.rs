//! Placement of a device inside an installation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FloorCoordinates {
    pub x: Option<i64>,
    pub y: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub floor_coordinates: Option<FloorCoordinates>,
    pub floor_id: Option<i64>,
    pub installation_id: i64,
    pub room_id: Option<i64>,
}

impl Location {
    /// Both coordinates, when the device has been placed on a floor plan.
    pub fn coordinates(&self) -> Option<(i64, i64)> {
        let c = self.floor_coordinates.as_ref()?;
        Some((c.x?, c.y?))
    }
}
