use serde::{Deserialize, Serialize};

pub type AirportId = i64;

/// Airport reference record as served by `GET /api/airports`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub id: AirportId,
    pub code: String, // Short display code (e.g. "YYZ")
    pub city: String,
}

impl Airport {
    /// Label used in selection inputs and list display, e.g. "YYZ - Toronto"
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.city)
    }
}
