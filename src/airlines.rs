use serde::{Deserialize, Serialize};

pub type AirlineId = i64;

/// Airline reference record as served by `GET /api/airlines`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub id: AirlineId,
    pub code: String,
    pub name: String,
}

impl Airline {
    /// e.g. "AC - Air Canada"
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }
}
