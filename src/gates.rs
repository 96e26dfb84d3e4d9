use serde::{Deserialize, Serialize};

pub type GateId = i64;

/// Gate reference record as served by `GET /api/gates`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    pub id: GateId,
    pub name: String,
    #[serde(default)]
    pub terminal: Option<String>,
}

impl Gate {
    /// Gate name with its terminal, e.g. "B12 (T1)". A missing or blank terminal shows as "-".
    pub fn label(&self) -> String {
        let terminal = self
            .terminal
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("-");
        format!("{} ({})", self.name, terminal)
    }
}
