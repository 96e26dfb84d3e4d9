//! What the presentation layer needs to draw the flight list and the flight form.

use serde::Serialize;

use crate::airlines::AirlineId;
use crate::airports::AirportId;
use crate::edit_session::{DraftField, EditMode, FlightEditSession};
use crate::error::{FieldIssue, ValidationError};
use crate::flights::{Flight, FlightId, FlightStatus, FlightType};
use crate::gates::GateId;
use crate::reference_data::{ReferenceData, SelectOption};

const TABLE_HEADERS: [&str; 8] = [
    "ID", "Flight", "Type", "Status", "Airport", "Airline", "Gate", "Time",
];

/// One row of the flight table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRow {
    pub id: FlightId,
    pub flight_number: String,
    pub flight_type: FlightType,
    pub status: FlightStatus,
    pub airport: String,
    pub airline: String,
    pub gate: String,
    pub scheduled_time: String,
}

impl FlightRow {
    /// Denormalized names win; the reference labels fill in when the server left them out
    pub fn from_flight(flight: &Flight, reference: &ReferenceData) -> Self {
        fn pick(denormalized: &Option<String>, fallback: Option<&str>) -> String {
            denormalized
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(fallback)
                .unwrap_or("-")
                .to_string()
        }

        Self {
            id: flight.id,
            flight_number: flight.flight_number.clone(),
            flight_type: flight.flight_type,
            status: flight.status,
            airport: pick(&flight.airport_code, reference.airport_label(flight.airport_id)),
            airline: pick(&flight.airline_name, reference.airline_label(flight.airline_id)),
            gate: pick(&flight.gate_name, reference.gate_label(flight.gate_id)),
            scheduled_time: flight.scheduled_time.format("%Y-%m-%d %H:%M").to_string(),
        }
    }

    fn cells(&self) -> [String; 8] {
        [
            self.id.to_string(),
            self.flight_number.clone(),
            self.flight_type.to_string(),
            self.status.to_string(),
            self.airport.clone(),
            self.airline.clone(),
            self.gate.clone(),
            self.scheduled_time.clone(),
        ]
    }
}

pub fn flight_rows(flights: &[Flight], reference: &ReferenceData) -> Vec<FlightRow> {
    flights
        .iter()
        .map(|f| FlightRow::from_flight(f, reference))
        .collect()
}

/// Plain-text table with aligned columns
pub fn render_flight_table(rows: &[FlightRow]) -> String {
    let cells: Vec<[String; 8]> = rows.iter().map(FlightRow::cells).collect();

    let mut widths = TABLE_HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |values: &[&str]| -> String {
        values
            .iter()
            .zip(widths.iter())
            .map(|(value, width)| format!("{:<width$}", value, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = format_line(&TABLE_HEADERS[..]);
    out.push('\n');
    for row in &cells {
        let values: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&format_line(&values[..]));
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldView {
    #[serde(skip)]
    pub field: DraftField,
    pub label: &'static str,
    pub required: bool,
    pub value: String,
    /// Set after a blocked submit
    pub issue: Option<String>,
}

/// The open flight form: title, buttons, current values and every option set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightFormView {
    pub title: &'static str,
    pub confirm_label: &'static str,
    pub fields: Vec<FormFieldView>,
    pub type_options: Vec<SelectOption<FlightType>>,
    pub status_options: Vec<SelectOption<FlightStatus>>,
    pub airport_options: Vec<SelectOption<AirportId>>,
    pub airline_options: Vec<SelectOption<AirlineId>>,
    pub gate_options: Vec<SelectOption<GateId>>,
}

impl FlightFormView {
    /// `None` when the session is closed
    pub fn build(
        session: &FlightEditSession,
        reference: &ReferenceData,
        validation: Option<&ValidationError>,
    ) -> Option<Self> {
        let (title, confirm_label) = match session.mode() {
            EditMode::Closed => return None,
            EditMode::CreatingNew(_) => ("Create Flight", "Create"),
            EditMode::Editing(..) => ("Edit Flight", "Save"),
        };
        let draft = session.draft()?;

        let issue_for = |field: DraftField| -> Option<String> {
            validation.and_then(|v| {
                v.issues
                    .iter()
                    .find(|(f, _)| *f == field)
                    .map(|(_, issue)| match issue {
                        FieldIssue::Missing => format!("{} is required", field.label()),
                        FieldIssue::Malformed => {
                            format!("{} must look like 2026-01-11T18:30", field.label())
                        }
                    })
            })
        };

        let fields = DraftField::ALL
            .iter()
            .map(|&field| FormFieldView {
                field,
                label: field.label(),
                required: field.is_required(),
                value: draft.display_value(field),
                issue: issue_for(field),
            })
            .collect();

        Some(Self {
            title,
            confirm_label,
            fields,
            type_options: FlightType::ALL
                .iter()
                .map(|t| SelectOption {
                    value: *t,
                    label: t.to_string(),
                })
                .collect(),
            status_options: FlightStatus::ALL
                .iter()
                .map(|s| SelectOption {
                    value: *s,
                    label: s.to_string(),
                })
                .collect(),
            airport_options: reference.airport_options(),
            airline_options: reference.airline_options(),
            gate_options: reference.gate_options(),
        })
    }
}
