//! The shared create/edit flight form.
//!
//! A session is in exactly one of three modes: closed, drafting a new flight, or drafting
//! changes to an existing flight. The draft lives only inside the session; it reaches the
//! backend only through a successful [`FlightEditSession::submit`], and a failed submit leaves
//! it untouched so the user can retry.

use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::airlines::AirlineId;
use crate::airports::AirportId;
use crate::api_client::FlightApi;
use crate::error::{FieldIssue, SubmitError, ValidationError};
use crate::flights::{
    Flight, FlightId, FlightPayload, FlightStatus, FlightType, format_for_form, parse_local_time,
};
use crate::gates::GateId;

/// Editable fields, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    FlightNumber,
    FlightType,
    Status,
    ScheduledTime,
    EstimatedTime,
    Origin,
    Destination,
    AirportId,
    AirlineId,
    GateId,
}

impl DraftField {
    pub const ALL: [DraftField; 10] = [
        DraftField::FlightNumber,
        DraftField::FlightType,
        DraftField::Status,
        DraftField::ScheduledTime,
        DraftField::EstimatedTime,
        DraftField::Origin,
        DraftField::Destination,
        DraftField::AirportId,
        DraftField::AirlineId,
        DraftField::GateId,
    ];

    /// Form label
    pub fn label(&self) -> &'static str {
        match self {
            DraftField::FlightNumber => "Flight Number",
            DraftField::FlightType => "Type",
            DraftField::Status => "Status",
            DraftField::ScheduledTime => "Scheduled Time",
            DraftField::EstimatedTime => "Estimated Time",
            DraftField::Origin => "Origin",
            DraftField::Destination => "Destination",
            DraftField::AirportId => "Airport",
            DraftField::AirlineId => "Airline",
            DraftField::GateId => "Gate",
        }
    }

    /// Everything except the estimate must be filled in before submit
    pub fn is_required(&self) -> bool {
        !matches!(self, DraftField::EstimatedTime)
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A change to exactly one draft field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    FlightNumber(String),
    FlightType(Option<FlightType>),
    Status(Option<FlightStatus>),
    ScheduledTime(String),
    EstimatedTime(String),
    Origin(String),
    Destination(String),
    AirportId(Option<AirportId>),
    AirlineId(Option<AirlineId>),
    GateId(Option<GateId>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldParseError {
    pub field: DraftField,
    pub message: String,
}

impl FieldEdit {
    pub fn field(&self) -> DraftField {
        match self {
            FieldEdit::FlightNumber(_) => DraftField::FlightNumber,
            FieldEdit::FlightType(_) => DraftField::FlightType,
            FieldEdit::Status(_) => DraftField::Status,
            FieldEdit::ScheduledTime(_) => DraftField::ScheduledTime,
            FieldEdit::EstimatedTime(_) => DraftField::EstimatedTime,
            FieldEdit::Origin(_) => DraftField::Origin,
            FieldEdit::Destination(_) => DraftField::Destination,
            FieldEdit::AirportId(_) => DraftField::AirportId,
            FieldEdit::AirlineId(_) => DraftField::AirlineId,
            FieldEdit::GateId(_) => DraftField::GateId,
        }
    }

    /// Build an edit from raw text input. Blank input clears selection fields.
    pub fn parse(field: DraftField, raw: &str) -> Result<Self, FieldParseError> {
        let blank = raw.trim().is_empty();
        let invalid = |message: String| FieldParseError { field, message };

        fn parse_id(raw: &str) -> Result<i64, String> {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| format!("'{}' is not a valid id", raw.trim()))
        }

        Ok(match field {
            DraftField::FlightNumber => FieldEdit::FlightNumber(raw.to_string()),
            DraftField::ScheduledTime => FieldEdit::ScheduledTime(raw.to_string()),
            DraftField::EstimatedTime => FieldEdit::EstimatedTime(raw.to_string()),
            DraftField::Origin => FieldEdit::Origin(raw.to_string()),
            DraftField::Destination => FieldEdit::Destination(raw.to_string()),
            DraftField::FlightType if blank => FieldEdit::FlightType(None),
            DraftField::FlightType => FieldEdit::FlightType(Some(raw.parse().map_err(invalid)?)),
            DraftField::Status if blank => FieldEdit::Status(None),
            DraftField::Status => FieldEdit::Status(Some(raw.parse().map_err(invalid)?)),
            DraftField::AirportId if blank => FieldEdit::AirportId(None),
            DraftField::AirportId => FieldEdit::AirportId(Some(parse_id(raw).map_err(invalid)?)),
            DraftField::AirlineId if blank => FieldEdit::AirlineId(None),
            DraftField::AirlineId => FieldEdit::AirlineId(Some(parse_id(raw).map_err(invalid)?)),
            DraftField::GateId if blank => FieldEdit::GateId(None),
            DraftField::GateId => FieldEdit::GateId(Some(parse_id(raw).map_err(invalid)?)),
        })
    }
}

/// Working copy of a flight's editable fields, as the form holds them.
///
/// Timestamps are kept as form text (`YYYY-MM-DDTHH:mm`); an empty estimate means
/// "not estimated".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightDraft {
    pub flight_number: String,
    pub flight_type: Option<FlightType>,
    pub status: Option<FlightStatus>,
    pub scheduled_time: String,
    pub estimated_time: String,
    pub origin: String,
    pub destination: String,
    pub airport_id: Option<AirportId>,
    pub airline_id: Option<AirlineId>,
    pub gate_id: Option<GateId>,
}

impl FlightDraft {
    /// Blank draft; the type defaults to the page's current direction when it has one
    pub fn blank(default_type: Option<FlightType>) -> Self {
        Self {
            flight_type: default_type,
            ..Self::default()
        }
    }

    /// Pre-filled from an existing record, timestamps truncated to minutes
    pub fn from_flight(flight: &Flight) -> Self {
        Self {
            flight_number: flight.flight_number.clone(),
            flight_type: Some(flight.flight_type),
            status: Some(flight.status),
            scheduled_time: format_for_form(&flight.scheduled_time),
            estimated_time: flight
                .estimated_time
                .as_ref()
                .map(format_for_form)
                .unwrap_or_default(),
            origin: flight.origin.clone(),
            destination: flight.destination.clone(),
            airport_id: Some(flight.airport_id),
            airline_id: Some(flight.airline_id),
            gate_id: Some(flight.gate_id),
        }
    }

    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::FlightNumber(v) => self.flight_number = v,
            FieldEdit::FlightType(v) => self.flight_type = v,
            FieldEdit::Status(v) => self.status = v,
            FieldEdit::ScheduledTime(v) => self.scheduled_time = v,
            FieldEdit::EstimatedTime(v) => self.estimated_time = v,
            FieldEdit::Origin(v) => self.origin = v,
            FieldEdit::Destination(v) => self.destination = v,
            FieldEdit::AirportId(v) => self.airport_id = v,
            FieldEdit::AirlineId(v) => self.airline_id = v,
            FieldEdit::GateId(v) => self.gate_id = v,
        }
    }

    /// Current value of `field` as form text
    pub fn display_value(&self, field: DraftField) -> String {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        match field {
            DraftField::FlightNumber => self.flight_number.clone(),
            DraftField::FlightType => opt(&self.flight_type),
            DraftField::Status => opt(&self.status),
            DraftField::ScheduledTime => self.scheduled_time.clone(),
            DraftField::EstimatedTime => self.estimated_time.clone(),
            DraftField::Origin => self.origin.clone(),
            DraftField::Destination => self.destination.clone(),
            DraftField::AirportId => opt(&self.airport_id),
            DraftField::AirlineId => opt(&self.airline_id),
            DraftField::GateId => opt(&self.gate_id),
        }
    }

    /// Check presence of every required field (and that timestamps parse) and build the
    /// write payload. All problems are reported at once.
    pub fn validate(&self) -> Result<FlightPayload, ValidationError> {
        let mut issues = Vec::new();

        fn text<'a>(
            issues: &mut Vec<(DraftField, FieldIssue)>,
            field: DraftField,
            value: &'a str,
        ) -> Option<&'a str> {
            if value.trim().is_empty() {
                issues.push((field, FieldIssue::Missing));
                None
            } else {
                Some(value)
            }
        }

        fn select<T: Copy>(
            issues: &mut Vec<(DraftField, FieldIssue)>,
            field: DraftField,
            value: Option<T>,
        ) -> Option<T> {
            if value.is_none() {
                issues.push((field, FieldIssue::Missing));
            }
            value
        }

        let flight_number = text(&mut issues, DraftField::FlightNumber, &self.flight_number);
        let flight_type = select(&mut issues, DraftField::FlightType, self.flight_type);
        let status = select(&mut issues, DraftField::Status, self.status);

        let scheduled_time = text(&mut issues, DraftField::ScheduledTime, &self.scheduled_time)
            .and_then(|raw| {
                let parsed = parse_local_time(raw);
                if parsed.is_none() {
                    issues.push((DraftField::ScheduledTime, FieldIssue::Malformed));
                }
                parsed
            });

        let estimated_time = if self.estimated_time.trim().is_empty() {
            None
        } else {
            let parsed = parse_local_time(&self.estimated_time);
            if parsed.is_none() {
                issues.push((DraftField::EstimatedTime, FieldIssue::Malformed));
            }
            parsed
        };

        let origin = text(&mut issues, DraftField::Origin, &self.origin);
        let destination = text(&mut issues, DraftField::Destination, &self.destination);
        let airport_id = select(&mut issues, DraftField::AirportId, self.airport_id);
        let airline_id = select(&mut issues, DraftField::AirlineId, self.airline_id);
        let gate_id = select(&mut issues, DraftField::GateId, self.gate_id);

        match (
            flight_number,
            flight_type,
            status,
            scheduled_time,
            origin,
            destination,
            airport_id,
            airline_id,
            gate_id,
        ) {
            (
                Some(flight_number),
                Some(flight_type),
                Some(status),
                Some(scheduled_time),
                Some(origin),
                Some(destination),
                Some(airport_id),
                Some(airline_id),
                Some(gate_id),
            ) if issues.is_empty() => Ok(FlightPayload {
                flight_number: flight_number.to_string(),
                flight_type,
                status,
                scheduled_time,
                estimated_time,
                origin: origin.to_string(),
                destination: destination.to_string(),
                airport_id,
                airline_id,
                gate_id,
            }),
            _ => {
                // Keep form order regardless of the order checks ran in
                issues.sort_by_key(|(field, _)| {
                    DraftField::ALL.iter().position(|f| f == field).unwrap_or(usize::MAX)
                });
                Err(ValidationError { issues })
            }
        }
    }

    /// Like [`validate`](Self::validate), for changes to `original`. A timestamp whose form
    /// text still matches the record keeps the record's full precision, so an untouched
    /// edit sends back exactly what was read.
    pub fn validate_changes(&self, original: &Flight) -> Result<FlightPayload, ValidationError> {
        let mut payload = self.validate()?;

        if self.scheduled_time.trim() == format_for_form(&original.scheduled_time) {
            payload.scheduled_time = original.scheduled_time;
        }
        if let Some(estimate) = original.estimated_time
            && self.estimated_time.trim() == format_for_form(&estimate)
        {
            payload.estimated_time = Some(estimate);
        }
        Ok(payload)
    }
}

/// Mode of the shared form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Closed,
    CreatingNew(FlightDraft),
    /// The record as it was opened, plus the working copy
    Editing(Box<Flight>, FlightDraft),
}

/// What a successful submit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub kind: SubmitKind,
    pub flight: Flight,
}

#[derive(Debug, Clone, Default)]
pub struct FlightEditSession {
    mode: EditMode,
}

impl FlightEditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.mode, EditMode::Closed)
    }

    pub fn draft(&self) -> Option<&FlightDraft> {
        match &self.mode {
            EditMode::Closed => None,
            EditMode::CreatingNew(draft) | EditMode::Editing(_, draft) => Some(draft),
        }
    }

    /// Id of the record being edited, if the session is in edit mode
    pub fn editing_id(&self) -> Option<FlightId> {
        match &self.mode {
            EditMode::Editing(original, _) => Some(original.id),
            _ => None,
        }
    }

    /// Start a new flight. Replaces whatever draft was open.
    pub fn open_new(&mut self, default_type: Option<FlightType>) {
        debug!("Opening flight form for a new flight");
        self.mode = EditMode::CreatingNew(FlightDraft::blank(default_type));
    }

    /// Start editing `flight`. Replaces whatever draft was open.
    pub fn open_edit(&mut self, flight: &Flight) {
        debug!("Opening flight form to edit flight {}", flight.id);
        let draft = FlightDraft::from_flight(flight);
        self.mode = EditMode::Editing(Box::new(flight.clone()), draft);
    }

    /// Apply a single field edit. Returns `false` when no form is open.
    pub fn update(&mut self, edit: FieldEdit) -> bool {
        match &mut self.mode {
            EditMode::Closed => {
                warn!("Ignoring {} edit: no flight form is open", edit.field());
                false
            }
            EditMode::CreatingNew(draft) | EditMode::Editing(_, draft) => {
                draft.apply(edit);
                true
            }
        }
    }

    /// Drop the draft, whatever the mode
    pub fn cancel(&mut self) {
        if self.is_open() {
            debug!("Flight form cancelled, draft discarded");
        }
        self.mode = EditMode::Closed;
    }

    /// Validate and send the draft: create in `CreatingNew`, update in `Editing`.
    ///
    /// On success the session closes. On any error it stays open with the draft intact;
    /// validation errors never reach the network.
    pub async fn submit(&mut self, api: &dyn FlightApi) -> Result<SubmitOutcome, SubmitError> {
        let (target, payload) = match &self.mode {
            EditMode::Closed => return Err(SubmitError::NotOpen),
            EditMode::CreatingNew(draft) => (None, draft.validate()),
            EditMode::Editing(original, draft) => {
                (Some(original.id), draft.validate_changes(original))
            }
        };

        let payload = payload.inspect_err(|e| {
            info!("Flight submit blocked: {}", e);
        })?;

        let result = match target {
            None => api
                .create_flight(&payload)
                .await
                .map(|flight| SubmitOutcome {
                    kind: SubmitKind::Created,
                    flight,
                }),
            Some(id) => api
                .update_flight(id, &payload)
                .await
                .map(|flight| SubmitOutcome {
                    kind: SubmitKind::Updated,
                    flight,
                }),
        };

        match result {
            Ok(outcome) => {
                info!(
                    "Flight {} {:?} ({})",
                    outcome.flight.id, outcome.kind, outcome.flight.flight_number
                );
                self.mode = EditMode::Closed;
                Ok(outcome)
            }
            Err(e) => {
                warn!("Failed to save flight, keeping draft open: {}", e);
                Err(SubmitError::Api(e))
            }
        }
    }
}
