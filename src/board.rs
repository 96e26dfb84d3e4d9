//! A flight board page: the list, the shared form, the delete prompt and the notices,
//! coordinated the way one screen of the console uses them.
//!
//! Two flavours exist. The admin board lists every flight unfiltered; the airport board lists
//! one airport's arrivals or departures and lets the user switch airport and direction.
//! After every successful write the list is re-queried; it is never patched locally.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::airports::AirportId;
use crate::api_client::{FlightApi, FlightFilter};
use crate::deletion::DeletionFlow;
use crate::edit_session::{FieldEdit, FlightEditSession, SubmitKind, SubmitOutcome};
use crate::error::{DeleteError, FieldIssue, SubmitError, ValidationError};
use crate::flight_query::FlightQueryController;
use crate::flights::{FlightId, FlightType};
use crate::notifications::{DEFAULT_NOTICE_TTL_SECS, Notices};
use crate::reference_data::ReferenceData;
use crate::views::{FlightFormView, FlightRow, flight_rows};

pub struct FlightBoard {
    api: Arc<dyn FlightApi>,
    reference: ReferenceData,
    query: FlightQueryController,
    session: FlightEditSession,
    deletion: DeletionFlow,
    notices: Notices,
    /// Problems from the last blocked submit, cleared when the form changes
    last_validation: Option<ValidationError>,
}

impl FlightBoard {
    /// Board over an arbitrary starting filter
    pub fn new(api: Arc<dyn FlightApi>, filter: FlightFilter) -> Self {
        Self {
            api,
            reference: ReferenceData::loading(),
            query: FlightQueryController::new(filter),
            session: FlightEditSession::new(),
            deletion: DeletionFlow::new(),
            notices: Notices::new(),
            last_validation: None,
        }
    }

    /// Every flight, unfiltered
    pub fn admin(api: Arc<dyn FlightApi>) -> Self {
        Self::new(api, FlightFilter::all())
    }

    /// One airport's arrivals or departures
    pub fn for_airport(
        api: Arc<dyn FlightApi>,
        airport_id: Option<AirportId>,
        direction: FlightType,
    ) -> Self {
        Self::new(api, FlightFilter::new(airport_id, Some(direction)))
    }

    /// Load the reference lists and the first page of flights, concurrently
    pub async fn mount(&mut self) {
        let api = Arc::clone(&self.api);
        let (reference, _) = tokio::join!(
            ReferenceData::load(api.as_ref()),
            self.query.refresh(api.as_ref())
        );
        self.reference = reference;
    }

    pub async fn refresh(&mut self) -> bool {
        self.query.refresh(self.api.as_ref()).await
    }

    pub async fn select_airport(&mut self, airport_id: Option<AirportId>) -> bool {
        let ticket = self.query.select_airport(airport_id);
        self.query.run(self.api.as_ref(), ticket).await
    }

    pub async fn select_direction(&mut self, direction: FlightType) -> bool {
        let ticket = self.query.select_direction(Some(direction));
        self.query.run(self.api.as_ref(), ticket).await
    }

    pub fn api(&self) -> &Arc<dyn FlightApi> {
        &self.api
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn query(&self) -> &FlightQueryController {
        &self.query
    }

    pub fn session(&self) -> &FlightEditSession {
        &self.session
    }

    pub fn deletion(&self) -> &DeletionFlow {
        &self.deletion
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Drop notices that have been up longer than the notice lifetime as of `now`
    pub fn expire_notices(&mut self, now: DateTime<Utc>) {
        self.notices.expire(now, Duration::seconds(DEFAULT_NOTICE_TTL_SECS));
    }

    pub fn last_validation(&self) -> Option<&ValidationError> {
        self.last_validation.as_ref()
    }

    /// Table rows for the currently visible flights
    pub fn rows(&self) -> Vec<FlightRow> {
        flight_rows(self.query.flights(), &self.reference)
    }

    /// The open form, if any
    pub fn form(&self) -> Option<FlightFormView> {
        FlightFormView::build(
            &self.session,
            &self.reference,
            self.last_validation.as_ref(),
        )
    }

    /// New flight; the type starts at the board's current direction
    pub fn open_new(&mut self) {
        self.last_validation = None;
        self.session.open_new(self.query.filter().flight_type);
    }

    /// Edit a flight from the visible list. `false` if it is not on the board.
    pub fn open_edit(&mut self, id: FlightId) -> bool {
        let Some(flight) = self.query.flights().iter().find(|f| f.id == id) else {
            warn!("Cannot edit flight {}: not in the current list", id);
            return false;
        };
        self.last_validation = None;
        self.session.open_edit(flight);
        true
    }

    /// Apply one field edit. Any issue reported for that field by the last blocked submit is
    /// dropped; the rest stay until the next submit.
    pub fn update_field(&mut self, edit: FieldEdit) -> bool {
        let field = edit.field();
        if !self.session.update(edit) {
            return false;
        }
        if let Some(validation) = &mut self.last_validation {
            validation.issues.retain(|(f, _)| *f != field);
        }
        if self
            .last_validation
            .as_ref()
            .is_some_and(|v| v.issues.is_empty())
        {
            self.last_validation = None;
        }
        true
    }

    pub fn cancel(&mut self) {
        self.last_validation = None;
        self.session.cancel();
    }

    /// Submit the open form. Success and failure are both reported as notices; on success the
    /// list is re-queried.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        match self.session.submit(self.api.as_ref()).await {
            Ok(outcome) => {
                self.last_validation = None;
                self.notices.success(match outcome.kind {
                    SubmitKind::Created => "Flight created",
                    SubmitKind::Updated => "Flight updated",
                });
                self.refresh().await;
                Ok(outcome)
            }
            Err(SubmitError::Validation(validation)) => {
                let fields = validation
                    .issues
                    .iter()
                    .map(|(field, issue)| match issue {
                        FieldIssue::Missing => field.label().to_string(),
                        FieldIssue::Malformed => format!("{} ({})", field.label(), issue),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                self.notices.error(format!("Please fill in: {}", fields));
                self.last_validation = Some(validation.clone());
                Err(SubmitError::Validation(validation))
            }
            Err(SubmitError::Api(e)) => {
                self.notices.error("Failed to save flight");
                Err(SubmitError::Api(e))
            }
            Err(SubmitError::NotOpen) => {
                debug!("Submit ignored: no flight form is open");
                Err(SubmitError::NotOpen)
            }
        }
    }

    /// First step of a delete: ask
    pub fn request_delete(&mut self, id: FlightId) {
        self.deletion.request(id);
    }

    pub fn dismiss_delete(&mut self) {
        self.deletion.dismiss();
    }

    /// Second step: the user said yes
    pub async fn confirm_delete(&mut self) -> Result<FlightId, DeleteError> {
        match self.deletion.confirm(self.api.as_ref()).await {
            Ok(id) => {
                self.notices.success("Flight deleted");
                self.refresh().await;
                Ok(id)
            }
            Err(DeleteError::Api(e)) => {
                self.notices.error("Failed to delete flight");
                Err(DeleteError::Api(e))
            }
            Err(DeleteError::NothingPending) => Err(DeleteError::NothingPending),
        }
    }
}
