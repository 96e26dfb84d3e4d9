//! Two-step flight deletion: ask, then delete on explicit confirmation.
//!
//! Nothing is removed locally. The caller re-queries the list after a confirmed delete
//! succeeds; after a failure the record simply stays where it was.

use tracing::{debug, info, warn};

use crate::api_client::FlightApi;
use crate::error::DeleteError;
use crate::flights::FlightId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletionState {
    #[default]
    Idle,
    AwaitingConfirmation(FlightId),
}

#[derive(Debug, Clone, Default)]
pub struct DeletionFlow {
    state: DeletionState,
}

impl DeletionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DeletionState {
        self.state
    }

    /// Flight waiting for the user's answer
    pub fn pending(&self) -> Option<FlightId> {
        match self.state {
            DeletionState::AwaitingConfirmation(id) => Some(id),
            DeletionState::Idle => None,
        }
    }

    /// Ask for confirmation before deleting `id`. No network effect.
    pub fn request(&mut self, id: FlightId) {
        debug!("Delete requested for flight {}, awaiting confirmation", id);
        self.state = DeletionState::AwaitingConfirmation(id);
    }

    /// The user declined
    pub fn dismiss(&mut self) {
        self.state = DeletionState::Idle;
    }

    /// The user confirmed: delete the pending flight. The prompt closes either way.
    pub async fn confirm(&mut self, api: &dyn FlightApi) -> Result<FlightId, DeleteError> {
        let id = self.pending().ok_or(DeleteError::NothingPending)?;
        self.state = DeletionState::Idle;

        match api.delete_flight(id).await {
            Ok(()) => {
                info!("Flight {} deleted", id);
                Ok(id)
            }
            Err(e) => {
                warn!("Failed to delete flight {}: {}", id, e);
                Err(DeleteError::Api(e))
            }
        }
    }
}
