//! Recording event publisher.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::project::{
    domain::AdmissionEvent,
    ports::{EventPublisher, EventPublisherError, PublishResult},
};

/// In-memory event publisher that encodes and records every event.
///
/// Events are encoded to their JSON wire form before being accepted, so a
/// published payload is exactly what a broker-backed adapter would send.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    state: Arc<RwLock<PublisherState>>,
}

#[derive(Debug, Default)]
struct PublisherState {
    events: Vec<AdmissionEvent>,
    payloads: Vec<String>,
    failure: Option<String>,
}

impl InMemoryEventPublisher {
    /// Creates a publisher with no recorded events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every subsequent publication with a transport error.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn fail_with(&self, message: impl Into<String>) -> PublishResult<()> {
        let mut state = self.state.write().map_err(|err| {
            EventPublisherError::transport(std::io::Error::other(err.to_string()))
        })?;
        state.failure = Some(message.into());
        Ok(())
    }

    /// Returns the events accepted so far, in publication order.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn published(&self) -> PublishResult<Vec<AdmissionEvent>> {
        let state = self.state.read().map_err(|err| {
            EventPublisherError::transport(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.events.clone())
    }

    /// Returns the JSON payloads accepted so far, in publication order.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn payloads(&self) -> PublishResult<Vec<String>> {
        let state = self.state.read().map_err(|err| {
            EventPublisherError::transport(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.payloads.clone())
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: &AdmissionEvent) -> PublishResult<()> {
        let mut state = self.state.write().map_err(|err| {
            EventPublisherError::transport(std::io::Error::other(err.to_string()))
        })?;
        if let Some(message) = &state.failure {
            return Err(EventPublisherError::transport(std::io::Error::other(
                message.clone(),
            )));
        }
        let payload = serde_json::to_string(event)
            .map_err(|err| EventPublisherError::Encoding(err.to_string()))?;
        state.payloads.push(payload);
        state.events.push(event.clone());
        debug!(project_id = %event.project_id(), "admission event recorded");
        Ok(())
    }
}
