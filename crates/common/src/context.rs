//! Per-request caller context.

use serde::{Deserialize, Serialize};

use crate::CorrelationId;

/// The user on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

impl Actor {
    /// Identifier used when no caller identity is supplied.
    pub const SYSTEM_ID: &'static str = "system";

    /// Creates an actor with the given id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
        }
    }

    /// Attaches a contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The built-in system actor.
    pub fn system() -> Self {
        Self::new(Self::SYSTEM_ID, "System")
    }

    /// Returns true if this is the built-in system actor.
    pub fn is_system(&self) -> bool {
        self.id == Self::SYSTEM_ID
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::system()
    }
}

/// Caller identity and correlation data for a single inbound operation.
///
/// Built by the transport layer and passed explicitly to every request
/// and notification handler. There is no ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    actor: Actor,
    correlation_id: CorrelationId,
}

impl RequestContext {
    /// Creates a context for the given actor with a fresh correlation id.
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            correlation_id: CorrelationId::new(),
        }
    }

    /// Context for background and internal work.
    pub fn system() -> Self {
        Self::new(Actor::system())
    }

    /// Replaces the correlation id, e.g. with one supplied by the caller.
    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::system()
    }
}
