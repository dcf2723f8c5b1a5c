//! Collaborators the brewing timer talks to once a session leaves memory.

use std::future::Future;

use anyhow::Result;

use crate::db::models::{SessionRecord, TeaItem};
use crate::timer::state::SessionRequest;

/// Read-only access to the stash.
pub trait TeaLookup: Send + Sync + 'static {
    fn get_tea(&self, tea_id: &str) -> impl Future<Output = Result<Option<TeaItem>>> + Send;
}

/// Persists a finished session.
///
/// On success the session is appended to the history and the tea's remaining
/// weight drops by `request.grams`, floored at zero. Both happen or neither.
pub trait SessionGateway: Send + Sync + 'static {
    fn record_session(
        &self,
        request: SessionRequest,
    ) -> impl Future<Output = Result<SessionRecord>> + Send;
}
