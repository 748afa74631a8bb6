//! Correlation identifier threaded through a request via task-local storage.
//!
//! Handlers, services, and error constructors all read the same identifier
//! without it appearing in any signature: the trace middleware opens a
//! [`TraceId::scope`] around each request, and [`TraceId::current`] reads
//! whatever scope is active. Task locals are not inherited by spawned tasks,
//! so code that spawns must open a fresh scope with the id it wants carried.

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

/// Identifier correlating the log lines and error payloads of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Mint a random trace identifier for a new request.
    #[must_use]
    pub(crate) fn generate() -> Self {
        Uuid::new_v4().into()
    }

    /// The trace identifier of the enclosing scope, if inside one.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the ambient trace identifier.
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl From<Uuid> for TraceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn current_reads_the_enclosing_scope() {
        let expected = TraceId::generate();
        let observed = TraceId::scope(expected, async move { TraceId::current() }).await;
        assert_eq!(observed, Some(expected));
    }

    #[tokio::test]
    async fn current_is_none_outside_any_scope() {
        assert!(TraceId::current().is_none());
    }

    #[test]
    fn parses_and_displays_the_same_uuid() {
        let uuid = Uuid::nil();
        let trace_id: TraceId = uuid.to_string().parse().expect("parse uuid");
        assert_eq!(trace_id.to_string(), uuid.to_string());
    }
}
