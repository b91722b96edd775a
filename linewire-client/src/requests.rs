//! Request/response correlation.
//!
//! One [`Deferred`] per outstanding request, stored by correlation id. The
//! response-dispatch path resolves it by id; a response for an unknown id
//! (already timed out, or never issued) is dropped here.

use crate::config::ClientConfig;
use crate::deferred::{deferred, Deferred, Resolver};
use crate::error::CompletionError;
use crate::timeout::with_timeout;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Correlation id of an outstanding request.
pub type RequestId = u64;

/// Outstanding requests awaiting a response.
pub struct RequestTable<T> {
    pending: DashMap<RequestId, Resolver<T>>,
    next_id: AtomicU64,
    request_timeout: Duration,
}

impl<T> RequestTable<T> {
    /// Creates a table whose [`RequestTable::wait`] uses `request_timeout`.
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            next_id: AtomicU64::new(1),
            request_timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.request_timeout())
    }

    /// Registers a new request and returns its id and response future.
    pub fn register(&self) -> (RequestId, Deferred<T>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (future, resolver) = deferred();
        self.pending.insert(id, resolver);
        tracing::trace!(id, "registered request");
        (id, future)
    }

    /// Delivers a response. Returns `false` if no request is waiting on `id`.
    pub fn resolve(&self, id: RequestId, value: T) -> bool {
        match self.pending.remove(&id) {
            Some((_, resolver)) => resolver.succeed(value),
            None => {
                tracing::debug!(id, "no pending request for response");
                false
            }
        }
    }

    /// Fails a request. Returns `false` if no request is waiting on `id`.
    pub fn reject(&self, id: RequestId, err: CompletionError) -> bool {
        match self.pending.remove(&id) {
            Some((_, resolver)) => resolver.fail(err),
            None => {
                tracing::debug!(id, error = %err, "no pending request for failure");
                false
            }
        }
    }

    /// Forgets a request the caller no longer waits on.
    ///
    /// Entries otherwise stay until resolved, rejected, timed out in
    /// [`RequestTable::wait`] or failed by [`RequestTable::fail_all`]. A
    /// remaining holder of the response future sees
    /// [`CompletionError::Abandoned`]. Returns `false` for an unknown id.
    pub fn cancel(&self, id: RequestId) -> bool {
        let removed = self.pending.remove(&id).is_some();
        if removed {
            tracing::trace!(id, "cancelled request");
        }
        removed
    }

    /// Waits for the response to `id`, bounded by the table's request timeout.
    pub async fn wait(&self, id: RequestId, response: Deferred<T>) -> Result<T, CompletionError> {
        self.wait_for(id, response, self.request_timeout).await
    }

    /// Waits for the response to `id`, bounded by `timeout`.
    ///
    /// On timeout the entry is dropped so a late response becomes a no-op.
    pub async fn wait_for(
        &self,
        id: RequestId,
        response: Deferred<T>,
        timeout: Duration,
    ) -> Result<T, CompletionError> {
        let outcome = with_timeout(response, timeout).await;
        if let Err(ref err) = outcome {
            if err.is_timeout() {
                tracing::debug!(id, ?timeout, "request timed out");
                self.pending.remove(&id);
            }
        }
        outcome
    }

    /// Fails every outstanding request with `err`, e.g. on connection loss.
    pub fn fail_all(&self, err: CompletionError) -> usize {
        let ids: Vec<RequestId> = self.pending.iter().map(|entry| *entry.key()).collect();
        let mut failed = 0;
        for id in ids {
            if let Some((_, resolver)) = self.pending.remove(&id) {
                if resolver.fail(err.clone()) {
                    failed += 1;
                }
            }
        }
        tracing::debug!(failed, "failed all pending requests");
        failed
    }

    /// Returns the number of outstanding requests.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns the configured request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_resolve_by_id() {
        let table = RequestTable::new(Duration::from_secs(1));
        let (first, first_rx) = table.register();
        let (second, second_rx) = table.register();
        assert_ne!(first, second);
        assert_eq!(table.len(), 2);

        assert!(table.resolve(second, "PONG 2".to_string()));
        assert!(table.resolve(first, "PONG 1".to_string()));
        assert!(table.is_empty());

        assert_eq!(first_rx.await.unwrap(), "PONG 1");
        assert_eq!(second_rx.await.unwrap(), "PONG 2");
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let table = RequestTable::<u32>::new(Duration::from_secs(1));
        assert!(!table.resolve(42, 1));
        assert!(!table.reject(42, CompletionError::Closed));
    }

    #[tokio::test]
    async fn test_reject() {
        let table = RequestTable::<()>::new(Duration::from_secs(1));
        let (id, rx) = table.register();
        assert!(table.reject(id, CompletionError::Closed));
        assert!(matches!(rx.await, Err(CompletionError::Closed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_receives_response() {
        let table = Arc::new(RequestTable::new(Duration::from_millis(500)));
        let (id, rx) = table.register();

        let responder = table.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            responder.resolve(id, 99u64);
        });

        assert_eq!(table.wait(id, rx).await.unwrap(), 99);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_timeout_drops_entry() {
        let table = RequestTable::<u64>::new(Duration::from_millis(50));
        let (id, rx) = table.register();

        let err = table.wait(id, rx).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(table.is_empty());

        // Late response is dropped.
        assert!(!table.resolve(id, 1));
    }

    #[tokio::test]
    async fn test_cancel_removes_entry() {
        let table = RequestTable::<u64>::new(Duration::from_secs(1));
        let (dropped, _) = table.register();
        let (kept, rx) = table.register();
        assert_eq!(table.len(), 2);

        assert!(table.cancel(dropped));
        assert!(!table.cancel(dropped));
        assert_eq!(table.len(), 1);
        assert!(!table.resolve(dropped, 1));

        assert!(table.cancel(kept));
        assert!(table.is_empty());
        assert!(matches!(rx.await, Err(CompletionError::Abandoned)));
    }

    #[tokio::test]
    async fn test_fail_all() {
        let table = RequestTable::<u8>::new(Duration::from_secs(1));
        let (_, a) = table.register();
        let (_, b) = table.register();

        assert_eq!(table.fail_all(CompletionError::Closed), 2);
        assert!(table.is_empty());
        assert!(matches!(a.await, Err(CompletionError::Closed)));
        assert!(matches!(b.await, Err(CompletionError::Closed)));
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig::default().with_request_timeout(Duration::from_millis(750));
        let table = RequestTable::<()>::from_config(&config);
        assert_eq!(table.request_timeout(), Duration::from_millis(750));
    }
}
