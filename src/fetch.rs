//! Background fetches with newest-wins cancellation.
//!
//! A [`QueryStream`] owns one logical query stream (one grid's page data,
//! one search box's suggestions) and permits at most one in-flight request
//! at a time. Spawning a request bumps an explicit per-stream generation
//! counter and aborts the previous task; results are tagged with the
//! generation they were spawned under and compared against the current one
//! at delivery, so a superseded request that races its own abort is still
//! discarded. Results travel to the host's event loop over a tokio channel,
//! keeping the UI responsive while a fetch is outstanding.
//!
//! Superseded and cancelled results are expected, silent outcomes: they are
//! debug-logged and never surface as errors or empty states.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

/// Errors produced by fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request was superseded or aborted; never user-visible.
    #[error("request cancelled")]
    Cancelled,

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The requested resource was not found.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The server asked us to slow down.
    #[error("rate limited: please wait before retrying")]
    RateLimited,

    /// A server-side failure.
    #[error("server error: {0}")]
    Server(String),

    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Map an HTTP status code to a typed error.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            404 => FetchError::NotFound(context.to_string()),
            429 => FetchError::RateLimited,
            500..=599 => FetchError::Server(format!("HTTP {}: {}", status, context)),
            _ => FetchError::Server(format!("unexpected HTTP {}: {}", status, context)),
        }
    }

    /// Check whether this error represents a superseded request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// A result delivery tagged with the generation it was spawned under.
struct Delivery<R> {
    generation: u64,
    result: FetchResult<R>,
}

/// One logical query stream: at most one in-flight request, newest wins.
pub struct QueryStream<R> {
    /// The generation of the most recently spawned request.
    current: u64,
    tx: mpsc::UnboundedSender<Delivery<R>>,
    rx: mpsc::UnboundedReceiver<Delivery<R>>,
    /// Abort handle for the in-flight task, if any.
    handle: Option<AbortHandle>,
}

impl<R: Send + 'static> QueryStream<R> {
    /// Create an idle stream.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            current: 0,
            tx,
            rx,
            handle: None,
        }
    }

    /// The generation of the most recently spawned request.
    pub fn generation(&self) -> u64 {
        self.current
    }

    /// Spawn a request, superseding any in-flight one.
    ///
    /// The previous task is aborted and its generation invalidated; even if
    /// it manages to deliver before the abort lands, the stale tag gets it
    /// dropped. Returns the new request's generation.
    pub fn spawn<F>(&mut self, fut: F) -> u64
    where
        F: Future<Output = FetchResult<R>> + Send + 'static,
    {
        self.current += 1;
        let generation = self.current;

        if let Some(handle) = self.handle.take() {
            debug!(superseded = generation - 1, "aborting in-flight request");
            handle.abort();
        }

        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let result = fut.await;
            let _ = tx.send(Delivery { generation, result });
        });
        self.handle = Some(task.abort_handle());

        generation
    }

    /// Cancel the in-flight request, if any, without starting a new one.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(generation = self.current, "cancelling in-flight request");
            handle.abort();
        }
        // Invalidate so a racing delivery is dropped.
        self.current += 1;
    }

    /// Drain the channel and return the newest current-generation result.
    ///
    /// Stale deliveries and cancellations are dropped silently. Returns
    /// `None` when nothing relevant has arrived.
    pub fn try_recv(&mut self) -> Option<FetchResult<R>> {
        let mut latest = None;
        while let Ok(delivery) = self.rx.try_recv() {
            latest = self.filter(delivery).or(latest);
        }
        latest
    }

    /// Wait for the next current-generation result.
    ///
    /// Stale deliveries and cancellations are skipped.
    pub async fn recv(&mut self) -> Option<FetchResult<R>> {
        while let Some(delivery) = self.rx.recv().await {
            if let Some(result) = self.filter(delivery) {
                return Some(result);
            }
        }
        None
    }

    fn filter(&self, delivery: Delivery<R>) -> Option<FetchResult<R>> {
        if delivery.generation != self.current {
            debug!(
                generation = delivery.generation,
                current = self.current,
                "dropping superseded result"
            );
            return None;
        }
        match delivery.result {
            Err(e) if e.is_cancelled() => {
                debug!(generation = delivery.generation, "dropping cancelled result");
                None
            }
            result => Some(result),
        }
    }
}

impl<R: Send + 'static> Default for QueryStream<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_status() {
        let status = reqwest::StatusCode::from_u16(404).unwrap();
        assert!(matches!(
            FetchError::from_status(status, "products"),
            FetchError::NotFound(_)
        ));

        let status = reqwest::StatusCode::from_u16(429).unwrap();
        assert!(matches!(
            FetchError::from_status(status, ""),
            FetchError::RateLimited
        ));

        let status = reqwest::StatusCode::from_u16(503).unwrap();
        assert!(matches!(
            FetchError::from_status(status, ""),
            FetchError::Server(_)
        ));
    }

    #[test]
    fn test_is_cancelled() {
        assert!(FetchError::Cancelled.is_cancelled());
        assert!(!FetchError::RateLimited.is_cancelled());
    }

    #[tokio::test]
    async fn test_single_request_delivers() {
        let mut stream: QueryStream<Vec<String>> = QueryStream::new();
        stream.spawn(async { Ok(vec!["shirt".to_string()]) });

        let result = stream.recv().await.unwrap().unwrap();
        assert_eq!(result, vec!["shirt".to_string()]);
    }

    #[tokio::test]
    async fn test_newest_wins_even_when_older_resolves_later() {
        // Request A is slow; request B supersedes it and resolves first.
        // Only B's payload may be observed, regardless of resolution order.
        let mut stream: QueryStream<&'static str> = QueryStream::new();

        stream.spawn(async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok("A")
        });
        stream.spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok("B")
        });

        let first = stream.recv().await.unwrap().unwrap();
        assert_eq!(first, "B");

        // Nothing further arrives: A was aborted, and a racing delivery
        // would carry a stale generation anyway.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_stale_generation_dropped_at_delivery() {
        let mut stream: QueryStream<&'static str> = QueryStream::new();

        // Deliver a result, then invalidate it before reading.
        stream.spawn(async { Ok("old") });
        tokio::time::sleep(Duration::from_millis(50)).await;
        stream.cancel();

        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_error_is_swallowed() {
        let mut stream: QueryStream<&'static str> = QueryStream::new();
        stream.spawn(async { Err(FetchError::Cancelled) });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_real_error_propagates() {
        let mut stream: QueryStream<&'static str> = QueryStream::new();
        stream.spawn(async { Err(FetchError::RateLimited) });

        let result = stream.recv().await.unwrap();
        assert!(matches!(result, Err(FetchError::RateLimited)));
    }

    #[tokio::test]
    async fn test_generation_increments_per_spawn() {
        let mut stream: QueryStream<()> = QueryStream::new();
        assert_eq!(stream.generation(), 0);
        let g1 = stream.spawn(async { Ok(()) });
        let g2 = stream.spawn(async { Ok(()) });
        assert_eq!(g1, 1);
        assert_eq!(g2, 2);
        assert_eq!(stream.generation(), 2);
    }
}
