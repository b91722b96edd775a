//! Draining asynchronous sequences into memory.
//!
//! [`Source`] is the capability the collector needs from a sequence: pull the
//! next value (suspending until one is ready or the sequence ends) and release
//! whatever backs it. How the values are produced is up to the implementor.

use futures::{Stream, StreamExt};
use std::future::Future;
use tokio::sync::mpsc;

/// A pull-based asynchronous sequence.
pub trait Source {
    type Item;

    /// Pulls the next value, or `None` once the sequence has ended.
    fn next(&mut self) -> impl Future<Output = Option<Self::Item>>;

    /// Releases any underlying resource. Further pulls may return `None`.
    fn close(&mut self) {}
}

/// Drains `source` to the end and returns every value in order.
///
/// The source is consumed and closed. Only use this on sequences known to be
/// finite: an unbounded source grows the result without limit.
pub async fn collect<S: Source>(mut source: S) -> Vec<S::Item> {
    let mut items = Vec::new();
    while let Some(item) = source.next().await {
        items.push(item);
    }
    source.close();
    items
}

impl<T> Source for mpsc::Receiver<T> {
    type Item = T;

    async fn next(&mut self) -> Option<T> {
        self.recv().await
    }

    fn close(&mut self) {
        mpsc::Receiver::close(self);
    }
}

impl<T> Source for mpsc::UnboundedReceiver<T> {
    type Item = T;

    async fn next(&mut self) -> Option<T> {
        self.recv().await
    }

    fn close(&mut self) {
        mpsc::UnboundedReceiver::close(self);
    }
}

/// Adapts any [`Stream`] into a [`Source`].
#[derive(Debug)]
pub struct StreamSource<S> {
    stream: S,
}

impl<S> StreamSource<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Stream + Unpin> Source for StreamSource<S> {
    type Item = S::Item;

    async fn next(&mut self) -> Option<S::Item> {
        StreamExt::next(&mut self.stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_collect_pushed_values() {
        let (tx, rx) = mpsc::channel(8);
        for n in [1, 2, 3] {
            tx.send(n).await.unwrap();
        }
        drop(tx);

        assert_eq!(collect(rx).await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_collect_empty() {
        let (tx, rx) = mpsc::channel::<u32>(1);
        drop(tx);

        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_collect_suspends_between_values() {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            for subject in ["a", "b", "c"] {
                tokio::time::sleep(Duration::from_millis(10)).await;
                let _ = tx.send(subject);
            }
        });

        assert_eq!(collect(rx).await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_collect_stream() {
        let source = StreamSource::new(futures::stream::iter(vec!["+OK", "PONG"]));
        assert_eq!(collect(source).await, vec!["+OK", "PONG"]);

        let empty = StreamSource::new(futures::stream::empty::<u8>());
        assert!(collect(empty).await.is_empty());
    }

    struct Countdown {
        remaining: u32,
        closed: std::rc::Rc<std::cell::Cell<bool>>,
    }

    impl Source for Countdown {
        type Item = u32;

        async fn next(&mut self) -> Option<u32> {
            tokio::task::yield_now().await;
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            Some(self.remaining)
        }

        fn close(&mut self) {
            self.closed.set(true);
        }
    }

    #[tokio::test]
    async fn test_collect_closes_source() {
        let closed = std::rc::Rc::new(std::cell::Cell::new(false));
        let source = Countdown {
            remaining: 3,
            closed: closed.clone(),
        };

        assert_eq!(collect(source).await, vec![2, 1, 0]);
        assert!(closed.get());
    }
}
