//! # Log Feed
//!
//! Single consumer of the host's log queue. Records are appended to the shared
//! `LogBuffer` as they arrive; the display is told to scroll at most once per
//! burst, a fixed delay after the first record of the burst.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::application::log_buffer::LogBuffer;
use crate::domain::types::LogRecord;

pub type SharedLogBuffer = Arc<Mutex<LogBuffer>>;

/// Everything up to `last_seq` is in the buffer and may be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollToLatest {
    pub last_seq: u64,
}

pub struct LogFeed {
    buffer: SharedLogBuffer,
    debounce: Duration,
}

impl LogFeed {
    pub fn new(buffer: SharedLogBuffer, debounce: Duration) -> Self {
        Self { buffer, debounce }
    }

    pub fn spawn(
        self,
        records: mpsc::Receiver<LogRecord>,
        scroll: mpsc::Sender<ScrollToLatest>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(records, scroll))
    }

    /// Runs until the record queue closes. A pending scroll is still delivered.
    pub async fn run(
        self,
        mut records: mpsc::Receiver<LogRecord>,
        scroll: mpsc::Sender<ScrollToLatest>,
    ) {
        let mut scroll = Some(scroll);
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                received = records.recv() => match received {
                    Some(record) => {
                        let accepted = self.buffer.lock().await.append(record);
                        if accepted && deadline.is_none() {
                            deadline = Some(Instant::now() + self.debounce);
                        }
                    }
                    None => {
                        if deadline.is_some() {
                            self.notify(&mut scroll).await;
                        }
                        tracing::debug!("Log queue closed, feed stopping");
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    self.notify(&mut scroll).await;
                }
            }
        }
    }

    async fn notify(&self, scroll: &mut Option<mpsc::Sender<ScrollToLatest>>) {
        let Some(sender) = scroll.as_ref() else {
            return;
        };
        let last_seq = self.buffer.lock().await.last_seq();
        // Never waits on the display: a skipped notice is covered by the next one.
        match sender.try_send(ScrollToLatest { last_seq }) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::trace!("Scroll queue full, skipping notice up to {}", last_seq);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                // Records keep flowing into the buffer without a display.
                tracing::debug!("Scroll listener gone");
                *scroll = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    fn feed(debounce_ms: u64) -> (LogFeed, SharedLogBuffer) {
        let buffer: SharedLogBuffer = Arc::new(Mutex::new(LogBuffer::default()));
        (
            LogFeed::new(buffer.clone(), Duration::from_millis(debounce_ms)),
            buffer,
        )
    }

    #[tokio::test]
    async fn test_burst_scrolls_once() {
        let (feed, buffer) = feed(40);
        let (tx, rx) = mpsc::channel(64);
        let (scroll_tx, mut scroll_rx) = mpsc::channel(8);

        for i in 0..50 {
            tx.try_send(LogRecord::new("INFO", "bot", &format!("line {i}")))
                .unwrap();
        }
        let handle = feed.spawn(rx, scroll_tx);

        let first = timeout(Duration::from_secs(2), scroll_rx.recv()).await.unwrap();
        assert_eq!(first, Some(ScrollToLatest { last_seq: 50 }));
        assert!(
            timeout(Duration::from_millis(120), scroll_rx.recv())
                .await
                .is_err()
        );
        assert_eq!(buffer.lock().await.len(), 50);

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_each_burst_gets_a_scroll() {
        let (feed, _buffer) = feed(10);
        let (tx, rx) = mpsc::channel(8);
        let (scroll_tx, mut scroll_rx) = mpsc::channel(8);
        let _handle = feed.spawn(rx, scroll_tx);

        tx.send(LogRecord::new("INFO", "bot", "first")).await.unwrap();
        let scroll = timeout(Duration::from_secs(2), scroll_rx.recv()).await.unwrap();
        assert_eq!(scroll, Some(ScrollToLatest { last_seq: 1 }));

        tx.send(LogRecord::new("INFO", "bot", "second")).await.unwrap();
        let scroll = timeout(Duration::from_secs(2), scroll_rx.recv()).await.unwrap();
        assert_eq!(scroll, Some(ScrollToLatest { last_seq: 2 }));
    }

    #[tokio::test]
    async fn test_empty_records_do_not_scroll() {
        let (feed, buffer) = feed(10);
        let (tx, rx) = mpsc::channel(8);
        let (scroll_tx, mut scroll_rx) = mpsc::channel(8);
        let handle = feed.spawn(rx, scroll_tx);

        tx.send(LogRecord::new("INFO", "bot", "")).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert!(buffer.lock().await.is_empty());
        assert_eq!(scroll_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_pending_scroll_flushed_on_close() {
        let (feed, _buffer) = feed(10_000);
        let (tx, rx) = mpsc::channel(8);
        let (scroll_tx, mut scroll_rx) = mpsc::channel(8);

        tx.send(LogRecord::new("WARN", "parser", "late")).await.unwrap();
        drop(tx);
        feed.run(rx, scroll_tx).await;

        assert_eq!(scroll_rx.recv().await, Some(ScrollToLatest { last_seq: 1 }));
    }

    #[tokio::test]
    async fn test_unread_scroll_queue_does_not_stall_ingestion() {
        let (feed, buffer) = feed(5);
        let (tx, rx) = mpsc::channel(16);
        let (scroll_tx, _scroll_rx) = mpsc::channel(2);
        let handle = feed.spawn(rx, scroll_tx);

        let produce = async {
            for i in 0..300 {
                tx.send(LogRecord::new("INFO", "bot", &format!("line {i}")))
                    .await
                    .unwrap();
                if i % 10 == 0 {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                }
            }
        };
        timeout(Duration::from_secs(5), produce).await.unwrap();
        drop(tx);
        timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();

        let buffer = buffer.lock().await;
        assert_eq!(buffer.len(), 300);
        assert_eq!(buffer.last_seq(), 300);
    }
}
