//! # Log Buffer
//!
//! Append-only window over the host's log lines. Records with an empty message
//! never enter; once the window is full the oldest record is evicted for each
//! new one. Every accepted record gets a sequence number so readers can ask for
//! just what arrived since they last looked.

use std::collections::VecDeque;

use crate::domain::types::LogRecord;

pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug)]
pub struct LogBuffer {
    next_seq: u64,
    capacity: usize,
    records: VecDeque<(u64, LogRecord)>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LogBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            next_seq: 1,
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Returns `false` if the record was rejected.
    pub fn append(&mut self, record: LogRecord) -> bool {
        if record.message.is_empty() {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.records.push_back((seq, record));
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
        true
    }

    /// Arrival-ordered view of the retained records.
    #[cfg(test)]
    pub fn records(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter().map(|(_, record)| record)
    }

    /// Retained records with a sequence number greater than `seq`.
    pub fn records_since(&self, seq: u64) -> Vec<(u64, LogRecord)> {
        // Sequence numbers are contiguous within the window.
        let Some(&(first, _)) = self.records.front() else {
            return Vec::new();
        };
        let skip = if seq < first {
            0
        } else {
            usize::try_from((seq - first).saturating_add(1)).unwrap_or(usize::MAX)
        };
        self.records.iter().skip(skip).cloned().collect()
    }

    /// The last `n` records, oldest first.
    pub fn tail(&self, n: usize) -> Vec<LogRecord> {
        let start = self.records.len().saturating_sub(n);
        self.records
            .iter()
            .skip(start)
            .map(|(_, record)| record.clone())
            .collect()
    }

    /// Sequence number of the newest record, 0 when nothing was ever accepted.
    pub fn last_seq(&self) -> u64 {
        self.next_seq - 1
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(i: usize) -> LogRecord {
        LogRecord::new("INFO", "bot", &format!("line {i}"))
    }

    #[test]
    fn test_sliding_window() {
        let mut buffer = LogBuffer::default();
        for i in 0..1200 {
            assert!(buffer.append(record(i)));
        }

        assert_eq!(buffer.len(), 1000);
        assert_eq!(buffer.records().next(), Some(&record(200)));
        assert_eq!(buffer.records().last(), Some(&record(1199)));
        let messages: Vec<_> = buffer.records().map(|r| r.message.clone()).collect();
        let expected: Vec<_> = (200..1200).map(|i| format!("line {i}")).collect();
        assert_eq!(messages, expected);
    }

    #[test]
    fn test_empty_message_rejected() {
        let mut buffer = LogBuffer::with_capacity(3);
        buffer.append(record(0));

        assert!(!buffer.append(LogRecord::new("INFO", "bot", "")));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.last_seq(), 1);

        // A full window stays full.
        buffer.append(record(1));
        buffer.append(record(2));
        assert!(!buffer.append(LogRecord::default()));
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.records().next(), Some(&record(0)));
    }

    #[test]
    fn test_records_since() {
        let mut buffer = LogBuffer::with_capacity(4);
        assert!(buffer.records_since(0).is_empty());
        for i in 0..6 {
            buffer.append(record(i));
        }
        // Window holds seq 3..=6.
        assert_eq!(buffer.last_seq(), 6);

        let since: Vec<u64> = buffer.records_since(4).into_iter().map(|(s, _)| s).collect();
        assert_eq!(since, vec![5, 6]);

        let all: Vec<u64> = buffer.records_since(0).into_iter().map(|(s, _)| s).collect();
        assert_eq!(all, vec![3, 4, 5, 6]);

        assert!(buffer.records_since(6).is_empty());
        assert!(buffer.records_since(100).is_empty());
    }

    #[test]
    fn test_tail() {
        let mut buffer = LogBuffer::default();
        for i in 0..5 {
            buffer.append(record(i));
        }
        assert_eq!(buffer.tail(2), vec![record(3), record(4)]);
        assert_eq!(buffer.tail(50).len(), 5);
    }
}
