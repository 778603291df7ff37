//! Rolling trace log shown to the user.
//!
//! Keeps a sliding window of the most recent entries. Entries are also emitted
//! through `tracing` and broadcast to live subscribers. Nothing in the crate
//! reads the log to make decisions.

use crate::utils::gen_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Number of entries retained
pub const LOG_CAPACITY: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Logic,
    Data,
    Evolution,
    Error,
    Synthesis,
    Mutation,
    Infiltration,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogKind::Logic => "LOGIC",
            LogKind::Data => "DATA",
            LogKind::Evolution => "EVOLUTION",
            LogKind::Error => "ERROR",
            LogKind::Synthesis => "SYNTHESIS",
            LogKind::Mutation => "MUTATION",
            LogKind::Infiltration => "INFILTRATION",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub kind: LogKind,
}

impl LogEntry {
    pub fn new(kind: LogKind, text: impl Into<String>) -> Self {
        Self {
            id: gen_id(),
            created_at: Utc::now(),
            text: text.into(),
            kind,
        }
    }
}

#[derive(Debug)]
pub struct LogStream {
    max_items: usize,
    items: VecDeque<LogEntry>,
    sender: broadcast::Sender<LogEntry>,
}

impl Default for LogStream {
    fn default() -> Self {
        Self::new(LOG_CAPACITY)
    }
}

impl LogStream {
    pub fn new(max_items: usize) -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            max_items,
            items: VecDeque::with_capacity(max_items),
            sender,
        }
    }

    /// Append an entry, evicting the oldest when full
    pub fn push(&mut self, kind: LogKind, text: impl Into<String>) -> LogEntry {
        let entry = LogEntry::new(kind, text);
        match kind {
            LogKind::Error => warn!(target = "yoke_log", kind = %kind, "{}", entry.text),
            _ => debug!(target = "yoke_log", kind = %kind, "{}", entry.text),
        }
        if self.items.len() >= self.max_items {
            self.items.pop_front();
        }
        self.items.push_back(entry.clone());
        // Ignore error if no subscribers
        let _ = self.sender.send(entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.items.iter()
    }

    /// Most recent `n` entries, newest first
    pub fn recent(&self, n: usize) -> Vec<&LogEntry> {
        self.items.iter().rev().take(n).collect()
    }

    pub fn count_kind(&self, kind: LogKind) -> usize {
        self.items.iter().filter(|e| e.kind == kind).count()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}
