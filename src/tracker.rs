//! Completion Tracking
//!
//! The stateful core between "fetch notifications" and "post a reply".
//! Polling is at-least-once: the same mention reappears every tick until the
//! bot's replies age it out of the feed (or forever, if they never do). The
//! tracker bounds the external effect to at-most-once per (mention, option):
//!
//! - a per-mention set of already-replied options (the completion record),
//! - a set of mention cids that are fully answered and skipped outright.
//!
//! Two tiers so a mention can make partial progress across ticks when a post
//! fails midway. All state is owned and in-memory; a periodic sweep clears it
//! wholesale as a safety valve against stuck records.

use std::collections::{HashMap, HashSet};

/// Snapshot of tracker state for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerStats {
    /// Mentions fully answered and permanently skipped.
    pub processed_mentions: usize,
    /// Mentions with partial progress (some options replied, not all).
    pub in_flight_mentions: usize,
    /// Total options recorded across in-flight mentions.
    pub recorded_options: usize,
}

/// Per-option dedup and per-mention completion state.
///
/// Synchronous and non-blocking; all mutation happens from the single poll
/// loop, so no interior locking is needed here.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    /// Cids fully answered; never re-processed until the next sweep.
    processed: HashSet<String>,
    /// Cid -> options already replied to for that mention.
    responses: HashMap<String, HashSet<String>>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Has this option already been replied to for this mention?
    pub fn has_option(&self, cid: &str, option: &str) -> bool {
        self.responses
            .get(cid)
            .map(|options| options.contains(option))
            .unwrap_or(false)
    }

    /// Record an option as replied to, creating the completion record on
    /// first use. Idempotent; returns true if the option was newly recorded.
    pub fn record(&mut self, cid: &str, option: &str) -> bool {
        self.responses
            .entry(cid.to_string())
            .or_default()
            .insert(option.to_string())
    }

    /// Number of options recorded for a mention (0 if none yet).
    pub fn recorded_count(&self, cid: &str) -> usize {
        self.responses.get(cid).map(HashSet::len).unwrap_or(0)
    }

    /// Is this mention fully answered?
    pub fn is_fully_processed(&self, cid: &str) -> bool {
        self.processed.contains(cid)
    }

    /// Mark a mention fully answered and drop its completion record.
    ///
    /// The caller invokes this exactly when the recorded count equals the
    /// option count extracted from the mention's text on the current tick.
    pub fn mark_complete(&mut self, cid: &str) {
        self.processed.insert(cid.to_string());
        self.responses.remove(cid);
    }

    /// Wipe all state. Sweep only; correctness must not depend on it.
    pub fn clear(&mut self) {
        self.processed.clear();
        self.responses.clear();
    }

    /// Current state counts.
    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            processed_mentions: self.processed.len(),
            in_flight_mentions: self.responses.len(),
            recorded_options: self.responses.values().map(HashSet::len).sum(),
        }
    }
}
