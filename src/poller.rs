//! Poll Cycle Controller
//!
//! Drives one tick: authenticate, fetch mentions, and for each mention not
//! yet fully answered, post one reply per extracted option the tracker has
//! not seen. A long-period sweep wipes tracker state to bound memory growth
//! and recover from stuck records.
//!
//! Both timers are polled from a single task, so a tick and a sweep can
//! never interleave against the tracker.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::bsky::{FeedError, Mention, MentionFeed};
use crate::extract::extract_options;
use crate::tracker::CompletionTracker;

/// Timing for the poll loop.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// How often to poll the notification feed.
    pub tick_interval: Duration,
    /// How often to wipe dedup/completion state.
    pub sweep_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

/// What one tick did. Logged per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Mentions returned by the feed this tick.
    pub mentions_seen: usize,
    /// Mentions skipped because they were already fully answered.
    pub mentions_skipped: usize,
    /// Replies actually posted.
    pub replies_posted: usize,
    /// Options skipped because a reply was already recorded.
    pub options_skipped: usize,
    /// Mentions that reached full coverage this tick.
    pub mentions_completed: usize,
}

/// The poll loop: feed in, replies out, tracker in between.
pub struct Poller {
    feed: Arc<dyn MentionFeed>,
    tracker: CompletionTracker,
    config: PollerConfig,
}

impl Poller {
    pub fn new(feed: Arc<dyn MentionFeed>, config: PollerConfig) -> Self {
        Self {
            feed,
            tracker: CompletionTracker::new(),
            config,
        }
    }

    /// Run one full poll cycle.
    ///
    /// Any feed error aborts the remainder of the tick. Options recorded
    /// before the failure stay recorded: a posted reply must never be
    /// re-posted, and the next tick naturally retries everything that is
    /// still unrecorded.
    pub async fn run_tick(&mut self) -> Result<TickSummary, FeedError> {
        let mut summary = TickSummary::default();

        self.feed.authenticate().await?;
        let mentions = self.feed.list_mentions().await?;
        summary.mentions_seen = mentions.len();

        if mentions.is_empty() {
            debug!("No pending mentions");
            return Ok(summary);
        }

        for mention in &mentions {
            if self.tracker.is_fully_processed(&mention.cid) {
                debug!("Mention {} already fully processed", mention.cid);
                summary.mentions_skipped += 1;
                continue;
            }
            self.process_mention(mention, &mut summary).await?;
        }

        Ok(summary)
    }

    /// Reply to every option of one mention that has not been replied to yet,
    /// in extraction order, and mark the mention complete once the recorded
    /// count covers every extracted option.
    async fn process_mention(
        &mut self,
        mention: &Mention,
        summary: &mut TickSummary,
    ) -> Result<(), FeedError> {
        let options = extract_options(&mention.text);

        for option in &options {
            if self.tracker.has_option(&mention.cid, option) {
                debug!("Already replied to {} with option: {}", mention.cid, option);
                summary.options_skipped += 1;
                continue;
            }

            info!("Replying to mention {} with option: {}", mention.cid, option);
            self.feed
                .post_reply(&mention.uri, &mention.cid, option)
                .await?;
            self.tracker.record(&mention.cid, option);
            summary.replies_posted += 1;
        }

        if self.tracker.recorded_count(&mention.cid) == options.len() {
            debug!("All options processed for mention: {}", mention.cid);
            self.tracker.mark_complete(&mention.cid);
            summary.mentions_completed += 1;
        }

        Ok(())
    }

    /// Wipe all dedup/completion state. Safety valve against stuck records;
    /// the per-option invariants hold without it.
    pub fn sweep(&mut self) {
        let stats = self.tracker.stats();
        self.tracker.clear();
        info!(
            "Swept tracker state ({} processed, {} in flight)",
            stats.processed_mentions, stats.in_flight_mentions
        );
    }

    /// Tracker access for assertions in integration tests.
    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    /// Run ticks and sweeps until the task is dropped.
    ///
    /// The first tick fires immediately; the first sweep only after a full
    /// sweep interval. A failed tick is logged and contained, and the next
    /// tick retries whatever is still unanswered.
    pub async fn run(mut self) {
        let mut tick = tokio::time::interval(self.config.tick_interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let start = tokio::time::Instant::now() + self.config.sweep_interval;
        let mut sweep = tokio::time::interval_at(start, self.config.sweep_interval);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            "Polling every {:?}, sweeping every {:?}",
            self.config.tick_interval, self.config.sweep_interval
        );

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    match self.run_tick().await {
                        Ok(summary) => info!(
                            "Tick: {} mentions, {} replies posted, {} skipped, {} completed",
                            summary.mentions_seen,
                            summary.replies_posted,
                            summary.options_skipped,
                            summary.mentions_completed,
                        ),
                        Err(e) => warn!("Tick aborted: {}", e),
                    }
                }
                _ = sweep.tick() => {
                    self.sweep();
                }
            }
        }
    }
}
