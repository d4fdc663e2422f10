//! Skyreply
//!
//! Bluesky mention bot: polls the notification feed and replies once per
//! comma-separated option in each mention's text.
//!
//! # Features
//!
//! - **Option Extraction**: mention text -> ordered reply options
//! - **Completion Tracking**: at-most-once reply per (mention, option)
//! - **Poll Loop**: fixed-cadence ticks, single task, no overlapping state
//! - **Sweep**: long-period state clear to bound memory growth
//!
//! # Architecture
//!
//! ```text
//! Bluesky PDS ──► listNotifications ──► Poller ──► createRecord (reply)
//!                                         │
//!                                         ├── Extractor (split options)
//!                                         └── Tracker (dedup + completion)
//! ```
//!
//! Polling is at-least-once: the same mention reappears every tick until it
//! ages out of the feed. The tracker is what keeps the replies at-most-once.

pub mod bsky;
pub mod config;
pub mod extract;
pub mod poller;
pub mod tracker;

pub use bsky::{BskyClient, FeedError, Mention, MentionFeed, Session};
pub use config::Config;
pub use extract::extract_options;
pub use poller::{Poller, PollerConfig, TickSummary};
pub use tracker::{CompletionTracker, TrackerStats};
